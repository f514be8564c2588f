//! Scenario orchestration.
//!
//! A [`Runner`] owns the definition registry and hooks of one suite type.
//! For each scenario it resolves every step up front, builds a fresh suite
//! from the factory, then runs `before`, each step wrapped by `before_step`
//! and `after_step`, and finally `after`. Scenarios may run on separate
//! threads; steps within a scenario never overlap.

mod config;
mod invoke;
mod report;

use std::{
    fmt,
    sync::{Arc, Mutex},
    thread,
};

use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};
use tracing::{debug, info, info_span, warn};

pub use self::{
    config::{DEFAULT_PROPERTY_CASES, RunnerConfig, UnresolvedPolicy},
    report::{HookFailure, RunReport, ScenarioReport, Status, StepReport},
};
use self::invoke::{Interrupt, guarded};
use crate::{
    binder::{bind, bind_specials},
    context::{PropContext, ScenarioContext, ScenarioState, TestContext},
    error::{DefinitionError, StepError},
    handler::StepFn,
    hooks::{HookKind, Hooks, Lifecycle, Phase},
    metrics,
    panic::format_panic,
    pattern::{IntoPattern, ParameterType},
    registry::{Registry, Resolution, StepMatch, Suggestions},
    scenario::Scenario,
    special::SpecialArgs,
    suite::Suite,
};

type Factory<S> = Arc<dyn Fn(&TestContext) -> S + Send + Sync>;

/// Runs scenarios against fresh instances of suite `S`.
///
/// # Examples
///
/// ```rust
/// use stepwire::{
///     methods,
///     runner::{Runner, Status},
///     scenario::Scenario,
///     suite::{MethodTable, Suite},
/// };
///
/// #[derive(Default)]
/// struct Basket {
///     cukes: i64,
/// }
///
/// impl Basket {
///     fn i_have_cukes(&mut self, count: i64) { self.cukes = count; }
///     fn i_eat_cukes(&mut self, count: i64) { self.cukes -= count; }
/// }
///
/// impl Suite for Basket {
///     fn methods(table: &mut MethodTable<Self>) {
///         methods!(table => Self { i_have_cukes, i_eat_cukes });
///     }
/// }
///
/// let runner = Runner::new(|_| Basket::default())
///     .expect("suite is well formed")
///     .step("I should have {int} cukes", |basket: &mut Basket, left: i64| {
///         assert_eq!(basket.cukes, left);
///     })
///     .expect("definition is well formed");
///
/// let scenario = Scenario::new("eating")
///     .step("I have 12 cukes")
///     .step("I eat 5 cukes")
///     .step("I should have 7 cukes");
/// let report = runner.run(&[scenario]);
/// assert!(report.is_success());
/// assert_eq!(report.scenarios[0].status, Status::Passed);
/// ```
pub struct Runner<S> {
    factory: Factory<S>,
    registry: Registry<S>,
    hooks: Hooks<S>,
    config: RunnerConfig,
}

impl<S: Suite> Runner<S> {
    /// Create a runner building one suite per scenario with `factory`.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if a suite method or hook is malformed.
    pub fn new<F>(factory: F) -> Result<Self, DefinitionError>
    where
        F: Fn(&TestContext) -> S + Send + Sync + 'static,
    {
        Self::with_special_args(factory, SpecialArgs::default())
    }

    /// Create a runner with a custom special-argument table.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if a suite method or hook is malformed.
    pub fn with_special_args<F>(factory: F, specials: SpecialArgs) -> Result<Self, DefinitionError>
    where
        F: Fn(&TestContext) -> S + Send + Sync + 'static,
    {
        let registry = Registry::with_specials(specials)?;
        let hooks = Hooks::discover(registry.methods(), registry.specials())?;
        debug!(
            "runner ready: methods={}, hooks={}",
            registry.methods().len(),
            hooks.len()
        );
        Ok(Self {
            factory: Arc::new(factory),
            registry,
            hooks,
            config: RunnerConfig::default(),
        })
    }

    /// Register an explicit step definition.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the pattern does not compile or the
    /// callable is malformed.
    #[track_caller]
    pub fn step<P, Args, F>(self, pattern: P, f: F) -> Result<Self, DefinitionError>
    where
        P: IntoPattern,
        F: StepFn<S, Args>,
    {
        self.registry.register(pattern, f)?;
        Ok(self)
    }

    /// Add a parameter type for step expressions registered afterwards.
    #[must_use]
    pub fn parameter_type(mut self, parameter: ParameterType) -> Self {
        self.registry.define_parameter_type(parameter);
        self
    }

    /// Fail (`true`) or skip (`false`) scenarios with unresolved steps.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.unresolved = if strict {
            UnresolvedPolicy::Fail
        } else {
            UnresolvedPolicy::Skip
        };
        self
    }

    /// Count skipped scenarios as run failures.
    #[must_use]
    pub fn skipped_fails_run(mut self, enabled: bool) -> Self {
        self.config.skipped_fails_run = enabled;
        self
    }

    /// Run scenarios on separate threads.
    #[must_use]
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.config.parallel = enabled;
        self
    }

    /// Keep running later steps after a step fails.
    #[must_use]
    pub fn continue_after_failure(mut self, enabled: bool) -> Self {
        self.config.continue_after_failure = enabled;
        self
    }

    /// Set the number of cases per randomized scenario.
    #[must_use]
    pub fn property_cases(mut self, cases: u32) -> Self {
        self.config.property_cases = cases.max(1);
        self
    }

    /// Fix the seed of randomized scenarios.
    #[must_use]
    pub fn property_seed(mut self, seed: u64) -> Self {
        self.config.property_seed = Some(seed);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig { &self.config }

    /// Definition registry.
    #[must_use]
    pub fn registry(&self) -> &Registry<S> { &self.registry }

    /// Hooks discovered on the suite.
    #[must_use]
    pub fn hooks(&self) -> &Hooks<S> { &self.hooks }

    /// Run `scenarios` with a fresh suggestion table.
    #[must_use]
    pub fn run(&self, scenarios: &[Scenario]) -> RunReport { self.run_with(scenarios, &Suggestions::new()) }

    /// Run `scenarios`, recording unresolved steps into `suggestions`.
    ///
    /// The returned report lists every suggestion in the table, including
    /// any recorded before this run.
    #[must_use]
    pub fn run_with(&self, scenarios: &[Scenario], suggestions: &Suggestions) -> RunReport {
        info!(
            "running scenarios: count={}, parallel={}",
            scenarios.len(),
            self.config.parallel
        );
        let reports = if self.config.parallel && scenarios.len() > 1 {
            thread::scope(|scope| {
                let handles: Vec<_> = scenarios
                    .iter()
                    .map(|scenario| scope.spawn(move || self.run_scenario(scenario, suggestions)))
                    .collect();
                handles
                    .into_iter()
                    .zip(scenarios)
                    .map(|(handle, scenario)| {
                        handle.join().unwrap_or_else(|payload| {
                            let message = format_panic(payload).to_string();
                            warn!("scenario thread panicked: scenario={}, panic={message}", scenario.name);
                            metrics::inc_scenarios(Status::Failed);
                            ScenarioReport::crashed(scenario, message)
                        })
                    })
                    .collect()
            })
        } else {
            scenarios
                .iter()
                .map(|scenario| self.run_scenario(scenario, suggestions))
                .collect()
        };
        let report = RunReport::new(reports, suggestions.snapshot(), self.config.skipped_fails_run);
        report.log_summary();
        report
    }

    fn run_scenario(&self, scenario: &Scenario, suggestions: &Suggestions) -> ScenarioReport {
        let span = info_span!("scenario", name = %scenario.name, location = %scenario.location);
        let _entered = span.enter();
        let mut report = ScenarioReport::pending(scenario);

        let mut matches = Vec::with_capacity(scenario.steps.len());
        let mut unresolved = false;
        for (step, step_report) in scenario.steps.iter().zip(&mut report.steps) {
            let failure = match self
                .registry
                .find(&step.text, step.argument.as_ref(), suggestions)
            {
                Ok(Resolution::Matched(found)) => {
                    step_report.definition = Some(found.definition.location().to_owned());
                    matches.push(found);
                    continue;
                }
                Ok(Resolution::Unresolved(guess)) => {
                    let error = StepError::Unresolved {
                        text: step.text.clone(),
                    };
                    warn!(
                        "{error}: location={}, suggested_method={}",
                        step.location, guess.name
                    );
                    let status = if self.config.is_strict() {
                        Status::Failed
                    } else {
                        Status::Skipped
                    };
                    (status, error.to_string())
                }
                Err(error) => {
                    warn!("step definition rejected: location={}, error={error}", step.location);
                    (Status::Failed, error.to_string())
                }
            };
            unresolved = true;
            step_report.status = failure.0;
            step_report.message = Some(failure.1);
        }

        let report = if unresolved {
            report.finish(None);
            report
        } else if matches
            .iter()
            .any(|found| found.definition.requests::<PropContext>())
        {
            self.run_randomized(scenario, &matches, &report)
        } else {
            let state = ScenarioState::new(TestContext::new(&scenario.name));
            self.run_case(scenario, &matches, state, report)
        };
        // Only the reported case of a randomized scenario counts.
        for step in report.steps.iter().filter(|s| s.status != Status::NotRun) {
            metrics::inc_steps(step.status);
        }
        metrics::inc_scenarios(report.status);
        debug!("scenario finished: status={}", report.status.as_str());
        report
    }

    fn run_randomized(
        &self,
        scenario: &Scenario,
        matches: &[StepMatch<S>],
        pending: &ScenarioReport,
    ) -> ScenarioReport {
        let generator = Arc::new(Mutex::new(self.property_runner()));
        let cases = self.config.property_cases.max(1);
        let mut report = pending.clone();
        for case in 0..cases {
            let test = TestContext::new(&scenario.name);
            let property = PropContext::new(Arc::clone(&generator), case, test.clone());
            let state = ScenarioState::randomized(test, property);
            report = self.run_case(scenario, matches, state, pending.clone());
            report.property_case = Some(case);
            if report.status != Status::Passed {
                warn!(
                    "randomized case did not pass: case={case}, status={}",
                    report.status.as_str()
                );
                return report;
            }
        }
        debug!("randomized scenario passed: cases={cases}");
        report
    }

    fn property_runner(&self) -> TestRunner {
        let config = Config::with_cases(self.config.property_cases);
        match self.config.property_seed {
            Some(seed) => {
                let mut bytes = [0_u8; 32];
                bytes[..8].copy_from_slice(&seed.to_le_bytes());
                TestRunner::new_with_rng(config, TestRng::from_seed(RngAlgorithm::ChaCha, &bytes))
            }
            None => TestRunner::new(config),
        }
    }

    fn run_case(
        &self,
        scenario: &Scenario,
        matches: &[StepMatch<S>],
        state: ScenarioState,
        mut report: ScenarioReport,
    ) -> ScenarioReport {
        let test = state.test().clone();
        let suite = match guarded(&test, || Ok((self.factory)(&test))) {
            Ok(suite) => suite,
            Err(interrupt) => {
                warn!("suite factory did not complete: {}", interrupt.message());
                report.status = interrupt.status();
                report.message = Some(interrupt.into_message());
                report.logs = test.logs();
                return report;
            }
        };
        let mut ctx = ScenarioContext { suite, state };
        let mut lifecycle = Lifecycle::default();
        let mut skipped_by_hook = None;
        let mut stopped = false;

        lifecycle.advance(Phase::BeforeRan);
        match self.dispatch(HookKind::Before, &mut ctx) {
            Ok(()) => {}
            Err(Interrupt::Failed(message)) => {
                report.hook_failed(HookKind::Before, message);
                stopped = true;
            }
            Err(Interrupt::Skipped(reason)) => {
                skipped_by_hook = Some(reason);
                stopped = true;
            }
        }

        let mut hook_failures = Vec::new();
        for ((step, found), step_report) in scenario.steps.iter().zip(matches).zip(&mut report.steps) {
            if stopped {
                break;
            }
            lifecycle.advance(Phase::StepRunning);
            test.enter_step(Some(&step.text));

            let outcome = match self.dispatch(HookKind::BeforeStep, &mut ctx) {
                Ok(()) => guarded(&test, || {
                    let args = bind(
                        &found.definition,
                        &ctx.state,
                        found.captures.clone(),
                        step.argument.as_ref(),
                    )?;
                    (found.definition.handler())(&mut ctx.suite, args)
                }),
                Err(interrupt) => {
                    if let Interrupt::Failed(message) = &interrupt {
                        hook_failures.push((HookKind::BeforeStep, message.clone()));
                    }
                    Err(interrupt)
                }
            };
            let after_failed = match self.dispatch(HookKind::AfterStep, &mut ctx) {
                Err(Interrupt::Failed(message)) => {
                    hook_failures.push((HookKind::AfterStep, message));
                    true
                }
                Ok(()) | Err(Interrupt::Skipped(_)) => false,
            };
            test.enter_step(None);

            step_report.status = outcome.as_ref().map_or_else(Interrupt::status, |_| Status::Passed);
            step_report.message = outcome.err().map(Interrupt::into_message);
            match step_report.status {
                Status::Failed => warn!(
                    "step failed: text={}, location={}, error={}",
                    step.text,
                    step.location,
                    step_report.message.as_deref().unwrap_or_default()
                ),
                status => debug!("step finished: text={}, status={}", step.text, status.as_str()),
            }

            let continuing = self.config.continue_after_failure;
            stopped = match step_report.status {
                Status::Passed | Status::NotRun => after_failed && !continuing,
                Status::Failed => !continuing,
                Status::Skipped => true,
            };
        }

        lifecycle.advance(Phase::AfterRan);
        match self.dispatch(HookKind::After, &mut ctx) {
            Err(Interrupt::Failed(message)) => hook_failures.push((HookKind::After, message)),
            Err(Interrupt::Skipped(reason)) => debug!("after hook skipped: {reason}"),
            Ok(()) => {}
        }
        lifecycle.advance(Phase::Done);

        for (kind, message) in hook_failures {
            report.hook_failed(kind, message);
        }
        report.logs = test.logs();
        report.finish(skipped_by_hook);
        debug!("scenario case finished: phase={:?}", lifecycle.phase());
        report
    }

    fn dispatch(&self, kind: HookKind, ctx: &mut ScenarioContext<S>) -> Result<(), Interrupt> {
        let Some(hook) = self.hooks.get(kind) else {
            return Ok(());
        };
        debug!("running hook: hook={kind}");
        let test = ctx.state.test().clone();
        let result = guarded(&test, || {
            let args = bind_specials(hook.specials(), &ctx.state)?;
            (hook.handler())(&mut ctx.suite, args)
        });
        if let Err(interrupt) = &result {
            warn!(
                "hook did not complete: hook={kind}, location={}, reason={}",
                hook.location(),
                interrupt.message()
            );
        }
        result
    }
}

impl<S> fmt::Debug for Runner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
