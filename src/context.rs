//! Per-scenario state handed to steps and hooks.
//!
//! [`TestContext`] is the host reporting handle: it records log lines and
//! failures and can stop the current step. [`PropContext`] is the randomized
//! input source available only when a scenario runs in randomized mode.
//! Both are special arguments a step may request by type.

use std::{
    fmt::{self, Debug, Display},
    sync::{Arc, Mutex, PoisonError},
};

use proptest::{
    strategy::{Strategy, ValueTree},
    test_runner::TestRunner,
};

use crate::panic::Halt;

#[derive(Debug, Default)]
struct TestState {
    scenario: String,
    step: Option<String>,
    logs: Vec<String>,
    errors: Vec<String>,
    failed: bool,
}

/// Reporting handle for the running scenario.
///
/// Cloning yields another handle to the same scenario.
#[derive(Clone, Debug, Default)]
pub struct TestContext {
    inner: Arc<Mutex<TestState>>,
}

impl TestContext {
    /// Create a handle for the scenario called `scenario`.
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TestState {
                scenario: scenario.into(),
                ..TestState::default()
            })),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut TestState) -> T) -> T {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Name of the running scenario.
    #[must_use]
    pub fn scenario(&self) -> String { self.with(|s| s.scenario.clone()) }

    /// Text of the running step, if a step is running.
    #[must_use]
    pub fn step(&self) -> Option<String> { self.with(|s| s.step.clone()) }

    /// Record a log line against the scenario.
    pub fn log(&self, message: impl Display) {
        let line = message.to_string();
        tracing::debug!(target: "stepwire::test", "{line}");
        self.with(|s| s.logs.push(line));
    }

    /// Record a failure and keep running the step.
    pub fn error(&self, message: impl Display) {
        let line = message.to_string();
        self.with(|s| {
            s.failed = true;
            s.errors.push(line);
        });
    }

    /// Record a failure and stop the step immediately.
    pub fn fail_now(&self, message: impl Display) -> ! {
        self.error(message);
        Halt::Failed.raise()
    }

    /// Stop the step and mark it skipped.
    pub fn skip(&self, message: impl Display) -> ! { Halt::Skipped(message.to_string()).raise() }

    /// Whether any failure has been recorded for the scenario.
    #[must_use]
    pub fn failed(&self) -> bool { self.with(|s| s.failed) }

    pub(crate) fn enter_step(&self, text: Option<&str>) {
        self.with(|s| s.step = text.map(str::to_owned));
    }

    pub(crate) fn take_errors(&self) -> Vec<String> { self.with(|s| std::mem::take(&mut s.errors)) }

    pub(crate) fn logs(&self) -> Vec<String> { self.with(|s| s.logs.clone()) }
}

/// Source of randomized inputs for a scenario run in randomized mode.
///
/// Every case of a randomized scenario shares one generator, so successive
/// cases draw fresh values.
#[derive(Clone)]
pub struct PropContext {
    runner: Arc<Mutex<TestRunner>>,
    case: u32,
    test: TestContext,
}

impl PropContext {
    pub(crate) fn new(runner: Arc<Mutex<TestRunner>>, case: u32, test: TestContext) -> Self {
        Self { runner, case, test }
    }

    /// Zero-based index of the running case.
    #[must_use]
    pub fn case(&self) -> u32 { self.case }

    /// Draw a value from `strategy`, logging it under `label`.
    ///
    /// Fails the step if the strategy rejects every attempt.
    pub fn draw<T>(&self, strategy: T, label: &str) -> T::Value
    where
        T: Strategy,
        T::Value: Debug,
    {
        let tree = {
            let mut runner = self.runner.lock().unwrap_or_else(PoisonError::into_inner);
            strategy.new_tree(&mut runner)
        };
        match tree {
            Ok(tree) => {
                let value = tree.current();
                self.test.log(format_args!("{label} = {value:?}"));
                value
            }
            Err(reason) => self
                .test
                .fail_now(format_args!("cannot draw {label}: {reason}")),
        }
    }
}

impl fmt::Debug for PropContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropContext").field("case", &self.case).finish_non_exhaustive()
    }
}

/// Special-argument sources for one scenario execution.
#[derive(Clone, Debug)]
pub struct ScenarioState {
    test: TestContext,
    property: Option<PropContext>,
}

impl ScenarioState {
    /// State for a scenario outside randomized mode.
    #[must_use]
    pub fn new(test: TestContext) -> Self {
        Self {
            test,
            property: None,
        }
    }

    pub(crate) fn randomized(test: TestContext, property: PropContext) -> Self {
        Self {
            test,
            property: Some(property),
        }
    }

    /// Reporting handle of the scenario.
    #[must_use]
    pub fn test(&self) -> &TestContext { &self.test }

    /// Randomized input source, present only in randomized mode.
    #[must_use]
    pub fn property(&self) -> Option<&PropContext> { self.property.as_ref() }
}

/// The live suite together with the state its steps may request.
///
/// Created when a scenario starts and dropped when it ends; never shared
/// between scenarios.
#[derive(Debug)]
pub struct ScenarioContext<S> {
    /// Suite instance built by the factory for this scenario.
    pub suite: S,
    /// Special-argument sources.
    pub state: ScenarioState,
}
