//! Pass/fail results of a run, per scenario and per step.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    guess::MethodNameGuess,
    hooks::HookKind,
    scenario::{Location, PickleStep, Scenario},
};

/// Outcome of a step or scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Ran to completion without failures.
    Passed,
    /// Failed, or a hook it depends on failed.
    Failed,
    /// Skipped by the step itself or for lack of a definition.
    Skipped,
    /// Never started because an earlier step stopped the scenario.
    NotRun,
}

impl Status {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::NotRun => "not_run",
        }
    }
}

/// Result of one step.
#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    /// Literal step text.
    pub text: String,
    /// Source position of the step.
    pub location: Location,
    /// Outcome.
    pub status: Status,
    /// Failure or skip message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Where the matched definition was registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl StepReport {
    pub(crate) fn pending(step: &PickleStep) -> Self {
        Self {
            text: step.text.clone(),
            location: step.location.clone(),
            status: Status::NotRun,
            message: None,
            definition: None,
        }
    }
}

/// A failing lifecycle hook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HookFailure {
    /// Which hook failed.
    pub kind: HookKind,
    /// Failure message.
    pub message: String,
}

/// Result of one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioReport {
    /// Scenario title.
    pub name: String,
    /// Source position of the scenario.
    pub location: Location,
    /// Overall outcome.
    pub status: Status,
    /// First failure or skip message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Per-step results in source order.
    pub steps: Vec<StepReport>,
    /// Hooks that failed, in the order they ran.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hook_failures: Vec<HookFailure>,
    /// Zero-based randomized case that produced this report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_case: Option<u32>,
    /// Lines logged through the scenario's test context.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

impl ScenarioReport {
    pub(crate) fn pending(scenario: &Scenario) -> Self {
        Self {
            name: scenario.name.clone(),
            location: scenario.location.clone(),
            status: Status::NotRun,
            message: None,
            steps: scenario.steps.iter().map(StepReport::pending).collect(),
            hook_failures: Vec::new(),
            property_case: None,
            logs: Vec::new(),
        }
    }

    /// Report for a scenario whose worker thread died.
    pub(crate) fn crashed(scenario: &Scenario, message: String) -> Self {
        let mut report = Self::pending(scenario);
        report.status = Status::Failed;
        report.message = Some(message);
        report
    }

    pub(crate) fn hook_failed(&mut self, kind: HookKind, message: String) {
        self.hook_failures.push(HookFailure { kind, message });
    }

    /// Derive the overall status from the step and hook results.
    ///
    /// Any failure fails the scenario; otherwise a skip skips it; a
    /// scenario with no failing or skipped parts passes.
    pub(crate) fn finish(&mut self, skipped_by_hook: Option<String>) {
        let failed_step = self.steps.iter().find(|s| s.status == Status::Failed);
        let skipped_step = self.steps.iter().find(|s| s.status == Status::Skipped);
        let (status, message) = if let Some(step) = failed_step {
            (Status::Failed, step.message.clone())
        } else if let Some(hook) = self.hook_failures.first() {
            (Status::Failed, Some(format!("{} hook: {}", hook.kind, hook.message)))
        } else if let Some(reason) = skipped_by_hook {
            (Status::Skipped, Some(reason))
        } else if let Some(step) = skipped_step {
            (Status::Skipped, step.message.clone())
        } else {
            (Status::Passed, None)
        };
        self.status = status;
        self.message = message;
    }

    /// Result of the step at `index`.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&StepReport> { self.steps.get(index) }
}

/// Results of a whole run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    /// One report per scenario, in input order.
    pub scenarios: Vec<ScenarioReport>,
    /// Every suggestion recorded by the run, sorted by method name.
    pub suggestions: Vec<MethodNameGuess>,
    #[serde(skip)]
    skipped_fails_run: bool,
}

impl RunReport {
    pub(crate) fn new(
        scenarios: Vec<ScenarioReport>,
        suggestions: Vec<MethodNameGuess>,
        skipped_fails_run: bool,
    ) -> Self {
        Self {
            scenarios,
            suggestions,
            skipped_fails_run,
        }
    }

    /// Whether the run should be considered successful.
    ///
    /// Failed scenarios always fail the run; skipped ones do so only when
    /// the runner was configured with `skipped_fails_run`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && (!self.skipped_fails_run || self.skipped() == 0)
    }

    /// Number of passed scenarios.
    #[must_use]
    pub fn passed(&self) -> usize { self.count(Status::Passed) }

    /// Number of failed scenarios.
    #[must_use]
    pub fn failed(&self) -> usize { self.count(Status::Failed) }

    /// Number of skipped scenarios.
    #[must_use]
    pub fn skipped(&self) -> usize { self.count(Status::Skipped) }

    /// The report of the first scenario called `name`.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    fn count(&self, status: Status) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }

    /// Log a summary line and one warning per suggestion.
    pub(crate) fn log_summary(&self) {
        info!(
            "run finished: passed={}, failed={}, skipped={}",
            self.passed(),
            self.failed(),
            self.skipped()
        );
        for guess in &self.suggestions {
            warn!(
                "undefined step; add a suite method or register a definition:\n{}",
                guess.snippet()
            );
        }
    }
}
