//! Test world state for Cucumber scenarios exercising `stepwire`.
//!
//! Each cucumber scenario assembles one `stepwire` scenario, runs it through
//! a kitchen runner and keeps the report for the `Then` steps.

use cucumber::World;
use stepwire::{RunReport, Scenario, ScenarioReport};

use crate::common::{Journal, kitchen};

#[derive(Debug, Default, World)]
pub struct StepwireWorld {
    pub strict: bool,
    pub scenario: Option<Scenario>,
    pub journal: Journal,
    report: Option<RunReport>,
}

impl StepwireWorld {
    /// Run the assembled scenario and keep its report.
    ///
    /// # Panics
    ///
    /// Panics if no scenario was assembled.
    pub fn run(&mut self) {
        let scenario = self.scenario.take().expect("scenario assembled");
        let report = kitchen(&self.journal).strict(self.strict).run(&[scenario]);
        self.report = Some(report);
    }

    /// Report of the whole run.
    ///
    /// # Panics
    ///
    /// Panics if the scenario has not run yet.
    pub fn report(&self) -> &RunReport { self.report.as_ref().expect("scenario ran") }

    /// Report of the single scenario.
    pub fn scenario_report(&self) -> &ScenarioReport { &self.report().scenarios[0] }
}
