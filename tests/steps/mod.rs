//! Step definitions for the `stepwire` behavioural tests.

use cucumber::{gherkin::Step, given, then, when};
use stepwire::{Scenario, Status};

use crate::world::StepwireWorld;

#[given("a kitchen suite")]
fn kitchen_suite(world: &mut StepwireWorld) { world.strict = false; }

#[given("a strict kitchen suite")]
fn strict_kitchen_suite(world: &mut StepwireWorld) { world.strict = true; }

#[given("a scenario with the steps:")]
fn scenario_with_steps(world: &mut StepwireWorld, step: &Step) {
    let table = step.table.as_ref().expect("steps table");
    let scenario = table
        .rows
        .iter()
        .filter_map(|row| row.first())
        .fold(Scenario::new("assembled"), |scenario, text| scenario.step(text.clone()));
    world.scenario = Some(scenario);
}

#[when("the scenario runs")]
fn scenario_runs(world: &mut StepwireWorld) { world.run(); }

#[then("the scenario passes")]
fn scenario_passes(world: &mut StepwireWorld) {
    let report = world.scenario_report();
    assert_eq!(report.status, Status::Passed, "{report:?}");
}

#[then("the scenario is skipped")]
fn scenario_is_skipped(world: &mut StepwireWorld) {
    assert_eq!(world.scenario_report().status, Status::Skipped);
    assert!(world.report().is_success());
}

#[then(regex = r#"^the scenario fails with "(.*)"$"#)]
fn scenario_fails_with(world: &mut StepwireWorld, message: String) {
    let report = world.scenario_report();
    assert_eq!(report.status, Status::Failed);
    assert_eq!(report.message.as_deref(), Some(message.as_str()));
}

#[then(regex = r#"^the suggested method is "([^"]*)"$"#)]
fn suggested_method(world: &mut StepwireWorld, name: String) {
    let names: Vec<_> = world.report().suggestions.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, [name.as_str()]);
}

#[then(regex = r"^step (\d+) was not run$")]
fn step_not_run(world: &mut StepwireWorld, index: usize) {
    let step = world.scenario_report().step(index - 1).expect("step exists");
    assert_eq!(step.status, Status::NotRun);
}

#[then("no suite code ran")]
fn no_suite_code_ran(world: &mut StepwireWorld) {
    assert!(world.journal.entries().is_empty());
}

#[then("the journal reads:")]
fn journal_reads(world: &mut StepwireWorld, step: &Step) {
    let table = step.table.as_ref().expect("journal table");
    let expected: Vec<_> = table.rows.iter().filter_map(|row| row.first().cloned()).collect();
    assert_eq!(world.journal.entries(), expected);
}
