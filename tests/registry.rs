//! Tests for definition lookup: explicit precedence, convention discovery
//! and memoization under concurrency.

mod common;

use std::sync::Arc;

use common::{Journal, Kitchen, kitchen};
use rstest::rstest;
use stepwire::{Registry, Resolution, Scenario, Suggestions};

fn matched<S>(resolution: Resolution<S>) -> stepwire::StepMatch<S> {
    match resolution {
        Resolution::Matched(found) => found,
        Resolution::Unresolved(guess) => panic!("unexpected miss: {}", guess.name),
    }
}

#[test]
fn discovery_is_memoized_by_method_name() {
    let registry = Registry::<Kitchen>::new().expect("kitchen suite is well formed");
    let suggestions = Suggestions::new();

    let first = matched(
        registry
            .find("I have 3 cukes", None, &suggestions)
            .expect("lookup succeeds"),
    );
    let second = matched(
        registry
            .find("Given I have 40 cukes", None, &suggestions)
            .expect("lookup succeeds"),
    );

    assert!(first.discovered && second.discovered);
    assert!(Arc::ptr_eq(&first.definition, &second.definition));
    assert_eq!(second.captures, ["40"]);
    assert_eq!(registry.discovered_len(), 1);
    assert_eq!(first.definition.method_name(), Some("i_have_cukes"));
    assert!(suggestions.is_empty());
}

#[test]
fn explicit_definitions_shadow_discovery() {
    let registry = Registry::<Kitchen>::new().expect("kitchen suite is well formed");
    registry
        .register("I have {int} cukes", |kitchen: &mut Kitchen, count: i64| {
            kitchen.cukes = count;
        })
        .expect("definition is well formed");

    let found = matched(
        registry
            .find("I have 3 cukes", None, &Suggestions::new())
            .expect("lookup succeeds"),
    );

    assert!(!found.discovered);
    assert_eq!(registry.explicit_len(), 1);
    assert_eq!(registry.discovered_len(), 0);
}

#[rstest]
#[case("before")]
#[case("after_step")]
fn hook_names_are_never_steps(#[case] text: &str) {
    let registry = Registry::<Kitchen>::new().expect("kitchen suite is well formed");
    let suggestions = Suggestions::new();

    let resolution = registry.find(text, None, &suggestions).expect("lookup succeeds");

    assert!(matches!(resolution, Resolution::Unresolved(_)));
    assert_eq!(suggestions.len(), 1);
}

#[test]
fn suggestions_are_recorded_once_per_method() {
    let registry = Registry::<Kitchen>::new().expect("kitchen suite is well formed");
    let suggestions = Suggestions::new();

    for text in ["I bake 1 cake", "I bake 2 cake", "I fry an egg"] {
        registry.find(text, None, &suggestions).expect("lookup succeeds");
    }

    let names: Vec<_> = suggestions.snapshot().into_iter().map(|g| g.name).collect();
    assert_eq!(names, ["i_bake_cake", "i_fry_an_egg"]);
}

#[test]
fn parallel_scenarios_share_one_discovered_definition() {
    let journal = Journal::default();
    let runner = kitchen(&journal).parallel(true);
    let scenarios: Vec<_> = (0..16)
        .map(|n| Scenario::new(format!("scenario {n}")).step(format!("I have {n} cukes")))
        .collect();

    let report = runner.run(&scenarios);

    assert_eq!(report.passed(), 16);
    assert_eq!(runner.registry().discovered_len(), 1);
    let memo = runner
        .registry()
        .discovered("i_have_cukes")
        .expect("memoized definition");
    assert_eq!(memo.capture_count(), 1);
}

#[test]
fn suggestions_accumulate_across_runs() {
    let journal = Journal::default();
    let runner = kitchen(&journal);
    let suggestions = Suggestions::new();

    let _first = runner.run_with(&[Scenario::new("one").step("I bake 1 cake")], &suggestions);
    let report = runner.run_with(&[Scenario::new("two").step("I fry an egg")], &suggestions);

    assert_eq!(report.suggestions.len(), 2);
}
