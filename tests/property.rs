//! Tests for randomized scenarios driven by `PropContext`.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rstest::rstest;
use stepwire::{
    PropContext,
    Scenario,
    Status,
    hooks::HookKind,
    methods,
    runner::Runner,
    suite::{MethodTable, Suite},
};

#[derive(Default)]
struct Dice {
    roll: u8,
}

impl Dice {
    fn i_roll_a_die(&mut self, prop: PropContext) { self.roll = prop.draw(1..=6_u8, "roll"); }

    fn the_roll_is_below(&mut self, limit: i64) {
        assert!(i64::from(self.roll) < limit, "rolled {}", self.roll);
    }
}

impl Suite for Dice {
    fn methods(table: &mut MethodTable<Self>) { methods!(table => Self { i_roll_a_die, the_roll_is_below }); }
}

fn dice(built: &Arc<AtomicUsize>) -> Runner<Dice> {
    let built = Arc::clone(built);
    Runner::new(move |_| {
        built.fetch_add(1, Ordering::SeqCst);
        Dice::default()
    })
    .expect("dice suite is well formed")
}

fn rolling(limit: i64) -> Scenario {
    Scenario::new("rolling")
        .step("I roll a die")
        .step(format!("the roll is below {limit}"))
}

#[rstest]
#[case(1)]
#[case(5)]
fn every_case_gets_a_fresh_suite(#[case] cases: u32) {
    let built = Arc::new(AtomicUsize::new(0));
    let report = dice(&built).property_cases(cases).run(&[rolling(7)]);

    let scenario = &report.scenarios[0];
    assert_eq!(scenario.status, Status::Passed);
    assert_eq!(scenario.property_case, Some(cases - 1));
    assert_eq!(built.load(Ordering::SeqCst), cases as usize);
    assert!(scenario.logs.iter().all(|line| line.starts_with("roll = ")));
}

#[test]
fn first_failing_case_is_reported() {
    let built = Arc::new(AtomicUsize::new(0));
    let report = dice(&built)
        .property_cases(200)
        .property_seed(11)
        .run(&[rolling(2)]);

    let scenario = &report.scenarios[0];
    assert_eq!(scenario.status, Status::Failed);
    let case = scenario.property_case.expect("failing case recorded");
    assert_eq!(built.load(Ordering::SeqCst), case as usize + 1);
    assert_eq!(scenario.logs.len(), 1);
    assert_ne!(scenario.logs[0], "roll = 1");
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let built = Arc::new(AtomicUsize::new(0));
        let report = dice(&built)
            .property_cases(200)
            .property_seed(42)
            .run(&[rolling(3)]);
        let scenario = &report.scenarios[0];
        (scenario.property_case, scenario.logs.clone())
    };

    assert_eq!(run(), run());
}

#[test]
fn plain_scenarios_run_once() {
    let built = Arc::new(AtomicUsize::new(0));
    let report = dice(&built)
        .property_cases(10)
        .run(&[Scenario::new("no dice").step("the roll is below 0")]);

    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert_eq!(report.scenarios[0].property_case, None);
    assert_eq!(report.scenarios[0].status, Status::Failed);
}

#[derive(Default)]
struct Watcher;

impl Watcher {
    fn nothing_happens(&mut self) {}

    fn before(&mut self, prop: PropContext) { let _ = prop.case(); }
}

impl Suite for Watcher {
    fn methods(table: &mut MethodTable<Self>) { methods!(table => Self { nothing_happens, before }); }
}

#[test]
fn hooks_cannot_draw_outside_randomized_mode() {
    let report = Runner::new(|_| Watcher)
        .expect("watcher suite is well formed")
        .run(&[Scenario::new("quiet").step("nothing happens")]);

    let scenario = &report.scenarios[0];
    assert_eq!(scenario.status, Status::Failed);
    assert_eq!(scenario.steps[0].status, Status::NotRun);
    assert_eq!(scenario.hook_failures[0].kind, HookKind::Before);
    assert!(scenario.hook_failures[0].message.contains("randomized mode"));
}
