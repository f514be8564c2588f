//! Tests for argument coercion of captured step text.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use rstest::rstest;
use stepwire::{
    DefinitionError,
    ParameterType,
    Scenario,
    Status,
    methods,
    runner::Runner,
    suite::{MethodTable, Suite},
};

#[derive(Default)]
struct Ledger {
    population: Option<BigInt>,
    price: Option<BigDecimal>,
    colour: Option<String>,
}

impl Ledger {
    fn the_population_is(&mut self, population: BigInt) { self.population = Some(population); }

    fn the_price_is(&mut self, price: BigDecimal) { self.price = Some(price); }
}

impl Suite for Ledger {
    fn methods(table: &mut MethodTable<Self>) { methods!(table => Self { the_population_is, the_price_is }); }
}

fn runner() -> Runner<Ledger> {
    Runner::new(|_| Ledger::default())
        .expect("ledger suite is well formed")
        .step("the population should be {biginteger}", |ledger: &mut Ledger, expected: BigInt| {
            assert_eq!(ledger.population.as_ref(), Some(&expected));
        })
        .expect("definition is well formed")
        .step("the price should be {bigdecimal}", |ledger: &mut Ledger, expected: BigDecimal| {
            assert_eq!(ledger.price.as_ref(), Some(&expected));
        })
        .expect("definition is well formed")
        .step("the counter reads {int}", |_: &mut Ledger, _: i64| {})
        .expect("definition is well formed")
}

#[test]
fn big_integers_survive_the_round_trip() {
    let huge = "123456789012345678901234567890";
    let report = runner().run(&[Scenario::new("census")
        .step(format!("the population is {huge}"))
        .step(format!("the population should be {huge}"))]);

    assert_eq!(report.scenarios[0].status, Status::Passed);
}

#[test]
fn decimals_are_exact() {
    let report = runner().run(&[Scenario::new("pricing")
        .step("the price is 0.10")
        .step("the price should be 0.1")]);

    assert_eq!(report.scenarios[0].status, Status::Passed);
}

#[rstest]
#[case("the counter reads 99999999999999999999")]
#[case("the counter reads -99999999999999999999")]
fn out_of_range_integers_fail_the_step(#[case] text: &str) {
    let report = runner().run(&[Scenario::new("overflow").step(text)]);

    let step = &report.scenarios[0].steps[0];
    assert_eq!(step.status, Status::Failed);
    let message = step.message.as_deref().expect("coercion message");
    assert!(message.starts_with("cannot coerce"), "message was {message}");
}

#[test]
fn custom_parameter_types_capture_their_regex() {
    let colour = ParameterType::new("colour", "red|green|blue").expect("valid parameter type");
    let runner = runner()
        .parameter_type(colour)
        .step("the ink is {colour}", |ledger: &mut Ledger, colour: String| {
            ledger.colour = Some(colour);
        })
        .expect("definition is well formed")
        .step("the ink should be {word}", |ledger: &mut Ledger, expected: String| {
            assert_eq!(ledger.colour.as_deref(), Some(expected.as_str()));
        })
        .expect("definition is well formed");

    let report = runner.run(&[
        Scenario::new("inking")
            .step("the ink is green")
            .step("the ink should be green"),
        Scenario::new("bad ink").step("the ink is purple"),
    ]);

    assert_eq!(report.scenarios[0].status, Status::Passed);
    assert_eq!(report.scenarios[1].status, Status::Skipped);
}

#[test]
fn binary_floats_are_rejected_at_registration() {
    let err = Runner::new(|_| Ledger::default())
        .expect("ledger suite is well formed")
        .step("the rate is {float}", |_: &mut Ledger, _: f64| {})
        .expect_err("f64 is not a supported parameter type");

    assert!(matches!(err, DefinitionError::UnsupportedType { position: 0, ty: "f64", .. }));
}

#[test]
fn returning_a_value_is_rejected_at_registration() {
    let err = Runner::new(|_| Ledger::default())
        .expect("ledger suite is well formed")
        .step("the answer is {int}", |_: &mut Ledger, answer: i64| answer == 42)
        .expect_err("step definitions return nothing");

    assert!(matches!(err, DefinitionError::ReturnArity { arity: 1, .. }));
}
