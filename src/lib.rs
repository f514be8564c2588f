#![doc(html_root_url = "https://docs.rs/stepwire/latest")]
//! Public API for the `stepwire` library.
//!
//! This crate resolves the steps of behaviour-driven scenarios to code and
//! runs them. A suite type declares named methods; steps are matched either
//! against explicitly registered patterns or, by naming convention, against
//! a method derived from the step text. Arguments are bound from pattern
//! captures, doc strings, data tables and injected special values such as
//! the per-scenario [`TestContext`]. Lifecycle hooks wrap every scenario and
//! every step.
//!
//! Parsing feature files is left to the caller: scenarios arrive as
//! [`Scenario`] values, which also deserialize from JSON pickles.

pub mod binder;
pub mod block;
pub mod context;
pub mod definition;
pub mod error;
pub mod guess;
pub mod handler;
pub mod hooks;
pub mod metrics;
pub mod panic;
pub mod pattern;
pub mod registry;
pub mod runner;
pub mod scenario;
pub mod signature;
pub mod special;
pub mod suite;
pub mod value;

pub use block::{Cell, DataTable, DocString, HeaderTable};
pub use context::{PropContext, ScenarioContext, ScenarioState, TestContext};
pub use definition::StepDefinition;
pub use error::{
    CoercionError,
    DefinitionError,
    PatternError,
    SpecialArgUnavailable,
    StepError,
    TableError,
};
pub use guess::{MethodNameGuess, guess_method};
pub use hooks::{HookKind, Hooks, Phase};
pub use pattern::{IntoPattern, ParameterType, Pattern};
pub use registry::{Registry, Resolution, StepMatch, Suggestions};
pub use runner::{RunReport, Runner, RunnerConfig, ScenarioReport, Status, StepReport};
pub use scenario::{Location, PickleStep, Scenario, StepArgument, StepKeyword};
pub use special::{Special, SpecialArgs};
pub use suite::{MethodTable, Suite};
pub use value::{ParamKind, Value};
