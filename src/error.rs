//! Canonical error types for the crate.
//!
//! Errors are split by the point at which they surface: [`PatternError`] and
//! [`DefinitionError`] while a suite is being set up, [`StepError`] while a
//! matched step is bound and invoked.

use thiserror::Error;

use crate::value::ParamKind;

/// Errors raised while compiling a step pattern.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// The pattern is not a valid regular expression.
    #[error("invalid regular expression {pattern:?}: {source}")]
    Regex {
        /// Source text of the rejected pattern.
        pattern: String,
        /// Error reported by the regex compiler.
        #[source]
        source: regex::Error,
    },
    /// The step expression could not be parsed.
    #[error("invalid step expression {expression:?} at offset {offset}: {reason}")]
    Expression {
        /// Source text of the rejected expression.
        expression: String,
        /// Byte offset of the offending token.
        offset: usize,
        /// What went wrong.
        reason: &'static str,
    },
    /// The expression names a parameter type that was never defined.
    #[error("undefined parameter type {{{name}}} in {expression:?}")]
    UndefinedParameterType {
        /// Source text of the rejected expression.
        expression: String,
        /// Name between the braces.
        name: String,
    },
    /// A custom parameter type name contains reserved characters.
    #[error("invalid parameter type name {0:?}")]
    InvalidParameterTypeName(String),
}

/// A step definition or hook whose declared shape cannot be executed.
///
/// Detected when the definition is built, so a malformed suite never starts
/// running scenarios.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DefinitionError {
    /// The callable returns a value.
    #[error("{location}: step definitions must not return a value, found {ty}")]
    ReturnArity {
        /// Where the callable was registered.
        location: String,
        /// Number of returned values.
        arity: usize,
        /// Name of the returned type.
        ty: &'static str,
    },
    /// A parameter type is neither a special argument nor a coercion target.
    #[error("{location}: parameter {position} has unsupported type {ty}")]
    UnsupportedType {
        /// Where the callable was registered.
        location: String,
        /// Zero-based parameter position after the suite receiver.
        position: usize,
        /// Name of the rejected type.
        ty: &'static str,
    },
    /// A special argument appears after an ordinary step parameter.
    #[error("{location}: special argument {ty} at position {position} follows step parameters")]
    InterleavedSpecial {
        /// Where the callable was registered.
        location: String,
        /// Zero-based parameter position after the suite receiver.
        position: usize,
        /// Name of the special argument type.
        ty: &'static str,
    },
    /// A special argument type has no resolver in the special-argument table.
    #[error("{location}: special argument {ty} at position {position} is not registered")]
    UnknownSpecial {
        /// Where the callable was registered.
        location: String,
        /// Zero-based parameter position after the suite receiver.
        position: usize,
        /// Name of the special argument type.
        ty: &'static str,
    },
    /// A doc string or data table parameter is followed by another parameter.
    #[error("{location}: {kind} parameter at position {position} must be the final parameter")]
    BlockNotLast {
        /// Where the callable was registered.
        location: String,
        /// Zero-based parameter position after the suite receiver.
        position: usize,
        /// The block kind found too early.
        kind: ParamKind,
    },
    /// A lifecycle hook declares step parameters.
    #[error("{location}: hook {hook} cannot take step parameters")]
    HookParameters {
        /// Where the hook was declared.
        location: String,
        /// Reserved method name of the hook.
        hook: &'static str,
    },
    /// A pattern derived from step text did not match that text.
    #[error("derived pattern {pattern} for method {method} does not match {text:?}")]
    DerivedMismatch {
        /// Convention-derived method name.
        method: String,
        /// The derived pattern.
        pattern: String,
        /// Step text the pattern was derived from.
        text: String,
    },
    /// The step pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// A special argument was requested that the current execution cannot supply.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("special argument {name} is unavailable: {reason}")]
pub struct SpecialArgUnavailable {
    /// Name of the requested type.
    pub name: &'static str,
    /// Why it cannot be supplied.
    pub reason: String,
}

/// A captured string could not be parsed as the requested type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot coerce {value:?} to {kind}: {reason}")]
pub struct CoercionError {
    /// The captured text.
    pub value: String,
    /// The requested parameter kind.
    pub kind: ParamKind,
    /// Parser message.
    pub reason: String,
}

/// Errors raised while binding and invoking a matched step.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    /// No explicit or convention-derived definition matched the step.
    #[error("can't find step definition for: {text}")]
    Unresolved {
        /// Literal step text.
        text: String,
    },
    /// The number of captured values differs from the declared parameters.
    #[error("{location}: expected {expected} step arguments but the step supplied {found}")]
    ArityMismatch {
        /// Where the matched definition was registered.
        location: String,
        /// Ordinary parameter count of the definition.
        expected: usize,
        /// Captured (or attached) value count.
        found: usize,
    },
    /// A captured value could not be coerced.
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    /// A special argument resolver refused the request.
    #[error(transparent)]
    SpecialUnavailable(#[from] SpecialArgUnavailable),
    /// A bound argument did not have the shape its parameter expects.
    #[error("argument {position} could not be bound as {expected}")]
    Binding {
        /// Zero-based parameter position after the suite receiver.
        position: usize,
        /// Name of the parameter type.
        expected: &'static str,
    },
    /// Auto-discovery produced a malformed definition.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Errors raised by data table views.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
    /// A header view was requested for a table with no rows.
    #[error("data table is empty; a header row is required")]
    Empty,
    /// A row does not have as many cells as the header.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Zero-based row index.
        row: usize,
        /// Width of the header row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
}
