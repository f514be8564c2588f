//! Argument binding for matched steps and hooks.
//!
//! Binding turns a definition's parameter descriptors into the exact ordered
//! argument list its handler expects: resolved special arguments first, then
//! captured text coerced to each parameter kind, then the attached block.

use crate::{
    context::ScenarioState,
    definition::StepDefinition,
    error::{CoercionError, SpecialArgUnavailable, StepError},
    scenario::StepArgument,
    signature::BoundArg,
    special::SpecialArgSpec,
    value::{ParamKind, Value, coerce},
};

/// Resolve each special argument against `state`.
///
/// # Errors
///
/// Returns the first [`SpecialArgUnavailable`] a resolver reports.
pub fn bind_specials(
    specials: &[SpecialArgSpec],
    state: &ScenarioState,
) -> Result<Vec<BoundArg>, SpecialArgUnavailable> {
    specials
        .iter()
        .map(|spec| spec.resolve(state).map(BoundArg::Special))
        .collect()
}

/// Build the argument list for invoking `definition`.
///
/// # Errors
///
/// - [`StepError::SpecialUnavailable`] if a special argument cannot be
///   supplied.
/// - [`StepError::ArityMismatch`] if the number of captures, or the
///   presence of a block, disagrees with the declared parameters.
/// - [`StepError::Coercion`] if a capture does not parse as its parameter
///   kind or the attached block is of the other block kind.
pub fn bind<S>(
    definition: &StepDefinition<S>,
    state: &ScenarioState,
    captures: Vec<String>,
    block: Option<&StepArgument>,
) -> Result<Vec<BoundArg>, StepError> {
    let mut args = bind_specials(definition.specials(), state)?;

    let expected_block = definition.block();
    if captures.len() != definition.capture_count() || expected_block.is_some() != block.is_some()
    {
        return Err(StepError::ArityMismatch {
            location: definition.location().to_owned(),
            expected: definition.params().len(),
            found: captures.len() + usize::from(block.is_some()),
        });
    }

    for (kind, raw) in definition.params().iter().zip(&captures) {
        args.push(BoundArg::Value(coerce(*kind, raw)?));
    }

    if let (Some(kind), Some(block)) = (expected_block, block) {
        args.push(BoundArg::Value(bind_block(kind, block)?));
    }
    Ok(args)
}

fn bind_block(kind: ParamKind, block: &StepArgument) -> Result<Value, CoercionError> {
    match (kind, block) {
        (ParamKind::DocString, StepArgument::DocString(doc)) => Ok(Value::DocString(doc.clone())),
        (ParamKind::DataTable, StepArgument::DataTable(table)) => {
            Ok(Value::DataTable(table.clone()))
        }
        _ => Err(CoercionError {
            value: block.describe().to_owned(),
            kind,
            reason: format!("the step carries a {}", block.describe()),
        }),
    }
}
