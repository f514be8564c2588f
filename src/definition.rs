//! Immutable step definitions and their registration-time validation.

use std::fmt;

use tracing::warn;

use crate::{
    error::DefinitionError,
    handler::Handler,
    pattern::Pattern,
    signature::{ArgKind, Signature, SpecialType},
    special::{SpecialArgSpec, SpecialArgs},
    suite::Method,
    value::ParamKind,
};

/// A callable's signature split into its leading special arguments and
/// trailing ordinary parameters.
#[derive(Clone, Debug)]
pub(crate) struct Shape {
    pub(crate) specials: Vec<SpecialArgSpec>,
    pub(crate) params: Vec<ParamKind>,
}

/// Validate `signature` and split it into specials and ordinary parameters.
///
/// Rejects return values, unsupported parameter types, special arguments
/// that follow an ordinary parameter or have no resolver, and block
/// parameters that are not last.
pub(crate) fn shape(
    signature: &Signature,
    location: &str,
    specials: &SpecialArgs,
) -> Result<Shape, DefinitionError> {
    if signature.returns() != 0 {
        return Err(DefinitionError::ReturnArity {
            location: location.to_owned(),
            arity: signature.returns(),
            ty: signature.return_type(),
        });
    }

    let mut shape = Shape {
        specials: Vec::new(),
        params: Vec::new(),
    };
    for (position, arg) in signature.args().iter().enumerate() {
        match *arg {
            ArgKind::Unsupported(ty) => {
                return Err(DefinitionError::UnsupportedType {
                    location: location.to_owned(),
                    position,
                    ty,
                });
            }
            ArgKind::Special(ty) => {
                if !shape.params.is_empty() {
                    return Err(DefinitionError::InterleavedSpecial {
                        location: location.to_owned(),
                        position,
                        ty: ty.name(),
                    });
                }
                let spec = specials
                    .get(&ty)
                    .ok_or_else(|| DefinitionError::UnknownSpecial {
                        location: location.to_owned(),
                        position,
                        ty: ty.name(),
                    })?;
                shape.specials.push(spec.clone());
            }
            ArgKind::Param(kind) => {
                if let Some(&block) = shape.params.last().filter(|k| k.is_block()) {
                    return Err(DefinitionError::BlockNotLast {
                        location: location.to_owned(),
                        position: position - 1,
                        kind: block,
                    });
                }
                shape.params.push(kind);
            }
        }
    }
    Ok(shape)
}

/// A pattern bound to a validated callable.
///
/// Built once by the [`Registry`](crate::registry::Registry) and shared
/// behind an `Arc`; never modified afterwards.
pub struct StepDefinition<S> {
    pattern: Pattern,
    specials: Vec<SpecialArgSpec>,
    params: Vec<ParamKind>,
    handler: Handler<S>,
    location: String,
    method: Option<String>,
}

impl<S> StepDefinition<S> {
    /// Validate `signature` and bind it to `pattern`.
    ///
    /// A pattern whose capture count differs from the number of text
    /// parameters is accepted with a warning; the mismatch surfaces as
    /// [`StepError::ArityMismatch`](crate::error::StepError::ArityMismatch)
    /// when a step matches it.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] describing the first malformed part of
    /// the signature.
    pub fn new(
        pattern: Pattern,
        signature: &Signature,
        handler: Handler<S>,
        location: String,
        specials: &SpecialArgs,
    ) -> Result<Self, DefinitionError> {
        let Shape { specials, params } = shape(signature, &location, specials)?;
        let definition = Self {
            pattern,
            specials,
            params,
            handler,
            location,
            method: None,
        };
        if definition.pattern.slot_count() != definition.capture_count() {
            warn!(
                "pattern and parameter counts disagree; matching steps will fail: \
                 pattern={}, captures={}, parameters={}, location={}",
                definition.pattern,
                definition.pattern.slot_count(),
                definition.capture_count(),
                definition.location
            );
        }
        Ok(definition)
    }

    /// Build a definition for a suite method discovered by name.
    ///
    /// # Errors
    ///
    /// See [`StepDefinition::new`].
    pub fn from_method(
        pattern: Pattern,
        method: &Method<S>,
        specials: &SpecialArgs,
    ) -> Result<Self, DefinitionError> {
        let mut definition = Self::new(
            pattern,
            method.signature(),
            method.handler().clone(),
            method.location().to_owned(),
            specials,
        )?;
        definition.method = Some(method.name().to_owned());
        Ok(definition)
    }

    /// Compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern { &self.pattern }

    /// Special arguments in declaration order.
    #[must_use]
    pub fn specials(&self) -> &[SpecialArgSpec] { &self.specials }

    /// Ordinary parameter kinds in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamKind] { &self.params }

    /// Number of parameters filled from pattern captures.
    #[must_use]
    pub fn capture_count(&self) -> usize { self.params.len() - usize::from(self.block().is_some()) }

    /// Kind of the trailing block parameter, if any.
    #[must_use]
    pub fn block(&self) -> Option<ParamKind> { self.params.last().copied().filter(|k| k.is_block()) }

    /// Whether the definition requests `T` as a special argument.
    #[must_use]
    pub fn requests<T: 'static>(&self) -> bool {
        let wanted = SpecialType::of::<T>();
        self.specials.iter().any(|spec| spec.ty() == wanted)
    }

    /// Type-erased callable.
    #[must_use]
    pub fn handler(&self) -> &Handler<S> { &self.handler }

    /// Where the callable was registered or declared.
    #[must_use]
    pub fn location(&self) -> &str { &self.location }

    /// Name of the suite method, for auto-discovered definitions.
    #[must_use]
    pub fn method_name(&self) -> Option<&str> { self.method.as_deref() }
}

impl<S> fmt::Debug for StepDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("pattern", &self.pattern.as_str())
            .field("params", &self.params)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
