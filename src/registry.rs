//! Step definition registry and the suggestion table.
//!
//! [`Registry`] holds explicitly registered definitions in registration
//! order and a memo of definitions auto-discovered from suite methods by
//! convention-derived name. Explicit definitions are always scanned first.
//! [`Suggestions`] collects the derived names of steps nothing could run.

use std::{
    any::type_name,
    fmt,
    panic::Location,
    sync::{Arc, PoisonError, RwLock},
};

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{debug, info};

use crate::{
    definition::{StepDefinition, shape},
    error::DefinitionError,
    guess::{MethodNameGuess, guess_method, strip_keyword},
    handler::StepFn,
    hooks::HookKind,
    metrics,
    pattern::{IntoPattern, ParameterType, ParameterTypes, Pattern},
    scenario::StepArgument,
    special::SpecialArgs,
    suite::{MethodTable, Suite},
};

/// A definition matched against a step.
pub struct StepMatch<S> {
    /// The matched definition.
    pub definition: Arc<StepDefinition<S>>,
    /// Captured values in pattern order.
    pub captures: Vec<String>,
    /// Whether the definition came from auto-discovery.
    pub discovered: bool,
}

impl<S> fmt::Debug for StepMatch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepMatch")
            .field("definition", &self.definition)
            .field("captures", &self.captures)
            .field("discovered", &self.discovered)
            .finish()
    }
}

/// Outcome of resolving step text.
#[derive(Debug)]
pub enum Resolution<S> {
    /// A definition was found.
    Matched(StepMatch<S>),
    /// Nothing matched; the guess has been recorded as a suggestion.
    Unresolved(MethodNameGuess),
}

/// Ordered step definitions for one suite type.
pub struct Registry<S> {
    methods: MethodTable<S>,
    specials: SpecialArgs,
    types: ParameterTypes,
    explicit: RwLock<Vec<Arc<StepDefinition<S>>>>,
    discovered: DashMap<String, Arc<StepDefinition<S>>>,
}

impl<S: Suite> Registry<S> {
    /// Create a registry for `S` using the default special-argument table.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if any method declared by the suite is
    /// malformed.
    pub fn new() -> Result<Self, DefinitionError> { Self::with_specials(SpecialArgs::default()) }

    /// Create a registry for `S` with a custom special-argument table.
    ///
    /// Every non-hook suite method is validated immediately so that a
    /// malformed suite fails before any scenario runs.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] for the first malformed method.
    pub fn with_specials(specials: SpecialArgs) -> Result<Self, DefinitionError> {
        let methods = MethodTable::<S>::for_suite();
        for method in methods.iter().filter(|m| !HookKind::is_reserved(m.name())) {
            shape(method.signature(), method.location(), &specials)?;
        }
        Ok(Self {
            methods,
            specials,
            types: ParameterTypes::default(),
            explicit: RwLock::new(Vec::new()),
            discovered: DashMap::new(),
        })
    }
}

impl<S: 'static> Registry<S> {
    /// Suite methods available for discovery and hooks.
    #[must_use]
    pub fn methods(&self) -> &MethodTable<S> { &self.methods }

    /// Special-argument table used to validate and bind definitions.
    #[must_use]
    pub fn specials(&self) -> &SpecialArgs { &self.specials }

    /// Add a parameter type for step expressions registered afterwards.
    pub fn define_parameter_type(&mut self, parameter: ParameterType) {
        self.types.define(parameter);
    }

    /// Register `f` for steps matching `pattern`.
    ///
    /// Definitions are scanned in registration order, ahead of any
    /// auto-discovered definition.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the pattern does not compile or the
    /// callable is malformed.
    #[track_caller]
    pub fn register<P, Args, F>(
        &self,
        pattern: P,
        f: F,
    ) -> Result<Arc<StepDefinition<S>>, DefinitionError>
    where
        P: IntoPattern,
        F: StepFn<S, Args>,
    {
        let location = format!("{} @ {}", type_name::<S>(), Location::caller());
        let pattern = pattern.into_pattern(&self.types)?;
        let signature = f.signature();
        let definition = Arc::new(StepDefinition::new(
            pattern,
            &signature,
            f.into_handler(),
            location,
            &self.specials,
        )?);
        debug!("registered step definition: pattern={}", definition.pattern());
        self.explicit
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&definition));
        Ok(definition)
    }

    /// Resolve step text to a definition.
    ///
    /// Explicit definitions are tried in registration order and the first
    /// match wins; each is tried on the full text, then on the text without
    /// its leading keyword. Otherwise the convention-derived method name is looked up
    /// on the suite; a hit is memoized so later steps deriving the same name
    /// reuse the same definition. A miss is recorded in `suggestions`.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if a discovered method cannot be turned
    /// into a definition, or if the pattern derived from `text` does not
    /// match it.
    pub fn find(
        &self,
        text: &str,
        block: Option<&StepArgument>,
        suggestions: &Suggestions,
    ) -> Result<Resolution<S>, DefinitionError> {
        let body = strip_keyword(text);
        {
            let explicit = self.explicit.read().unwrap_or_else(PoisonError::into_inner);
            for definition in explicit.iter() {
                let captures = definition.pattern().captures(text).or_else(|| {
                    (body != text)
                        .then(|| definition.pattern().captures(body))
                        .flatten()
                });
                if let Some(captures) = captures {
                    return Ok(Resolution::Matched(StepMatch {
                        definition: Arc::clone(definition),
                        captures,
                        discovered: false,
                    }));
                }
            }
        }

        let guess = guess_method(text, block);
        let method = self
            .methods
            .get(&guess.name)
            .filter(|m| !HookKind::is_reserved(m.name()));
        let Some(method) = method else {
            suggestions.record(guess.clone());
            metrics::inc_unresolved();
            return Ok(Resolution::Unresolved(guess));
        };

        let definition = match self.discovered.entry(guess.name.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let definition = Arc::new(StepDefinition::from_method(
                    Pattern::regex(&guess.pattern)?,
                    method,
                    &self.specials,
                )?);
                info!(
                    "auto-discovered step definition: method={}, pattern={}",
                    guess.name, guess.pattern
                );
                metrics::inc_discovered();
                Arc::clone(entry.insert(definition).value())
            }
        };
        // A memoized definition keeps the pattern of the first text that
        // derived its name; other texts sharing the name use their own.
        let captures = match definition.pattern().captures(body) {
            Some(captures) => captures,
            None => Pattern::regex(&guess.pattern)?.captures(body).ok_or_else(|| {
                DefinitionError::DerivedMismatch {
                    method: guess.name.clone(),
                    pattern: guess.pattern.clone(),
                    text: text.to_owned(),
                }
            })?,
        };
        Ok(Resolution::Matched(StepMatch {
            definition,
            captures,
            discovered: true,
        }))
    }

    /// Number of explicitly registered definitions.
    #[must_use]
    pub fn explicit_len(&self) -> usize {
        self.explicit
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of memoized auto-discovered definitions.
    #[must_use]
    pub fn discovered_len(&self) -> usize { self.discovered.len() }

    /// The memoized definition for a derived method name.
    #[must_use]
    pub fn discovered(&self, name: &str) -> Option<Arc<StepDefinition<S>>> {
        self.discovered.get(name).map(|entry| Arc::clone(entry.value()))
    }
}

impl<S> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("methods", &self.methods)
            .field("discovered", &self.discovered.len())
            .finish_non_exhaustive()
    }
}

/// Derived names and patterns of steps that matched nothing.
///
/// Shared by every scenario of a run and safe to record into concurrently.
/// Pass the same table to several runs, or [`merge`](Self::merge) tables,
/// to accumulate suggestions across runs.
#[derive(Debug, Default)]
pub struct Suggestions(DashMap<String, MethodNameGuess>);

impl Suggestions {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Record `guess`, keeping the first guess seen for its name.
    ///
    /// Returns `true` if the name was not yet present.
    pub fn record(&self, guess: MethodNameGuess) -> bool {
        match self.0.entry(guess.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(guess);
                true
            }
        }
    }

    /// Copy every suggestion from `other` not already present.
    pub fn merge(&self, other: &Suggestions) {
        if std::ptr::eq(self, other) {
            return;
        }
        for entry in other.0.iter() {
            self.record(entry.value().clone());
        }
    }

    /// Number of distinct suggestions.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// All suggestions sorted by method name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MethodNameGuess> {
        let mut guesses: Vec<_> = self.0.iter().map(|e| e.value().clone()).collect();
        guesses.sort_by(|a, b| a.name.cmp(&b.name));
        guesses
    }
}
