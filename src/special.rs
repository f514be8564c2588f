//! The special-argument table.
//!
//! Special arguments are values a step receives by type rather than from
//! its text. [`SpecialArgs`] maps each recognised type to a resolver run
//! against the [`ScenarioState`]; it is seeded with [`TestContext`] and
//! [`PropContext`]. The suite instance itself is always the receiver of a
//! step method and needs no entry.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use crate::{
    context::{PropContext, ScenarioState, TestContext},
    error::SpecialArgUnavailable,
    signature::SpecialType,
};

/// Marker for types injected as special arguments.
///
/// Implementing it makes a type usable as a step parameter; a resolver must
/// also be registered with [`SpecialArgs::insert`] before definitions that
/// request it are built.
pub trait Special: 'static {}

impl Special for TestContext {}
impl Special for PropContext {}

type Resolver =
    Arc<dyn Fn(&ScenarioState) -> Result<Box<dyn Any>, SpecialArgUnavailable> + Send + Sync>;

/// A recognised special type and how to produce it.
#[derive(Clone)]
pub struct SpecialArgSpec {
    ty: SpecialType,
    resolver: Resolver,
}

impl SpecialArgSpec {
    /// The type this special argument produces.
    #[must_use]
    pub fn ty(&self) -> SpecialType { self.ty }

    /// Produce the value for the current scenario.
    ///
    /// # Errors
    ///
    /// Returns [`SpecialArgUnavailable`] if the current execution cannot
    /// supply the value.
    pub fn resolve(&self, state: &ScenarioState) -> Result<Box<dyn Any>, SpecialArgUnavailable> {
        (self.resolver)(state)
    }
}

impl fmt::Debug for SpecialArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialArgSpec")
            .field("ty", &self.ty.name())
            .finish_non_exhaustive()
    }
}

/// Table of special-argument types and their resolvers.
///
/// # Examples
///
/// ```rust
/// use stepwire::{
///     context::{ScenarioState, TestContext},
///     signature::SpecialType,
///     special::{Special, SpecialArgs},
/// };
///
/// #[derive(Clone)]
/// struct ScenarioName(String);
/// impl Special for ScenarioName {}
///
/// let mut specials = SpecialArgs::default();
/// specials.insert(|state: &ScenarioState| Ok(ScenarioName(state.test().scenario())));
///
/// let spec = specials.get(&SpecialType::of::<ScenarioName>()).expect("registered");
/// let state = ScenarioState::new(TestContext::new("eating"));
/// let value = spec.resolve(&state).expect("resolves");
/// assert_eq!(value.downcast_ref::<ScenarioName>().map(|n| n.0.as_str()), Some("eating"));
/// ```
#[derive(Clone, Debug)]
pub struct SpecialArgs {
    specs: HashMap<TypeId, SpecialArgSpec>,
}

impl Default for SpecialArgs {
    fn default() -> Self {
        let mut table = Self {
            specs: HashMap::new(),
        };
        table.insert(|state: &ScenarioState| Ok(state.test().clone()));
        table.insert(|state: &ScenarioState| {
            state.property().cloned().ok_or_else(|| SpecialArgUnavailable {
                name: std::any::type_name::<PropContext>(),
                reason: "the scenario is not running in randomized mode".to_owned(),
            })
        });
        table
    }
}

impl SpecialArgs {
    /// Register or replace the resolver for `T`.
    pub fn insert<T, F>(&mut self, resolver: F) -> &mut Self
    where
        T: Special,
        F: Fn(&ScenarioState) -> Result<T, SpecialArgUnavailable> + Send + Sync + 'static,
    {
        let ty = SpecialType::of::<T>();
        let resolver: Resolver = Arc::new(move |state: &ScenarioState| {
            resolver(state).map(|value| Box::new(value) as Box<dyn Any>)
        });
        self.specs.insert(ty.id(), SpecialArgSpec { ty, resolver });
        self
    }

    /// Look up the resolver for `ty`.
    #[must_use]
    pub fn get(&self, ty: &SpecialType) -> Option<&SpecialArgSpec> { self.specs.get(&ty.id()) }

    /// Whether `ty` has a resolver.
    #[must_use]
    pub fn contains(&self, ty: &SpecialType) -> bool { self.specs.contains_key(&ty.id()) }

    /// Number of recognised special types.
    #[must_use]
    pub fn len(&self) -> usize { self.specs.len() }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.specs.is_empty() }
}
