//! Suite types and their named method tables.
//!
//! A suite declares the methods that convention-based discovery and hook
//! lookup may find by name. The table is filled once per runner and each
//! entry carries its registration-time [`Signature`].

use std::{any::type_name, collections::BTreeMap, fmt, panic::Location};

use crate::{
    handler::{Handler, StepFn},
    signature::Signature,
};

/// A type whose instances execute scenario steps.
///
/// One instance is built per scenario. Methods listed by [`Suite::methods`]
/// are candidates for auto-discovery; those named `before`, `after`,
/// `before_step` and `after_step` are lifecycle hooks instead.
///
/// # Examples
///
/// ```rust
/// use stepwire::{methods, suite::{MethodTable, Suite}};
///
/// #[derive(Default)]
/// struct Basket {
///     cukes: i64,
/// }
///
/// impl Basket {
///     fn i_have_cukes(&mut self, count: i64) { self.cukes = count; }
///     fn before(&mut self) { self.cukes = 0; }
/// }
///
/// impl Suite for Basket {
///     fn methods(table: &mut MethodTable<Self>) {
///         methods!(table => Self { i_have_cukes, before });
///     }
/// }
///
/// let table = MethodTable::<Basket>::for_suite();
/// assert!(table.get("i_have_cukes").is_some());
/// assert_eq!(table.len(), 2);
/// ```
pub trait Suite: Sized + 'static {
    /// Declare the suite's named methods.
    fn methods(table: &mut MethodTable<Self>) { let _ = table; }
}

/// A named suite method.
pub struct Method<S> {
    name: String,
    handler: Handler<S>,
    signature: Signature,
    location: String,
}

impl<S> Method<S> {
    /// Method name as declared.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Type-erased callable.
    #[must_use]
    pub fn handler(&self) -> &Handler<S> { &self.handler }

    /// Registration-time parameter descriptor.
    #[must_use]
    pub fn signature(&self) -> &Signature { &self.signature }

    /// `Type::method @ file:line` of the declaration.
    #[must_use]
    pub fn location(&self) -> &str { &self.location }
}

impl<S> Clone for Method<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: self.handler.clone(),
            signature: self.signature.clone(),
            location: self.location.clone(),
        }
    }
}

impl<S> fmt::Debug for Method<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Name-to-method table of a suite type.
pub struct MethodTable<S> {
    methods: BTreeMap<String, Method<S>>,
}

impl<S> Default for MethodTable<S> {
    fn default() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }
}

impl<S: 'static> MethodTable<S> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Add or replace the method called `name`.
    #[track_caller]
    pub fn method<Args, F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: StepFn<S, Args>,
    {
        let name = name.into();
        let location = format!("{}::{name} @ {}", type_name::<S>(), Location::caller());
        let signature = f.signature();
        let method = Method {
            name: name.clone(),
            handler: f.into_handler(),
            signature,
            location,
        };
        self.methods.insert(name, method);
        self
    }

    /// Look up a method by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Method<S>> { self.methods.get(name) }

    /// Iterate over methods in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Method<S>> { self.methods.values() }

    /// Number of methods.
    #[must_use]
    pub fn len(&self) -> usize { self.methods.len() }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.methods.is_empty() }
}

impl<S: Suite> MethodTable<S> {
    /// Build the table declared by [`Suite::methods`].
    #[must_use]
    pub fn for_suite() -> Self {
        let mut table = Self::new();
        S::methods(&mut table);
        table
    }
}

impl<S> fmt::Debug for MethodTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.methods.values()).finish()
    }
}

/// Add suite methods to a [`MethodTable`] under their own names.
///
/// ```rust,ignore
/// methods!(table => Self { i_have_cukes, i_eat_cukes, after });
/// ```
#[macro_export]
macro_rules! methods {
    ($table:expr => $ty:ty { $($name:ident),* $(,)? }) => {{
        let table: &mut $crate::suite::MethodTable<$ty> = $table;
        $( table.method(stringify!($name), <$ty>::$name); )*
    }};
}
