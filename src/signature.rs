//! Registration-time descriptors of step callable shapes.
//!
//! A [`Signature`] lists the kind of every parameter after the suite receiver
//! and the callable's return arity. It is computed once from the callable's
//! type when a definition is registered and never re-inspected when the step
//! runs.

use std::{
    any::{Any, TypeId, type_name},
    fmt,
};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{
    block::{DataTable, DocString},
    value::{ParamKind, Value},
};

/// Identity of a special argument type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpecialType {
    id: TypeId,
    name: &'static str,
}

impl SpecialType {
    /// Descriptor for `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Type identifier used as the special-argument table key.
    #[must_use]
    pub fn id(&self) -> TypeId { self.id }

    /// Fully qualified type name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str { self.name }
}

impl fmt::Display for SpecialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}

/// How a single parameter is supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// Injected from the special-argument table.
    Special(SpecialType),
    /// Coerced from captured text or taken from the attached block.
    Param(ParamKind),
    /// Not accepted as a step parameter.
    Unsupported(&'static str),
}

impl ArgKind {
    /// Type name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Special(ty) => ty.name(),
            Self::Param(kind) => kind.type_name(),
            Self::Unsupported(name) => name,
        }
    }
}

/// Ordered parameter kinds and return arity of a step callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    args: Vec<ArgKind>,
    returns: usize,
    return_type: &'static str,
}

impl Signature {
    /// Describe a callable taking `args` and returning `returns` values.
    #[must_use]
    pub fn new(args: Vec<ArgKind>, returns: usize, return_type: &'static str) -> Self {
        Self {
            args,
            returns,
            return_type,
        }
    }

    /// Parameter kinds after the suite receiver.
    #[must_use]
    pub fn args(&self) -> &[ArgKind] { &self.args }

    /// Number of values the callable returns.
    #[must_use]
    pub fn returns(&self) -> usize { self.returns }

    /// Name of the return type.
    #[must_use]
    pub fn return_type(&self) -> &'static str { self.return_type }
}

/// A value ready to be handed to a step callable.
#[derive(Debug)]
pub enum BoundArg {
    /// Resolved special argument.
    Special(Box<dyn Any>),
    /// Coerced ordinary parameter.
    Value(Value),
}

/// Types accepted as step callable parameters.
///
/// Implemented for the ordinary coercion targets (`String`, `i64`, `BigInt`,
/// `BigDecimal`, `DocString`, `DataTable`) and for every [`Special`] type.
/// `f32` and `f64` implement it only so that registration can reject them
/// with a clear error instead of coercing through binary floating point.
///
/// [`Special`]: crate::special::Special
pub trait StepArg: Sized + 'static {
    /// Registration-time descriptor.
    fn kind() -> ArgKind;

    /// Recover the typed value from a bound argument.
    fn from_bound(arg: BoundArg) -> Option<Self>;
}

impl<T: crate::special::Special> StepArg for T {
    fn kind() -> ArgKind { ArgKind::Special(SpecialType::of::<T>()) }

    fn from_bound(arg: BoundArg) -> Option<Self> {
        match arg {
            BoundArg::Special(value) => value.downcast::<T>().ok().map(|boxed| *boxed),
            BoundArg::Value(_) => None,
        }
    }
}

macro_rules! impl_param_arg {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl StepArg for $ty {
                fn kind() -> ArgKind { ArgKind::Param(ParamKind::$kind) }

                fn from_bound(arg: BoundArg) -> Option<Self> {
                    match arg {
                        BoundArg::Value(Value::$kind(value)) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_param_arg!(
    String => Str,
    i64 => Int,
    BigInt => BigInt,
    BigDecimal => Decimal,
    DocString => DocString,
    DataTable => DataTable,
);

macro_rules! impl_unsupported_arg {
    ($($ty:ty),*) => {
        $(
            impl StepArg for $ty {
                fn kind() -> ArgKind { ArgKind::Unsupported(stringify!($ty)) }

                fn from_bound(_: BoundArg) -> Option<Self> { None }
            }
        )*
    };
}

impl_unsupported_arg!(f32, f64);

/// Return types of step callables.
///
/// Only `()` is accepted by registration; the other implementations exist so
/// that a callable returning a value fails with
/// [`DefinitionError::ReturnArity`](crate::error::DefinitionError::ReturnArity)
/// rather than a type error far from the registration site.
pub trait StepReturn: 'static {
    /// Number of returned values.
    const ARITY: usize;
}

impl StepReturn for () {
    const ARITY: usize = 0;
}

macro_rules! impl_single_return {
    ($($ty:ty),*) => { $(impl StepReturn for $ty { const ARITY: usize = 1; })* };
}

impl_single_return!(bool, String, i32, i64, u32, u64, usize);

impl<T: 'static, E: 'static> StepReturn for Result<T, E> {
    const ARITY: usize = 1;
}

impl<T: 'static> StepReturn for Option<T> {
    const ARITY: usize = 1;
}

impl<A: 'static, B: 'static> StepReturn for (A, B) {
    const ARITY: usize = 2;
}

impl<A: 'static, B: 'static, C: 'static> StepReturn for (A, B, C) {
    const ARITY: usize = 3;
}
