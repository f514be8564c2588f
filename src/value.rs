//! Ordinary step parameter kinds and string coercion.
//!
//! Captured step text is coerced exactly: integers and decimals are parsed
//! without passing through binary floating point, and bounded integers fail
//! instead of truncating.

use std::{fmt, str::FromStr};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::{
    block::{DataTable, DocString},
    error::CoercionError,
};

/// Semantic type of an ordinary (text-derived) step parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Captured text passed through unchanged.
    Str,
    /// Bounded signed integer (`i64`).
    Int,
    /// Arbitrary precision signed integer.
    BigInt,
    /// Arbitrary precision exact decimal.
    Decimal,
    /// Free-form block attached to the step.
    DocString,
    /// Tabular block attached to the step.
    DataTable,
}

impl ParamKind {
    /// Whether values of this kind come from the step's attached block.
    #[must_use]
    pub const fn is_block(self) -> bool { matches!(self, Self::DocString | Self::DataTable) }

    /// Rust type used for this kind in step method signatures.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Str => "String",
            Self::Int => "i64",
            Self::BigInt => "BigInt",
            Self::Decimal => "BigDecimal",
            Self::DocString => "DocString",
            Self::DataTable => "DataTable",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.type_name()) }
}

/// A coerced parameter value ready for binding.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// See [`ParamKind::Str`].
    Str(String),
    /// See [`ParamKind::Int`].
    Int(i64),
    /// See [`ParamKind::BigInt`].
    BigInt(BigInt),
    /// See [`ParamKind::Decimal`].
    Decimal(BigDecimal),
    /// See [`ParamKind::DocString`].
    DocString(DocString),
    /// See [`ParamKind::DataTable`].
    DataTable(DataTable),
}

impl Value {
    /// The kind this value satisfies.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Str(_) => ParamKind::Str,
            Self::Int(_) => ParamKind::Int,
            Self::BigInt(_) => ParamKind::BigInt,
            Self::Decimal(_) => ParamKind::Decimal,
            Self::DocString(_) => ParamKind::DocString,
            Self::DataTable(_) => ParamKind::DataTable,
        }
    }
}

/// Coerce captured step text into a value of `kind`.
///
/// # Errors
///
/// Returns [`CoercionError`] if `raw` does not parse as `kind`, if a bounded
/// integer overflows, or if `kind` is a block kind (blocks are never
/// captured from text).
///
/// # Examples
///
/// ```rust
/// use stepwire::value::{ParamKind, Value, coerce};
///
/// assert_eq!(coerce(ParamKind::Int, "-12").ok(), Some(Value::Int(-12)));
/// assert!(coerce(ParamKind::Int, "99999999999999999999").is_err());
/// ```
pub fn coerce(kind: ParamKind, raw: &str) -> Result<Value, CoercionError> {
    let fail = |reason: String| CoercionError {
        value: raw.to_owned(),
        kind,
        reason,
    };
    match kind {
        ParamKind::Str => Ok(Value::Str(raw.to_owned())),
        ParamKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| fail(e.to_string())),
        ParamKind::BigInt => BigInt::from_str(raw.trim())
            .map(Value::BigInt)
            .map_err(|e| fail(e.to_string())),
        ParamKind::Decimal => BigDecimal::from_str(raw.trim())
            .map(Value::Decimal)
            .map_err(|e| fail(e.to_string())),
        ParamKind::DocString | ParamKind::DataTable => Err(fail(
            "block parameters are taken from the step's attached block".to_owned(),
        )),
    }
}
