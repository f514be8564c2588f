//! Structured blocks attached to a step: doc strings and data tables.

use std::fmt;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::{
    error::{CoercionError, TableError},
    value::{ParamKind, Value, coerce},
};

/// Free-form multi-line text attached to a step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocString {
    /// Optional media type following the opening delimiter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Block content without delimiters.
    pub content: String,
}

impl DocString {
    /// Create a doc string with no media type.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            media_type: None,
            content: content.into(),
        }
    }

    /// Attach a media type such as `json`.
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Borrow the block content.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.content }
}

impl fmt::Display for DocString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.content) }
}

/// Ordered rows of ordered cells attached to a step.
///
/// # Examples
///
/// ```rust
/// use stepwire::block::DataTable;
///
/// let table = DataTable::from_rows([["name", "age"], ["ada", "36"]]);
/// let header = table.header_table().expect("rectangular table");
/// let age = header.get(0, "age").expect("cell present");
/// assert_eq!(age.to_i64().ok(), Some(36));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a table from owned rows.
    #[must_use]
    pub fn new(rows: Vec<Vec<String>>) -> Self { Self { rows } }

    /// Create a table from anything row-shaped.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Number of rows, including any header row.
    #[must_use]
    pub fn num_rows(&self) -> usize { self.rows.len() }

    /// Number of cells in the first row.
    #[must_use]
    pub fn num_cols(&self) -> usize { self.rows.first().map_or(0, Vec::len) }

    /// Cell at `row`, `col`, if present.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell<'_>> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(|value| Cell(value))
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> { self.rows.iter().map(Vec::as_slice) }

    /// View the table with its first row as column headers.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Empty`] for a table without rows and
    /// [`TableError::Ragged`] if any row differs in width from the header.
    pub fn header_table(&self) -> Result<HeaderTable<'_>, TableError> {
        let (headers, body) = self.rows.split_first().ok_or(TableError::Empty)?;
        for (offset, row) in body.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(TableError::Ragged {
                    row: offset + 1,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }
        Ok(HeaderTable { headers, body })
    }
}

/// A single table cell with exact coercions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell<'a>(&'a str);

impl<'a> Cell<'a> {
    /// Raw cell text.
    #[must_use]
    pub fn as_str(&self) -> &'a str { self.0 }

    /// Parse the cell as a bounded integer.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] if the text is not an `i64`.
    pub fn to_i64(&self) -> Result<i64, CoercionError> {
        match coerce(ParamKind::Int, self.0)? {
            Value::Int(value) => Ok(value),
            other => Err(self.mismatch(ParamKind::Int, &other)),
        }
    }

    /// Parse the cell as an arbitrary precision integer.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] if the text is not an integer.
    pub fn to_bigint(&self) -> Result<BigInt, CoercionError> {
        match coerce(ParamKind::BigInt, self.0)? {
            Value::BigInt(value) => Ok(value),
            other => Err(self.mismatch(ParamKind::BigInt, &other)),
        }
    }

    /// Parse the cell as an exact decimal.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] if the text is not a decimal number.
    pub fn to_decimal(&self) -> Result<BigDecimal, CoercionError> {
        match coerce(ParamKind::Decimal, self.0)? {
            Value::Decimal(value) => Ok(value),
            other => Err(self.mismatch(ParamKind::Decimal, &other)),
        }
    }

    fn mismatch(&self, kind: ParamKind, found: &Value) -> CoercionError {
        CoercionError {
            value: self.0.to_owned(),
            kind,
            reason: format!("coercion produced {}", found.kind()),
        }
    }
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.0) }
}

/// A data table viewed through its header row.
#[derive(Clone, Copy, Debug)]
pub struct HeaderTable<'a> {
    headers: &'a [String],
    body: &'a [Vec<String>],
}

impl<'a> HeaderTable<'a> {
    /// Column names.
    #[must_use]
    pub fn headers(&self) -> &'a [String] { self.headers }

    /// Number of data rows (excluding the header).
    #[must_use]
    pub fn num_rows(&self) -> usize { self.body.len() }

    /// Cell in data row `row` under `column`.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<Cell<'a>> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.body
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(|value| Cell(value))
    }

    /// Iterate over data rows as `(header, cell)` pairs.
    pub fn records(self) -> impl Iterator<Item = Vec<(&'a str, Cell<'a>)>> + 'a {
        let headers = self.headers;
        self.body.iter().map(move |row| {
            headers
                .iter()
                .zip(row)
                .map(|(h, v)| (h.as_str(), Cell(v)))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn people() -> DataTable {
        DataTable::from_rows([["name", "balance"], ["ada", "10.25"], ["alan", "-3"]])
    }

    #[rstest]
    fn header_view_looks_up_columns(people: DataTable) {
        let header = people.header_table().expect("rectangular table");
        assert_eq!(header.headers(), ["name", "balance"]);
        assert_eq!(header.num_rows(), 2);
        let balance = header.get(1, "balance").expect("cell present");
        assert_eq!(balance.to_i64().ok(), Some(-3));
        assert!(header.get(0, "missing").is_none());
    }

    #[rstest]
    fn records_pair_headers_with_cells(people: DataTable) {
        let header = people.header_table().expect("rectangular table");
        let first = header.records().next().expect("one record");
        assert_eq!(first.first().map(|(h, c)| (*h, c.as_str())), Some(("name", "ada")));
    }

    #[rstest]
    fn cell_coercions_are_exact(people: DataTable) {
        let cell = people.cell(1, 1).expect("cell present");
        assert_eq!(cell.to_decimal().map(|d| d.to_string()).ok(), Some("10.25".to_owned()));
        assert!(cell.to_i64().is_err());
    }

    #[test]
    fn ragged_table_is_rejected() {
        let table = DataTable::from_rows(vec![vec!["a", "b"], vec!["1"]]);
        assert_eq!(
            table.header_table().err(),
            Some(TableError::Ragged {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn empty_table_has_no_header() {
        assert_eq!(DataTable::default().header_table().err(), Some(TableError::Empty));
        assert_eq!(DataTable::default().num_cols(), 0);
    }
}
