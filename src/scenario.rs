//! Parsed scenario input handed over by the feature-file walker.
//!
//! These types mirror the shape of compiled Gherkin pickles: an ordered list
//! of steps with literal text, a keyword type, an optional attached block and
//! a stable source location. They derive `serde` so a collaborator can supply
//! them as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::{DataTable, DocString};

/// Stable position of a scenario or step in its source document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Document path or URI.
    pub uri: String,
    /// One-based line number.
    pub line: u32,
}

impl Location {
    /// Create a location.
    #[must_use]
    pub fn new(uri: impl Into<String>, line: u32) -> Self {
        Self {
            uri: uri.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uri, self.line)
    }
}

/// Keyword category of a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKeyword {
    /// `Given`.
    Context,
    /// `When`.
    Action,
    /// `Then`.
    Outcome,
    /// `And`, `But` or `*` that could not be attributed.
    #[default]
    Unknown,
}

/// Block attached to a step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepArgument {
    /// Free-form text block.
    DocString(DocString),
    /// Tabular block.
    DataTable(DataTable),
}

impl StepArgument {
    /// Short name used in diagnostics.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::DocString(_) => "doc string",
            Self::DataTable(_) => "data table",
        }
    }
}

impl From<DocString> for StepArgument {
    fn from(value: DocString) -> Self { Self::DocString(value) }
}

impl From<DataTable> for StepArgument {
    fn from(value: DataTable) -> Self { Self::DataTable(value) }
}

/// One step of a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickleStep {
    /// Literal step sentence without the keyword.
    pub text: String,
    /// Keyword category.
    #[serde(default)]
    pub keyword: StepKeyword,
    /// Attached doc string or data table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<StepArgument>,
    /// Source position for diagnostics.
    #[serde(default)]
    pub location: Location,
}

impl PickleStep {
    /// Create a step with no block and a default location.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyword: StepKeyword::Unknown,
            argument: None,
            location: Location::default(),
        }
    }

    /// Set the keyword category.
    #[must_use]
    pub fn with_keyword(mut self, keyword: StepKeyword) -> Self {
        self.keyword = keyword;
        self
    }

    /// Attach a doc string or data table.
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<StepArgument>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    /// Set the source location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// An ordered sequence of steps run against one suite instance.
///
/// # Examples
///
/// ```rust
/// use stepwire::{block::DataTable, scenario::Scenario};
///
/// let scenario = Scenario::new("eating cukes")
///     .step("I have 5 cukes")
///     .step_with("the basket holds", DataTable::from_rows([["kind"], ["pickle"]]));
/// assert_eq!(scenario.steps.len(), 2);
/// assert_eq!(scenario.steps[1].location.line, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario title.
    pub name: String,
    /// Tags inherited from the feature and scenario.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Source position of the scenario line.
    #[serde(default)]
    pub location: Location,
    /// Steps in source order.
    pub steps: Vec<PickleStep>,
}

impl Scenario {
    /// Create an empty scenario.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            location: Location::default(),
            steps: Vec::new(),
        }
    }

    /// Set the source location of the scenario line.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Append a plain step on the line after the previous one.
    #[must_use]
    pub fn step(self, text: impl Into<String>) -> Self { self.push(PickleStep::new(text)) }

    /// Append a step carrying a block.
    #[must_use]
    pub fn step_with(self, text: impl Into<String>, argument: impl Into<StepArgument>) -> Self {
        self.push(PickleStep::new(text).with_argument(argument))
    }

    /// Append a fully specified step, assigning a location if it has none.
    #[must_use]
    pub fn push(mut self, mut step: PickleStep) -> Self {
        if step.location == Location::default() {
            let line = self.steps.last().map_or(self.location.line, |s| s.location.line);
            step.location = Location::new(self.location.uri.clone(), line.saturating_add(1));
        }
        self.steps.push(step);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_get_consecutive_lines() {
        let scenario = Scenario::new("s")
            .at(Location::new("cukes.feature", 10))
            .step("one")
            .step("two");
        let lines: Vec<u32> = scenario.steps.iter().map(|s| s.location.line).collect();
        assert_eq!(lines, [11, 12]);
        assert_eq!(scenario.steps[1].location.to_string(), "cukes.feature:12");
    }

    #[test]
    fn step_lines_stop_at_the_last_line() {
        let scenario = Scenario::new("s")
            .at(Location::new("long.feature", u32::MAX - 1))
            .step("one")
            .step("two");
        let lines: Vec<u32> = scenario.steps.iter().map(|s| s.location.line).collect();
        assert_eq!(lines, [u32::MAX, u32::MAX]);
    }

    #[test]
    fn explicit_location_is_kept() {
        let step = PickleStep::new("x").at(Location::new("a.feature", 99));
        let scenario = Scenario::new("s").push(step);
        assert_eq!(scenario.steps[0].location.line, 99);
    }
}
