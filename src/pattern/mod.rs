//! Step patterns: raw regular expressions and step expressions.
//!
//! A [`Pattern`] tests literal step text and yields the captured parameter
//! strings in order. Raw regular expressions use ordinary substring capture
//! semantics; step expressions are compiled against [`ParameterTypes`] into an
//! anchored regex whose placeholders each produce exactly one capture.

mod expression;

use std::fmt;

use regex::Regex;

pub use self::expression::{Expression, ParameterType, ParameterTypes};
use crate::error::PatternError;

/// A compiled step pattern.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Regular expression matched anywhere in the step text.
    Regex(Regex),
    /// Step expression matched against the whole step text.
    Expression(Expression),
}

impl Pattern {
    /// Compile a raw regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Regex`] if `source` does not compile.
    pub fn regex(source: &str) -> Result<Self, PatternError> {
        Regex::new(source)
            .map(Self::Regex)
            .map_err(|source_error| PatternError::Regex {
                pattern: source.to_owned(),
                source: source_error,
            })
    }

    /// Compile a step expression.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the expression is malformed or names an
    /// undefined parameter type.
    pub fn expression(source: &str, types: &ParameterTypes) -> Result<Self, PatternError> {
        Expression::compile(source, types).map(Self::Expression)
    }

    /// Compile `source`, treating it as a regular expression when it starts
    /// with `^` or ends with `$` and as a step expression otherwise.
    ///
    /// # Errors
    ///
    /// Propagates compilation errors from either pattern kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stepwire::pattern::{ParameterTypes, Pattern};
    ///
    /// let types = ParameterTypes::default();
    /// let regex = Pattern::parse(r"^I have (\d+) cukes$", &types).expect("valid regex");
    /// let expr = Pattern::parse("I have {int} cuke(s)", &types).expect("valid expression");
    /// assert_eq!(regex.captures("I have 3 cukes"), Some(vec!["3".to_owned()]));
    /// assert_eq!(expr.captures("I have 1 cuke"), Some(vec!["1".to_owned()]));
    /// ```
    pub fn parse(source: &str, types: &ParameterTypes) -> Result<Self, PatternError> {
        if source.starts_with('^') || source.ends_with('$') {
            Self::regex(source)
        } else {
            Self::expression(source, types)
        }
    }

    /// Source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Regex(regex) => regex.as_str(),
            Self::Expression(expression) => expression.source(),
        }
    }

    /// Number of values a successful match produces.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        match self {
            Self::Regex(regex) => regex.captures_len().saturating_sub(1),
            Self::Expression(expression) => expression.slot_count(),
        }
    }

    /// Match `text`, returning the captured values in order.
    ///
    /// Regex groups that did not participate in the match yield an empty
    /// string so the slot count stays stable.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        match self {
            Self::Regex(regex) => regex.captures(text).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_owned()))
                    .collect()
            }),
            Self::Expression(expression) => expression.captures(text),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self { Self::Regex(regex) }
}

impl From<Expression> for Pattern {
    fn from(expression: Expression) -> Self { Self::Expression(expression) }
}

/// Values accepted where a step pattern is registered.
pub trait IntoPattern {
    /// Compile into a [`Pattern`] using the registry's parameter types.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if compilation fails.
    fn into_pattern(self, types: &ParameterTypes) -> Result<Pattern, PatternError>;
}

impl IntoPattern for &str {
    fn into_pattern(self, types: &ParameterTypes) -> Result<Pattern, PatternError> {
        Pattern::parse(self, types)
    }
}

impl IntoPattern for String {
    fn into_pattern(self, types: &ParameterTypes) -> Result<Pattern, PatternError> {
        Pattern::parse(&self, types)
    }
}

impl IntoPattern for Regex {
    fn into_pattern(self, _types: &ParameterTypes) -> Result<Pattern, PatternError> {
        Ok(Pattern::Regex(self))
    }
}

impl IntoPattern for Pattern {
    fn into_pattern(self, _types: &ParameterTypes) -> Result<Pattern, PatternError> { Ok(self) }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn types() -> ParameterTypes { ParameterTypes::default() }

    #[rstest]
    fn regex_matches_substrings(types: ParameterTypes) {
        let pattern = Pattern::parse(r"(\d+) cukes$", &types).expect("valid regex");
        assert_eq!(pattern.captures("I have 12 cukes"), Some(vec!["12".to_owned()]));
        assert_eq!(pattern.slot_count(), 1);
    }

    #[rstest]
    fn regex_reports_no_match(types: ParameterTypes) {
        let pattern = Pattern::parse(r"^I eat (\d+)$", &types).expect("valid regex");
        assert_eq!(pattern.captures("I have 12 cukes"), None);
    }

    #[rstest]
    fn optional_regex_groups_yield_empty_strings(types: ParameterTypes) {
        let pattern = Pattern::parse(r"^a( very)? big (\w+)$", &types).expect("valid regex");
        assert_eq!(
            pattern.captures("a big cuke"),
            Some(vec![String::new(), "cuke".to_owned()])
        );
    }

    #[rstest]
    fn invalid_regex_is_rejected(types: ParameterTypes) {
        let err = Pattern::parse("^(unclosed$", &types).expect_err("must not compile");
        assert!(matches!(err, PatternError::Regex { .. }));
    }

    #[test]
    fn precompiled_regex_is_accepted() {
        let regex = Regex::new("cukes").expect("valid regex");
        let pattern = regex
            .into_pattern(&ParameterTypes::default())
            .expect("regex is a pattern");
        assert_eq!(pattern.as_str(), "cukes");
    }
}
