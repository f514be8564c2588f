//! Naming convention used for auto-discovery and suggestions.
//!
//! [`guess_method`] is a pure function from step text to a candidate method
//! name and an anchored regex. Quoted strings and numbers become capture
//! groups; the remaining words, lowercased and joined with underscores, form
//! the method name.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::{scenario::StepArgument, value::ParamKind};

const KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];
const DOUBLE_QUOTED: &str = r#""([^"]*)""#;
const SINGLE_QUOTED: &str = "'([^']*)'";
const INTEGER: &str = r"(-?\d+)";
const DECIMAL: &str = r"(-?\d+\.\d+)";

/// Method name and pattern derived from step text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MethodNameGuess {
    /// Snake-case method name looked up on the suite.
    pub name: String,
    /// Anchored regular expression matching the step text.
    pub pattern: String,
    /// Parameter kinds in capture order, followed by any block kind.
    pub params: Vec<ParamKind>,
}

impl MethodNameGuess {
    /// Render a method stub that would satisfy the step.
    ///
    /// ```rust
    /// use stepwire::guess::guess_method;
    ///
    /// let stub = guess_method("I have 5 cukes", None).snippet();
    /// assert!(stub.contains("fn i_have_cukes(&mut self, arg1: i64)"));
    /// ```
    #[must_use]
    pub fn snippet(&self) -> String {
        let mut out = format!("// {}\nfn {}(&mut self", self.pattern, self.name);
        let mut position = 0;
        for kind in &self.params {
            let arg = match kind {
                ParamKind::DocString => "doc".to_owned(),
                ParamKind::DataTable => "table".to_owned(),
                _ => {
                    position += 1;
                    format!("arg{position}")
                }
            };
            let _ = write!(out, ", {arg}: {kind}");
        }
        out.push_str(") {\n    todo!()\n}\n");
        out
    }
}

impl fmt::Display for MethodNameGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.pattern)
    }
}

/// Derive a method name and pattern from step text.
///
/// A leading Gherkin keyword is ignored. Double or single quoted strings
/// become string captures, standalone integers and decimals become numeric
/// captures, and an attached block appends its kind as the final parameter.
///
/// # Examples
///
/// ```rust
/// use stepwire::{guess::guess_method, value::ParamKind};
///
/// let guess = guess_method(r#"When I eat 3 "green" cukes"#, None);
/// assert_eq!(guess.name, "i_eat_cukes");
/// assert_eq!(guess.pattern, r#"^I eat (-?\d+) "([^"]*)" cukes$"#);
/// assert_eq!(guess.params, [ParamKind::Int, ParamKind::Str]);
/// ```
#[must_use]
pub fn guess_method(text: &str, block: Option<&StepArgument>) -> MethodNameGuess {
    let chars: Vec<char> = strip_keyword(text).chars().collect();
    let mut pattern = String::from("^");
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut params = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let boundary_before = i == 0 || !chars[i - 1].is_alphanumeric();
        if boundary_before {
            if let Some((end, group)) = quoted(&chars, i) {
                flush(&mut word, &mut words);
                pattern.push_str(group);
                params.push(ParamKind::Str);
                i = end;
                continue;
            }
            if let Some((end, kind)) = number(&chars, i) {
                flush(&mut word, &mut words);
                pattern.push_str(if kind == ParamKind::Int { INTEGER } else { DECIMAL });
                params.push(kind);
                i = end;
                continue;
            }
        }
        let c = chars[i];
        if c.is_ascii_alphanumeric() {
            word.push(c.to_ascii_lowercase());
        } else {
            flush(&mut word, &mut words);
        }
        pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        i += 1;
    }
    flush(&mut word, &mut words);
    pattern.push('$');

    match block {
        Some(StepArgument::DocString(_)) => params.push(ParamKind::DocString),
        Some(StepArgument::DataTable(_)) => params.push(ParamKind::DataTable),
        None => {}
    }

    let mut name = words.join("_");
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "step_");
    }
    MethodNameGuess {
        name: name.trim_end_matches('_').to_owned(),
        pattern,
        params,
    }
}

/// Step text without surrounding whitespace or a leading Gherkin keyword.
///
/// Derived patterns are anchored to this form of the text.
pub(crate) fn strip_keyword(text: &str) -> &str {
    let text = text.trim();
    for keyword in KEYWORDS {
        if let Some(rest) = text.strip_prefix(keyword) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    text
}

fn flush(word: &mut String, words: &mut Vec<String>) {
    if !word.is_empty() {
        words.push(std::mem::take(word));
    }
}

fn ends_at_boundary(chars: &[char], end: usize) -> bool {
    chars.get(end).is_none_or(|c| !c.is_alphanumeric())
}

/// Quoted string starting at `start`: returns the index after the closing
/// quote and the capture group to emit.
fn quoted(chars: &[char], start: usize) -> Option<(usize, &'static str)> {
    let (quote, group) = match chars[start] {
        '"' => ('"', DOUBLE_QUOTED),
        '\'' => ('\'', SINGLE_QUOTED),
        _ => return None,
    };
    let close = start + 1 + chars[start + 1..].iter().position(|&c| c == quote)?;
    ends_at_boundary(chars, close + 1).then_some((close + 1, group))
}

/// Integer or decimal literal starting at `start`.
fn number(chars: &[char], start: usize) -> Option<(usize, ParamKind)> {
    let digits_from = |from: usize| {
        chars[from..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count()
    };
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    let whole = digits_from(i);
    if whole == 0 {
        return None;
    }
    i += whole;
    let mut kind = ParamKind::Int;
    if chars.get(i) == Some(&'.') {
        let fraction = digits_from(i + 1);
        if fraction > 0 {
            i += 1 + fraction;
            kind = ParamKind::Decimal;
        }
    }
    ends_at_boundary(chars, i).then_some((i, kind))
}
