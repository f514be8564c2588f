//! Step expression compiler.
//!
//! Supports typed placeholders (`{int}`, `{string}`, ...), optional text in
//! parentheses, word alternation with `/` and backslash escapes. Each
//! placeholder produces exactly one captured value regardless of how many
//! groups its parameter type regex contains.

use std::collections::HashMap;

use regex::Regex;

use crate::error::PatternError;

const INTEGER: &str = r"-?\d+";
const DECIMAL: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";
const QUOTED: &str = r#""([^"\\]*(?:\\.[^"\\]*)*)"|'([^'\\]*(?:\\.[^'\\]*)*)'"#;

/// A named placeholder type usable as `{name}` in step expressions.
#[derive(Clone, Debug)]
pub struct ParameterType {
    name: String,
    regexp: String,
    inner_groups: usize,
    unescape: bool,
}

impl ParameterType {
    /// Define a parameter type matching `regexp`.
    ///
    /// When `regexp` contains capture groups, the first participating group
    /// supplies the value; otherwise the whole match does.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidParameterTypeName`] if `name` is empty
    /// or contains whitespace or any of `{}()\/`, and [`PatternError::Regex`]
    /// if `regexp` does not compile.
    pub fn new(name: impl Into<String>, regexp: impl Into<String>) -> Result<Self, PatternError> {
        let name = name.into();
        if name.is_empty()
            || name
                .chars()
                .any(|c| c.is_whitespace() || "{}()\\/".contains(c))
        {
            return Err(PatternError::InvalidParameterTypeName(name));
        }
        let regexp = regexp.into();
        let compiled = Regex::new(&regexp).map_err(|source| PatternError::Regex {
            pattern: regexp.clone(),
            source,
        })?;
        Ok(Self {
            name,
            inner_groups: compiled.captures_len().saturating_sub(1),
            regexp,
            unescape: false,
        })
    }

    fn builtin(name: &str, regexp: &str, inner_groups: usize, unescape: bool) -> Self {
        Self {
            name: name.to_owned(),
            regexp: regexp.to_owned(),
            inner_groups,
            unescape,
        }
    }

    /// Name used between braces.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Regex fragment matched by the placeholder.
    #[must_use]
    pub fn regexp(&self) -> &str { &self.regexp }
}

/// Registry of parameter types available to step expressions.
///
/// The default registry contains `int`, `long`, `biginteger`, `float`,
/// `double`, `bigdecimal`, `word`, `string` and the anonymous `{}`.
#[derive(Clone, Debug)]
pub struct ParameterTypes {
    types: HashMap<String, ParameterType>,
}

impl Default for ParameterTypes {
    fn default() -> Self {
        let builtins = [
            ParameterType::builtin("int", INTEGER, 0, false),
            ParameterType::builtin("long", INTEGER, 0, false),
            ParameterType::builtin("biginteger", INTEGER, 0, false),
            ParameterType::builtin("float", DECIMAL, 0, false),
            ParameterType::builtin("double", DECIMAL, 0, false),
            ParameterType::builtin("bigdecimal", DECIMAL, 0, false),
            ParameterType::builtin("word", r"[^\s]+", 0, false),
            ParameterType::builtin("string", QUOTED, 2, true),
            ParameterType::builtin("", ".*", 0, false),
        ];
        Self {
            types: builtins
                .into_iter()
                .map(|t| (t.name.clone(), t))
                .collect(),
        }
    }
}

impl ParameterTypes {
    /// Add or replace a parameter type, returning the previous definition.
    pub fn define(&mut self, parameter: ParameterType) -> Option<ParameterType> {
        self.types.insert(parameter.name.clone(), parameter)
    }

    /// Look up a parameter type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterType> { self.types.get(name) }
}

#[derive(Clone, Debug)]
struct Slot {
    group: usize,
    inner: usize,
    unescape: bool,
}

/// A compiled step expression.
#[derive(Clone, Debug)]
pub struct Expression {
    source: String,
    regex: Regex,
    slots: Vec<Slot>,
}

#[derive(Debug)]
enum Token {
    Literal(char),
    Space(char),
    Slash(usize),
    Optional(String),
    Param(String, usize),
}

impl Expression {
    /// Compile `source` against `types`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Expression`] for syntax errors and
    /// [`PatternError::UndefinedParameterType`] for unknown placeholders.
    pub fn compile(source: &str, types: &ParameterTypes) -> Result<Self, PatternError> {
        let tokens = tokenize(source)?;
        let mut body = String::from("^");
        let mut slots = Vec::new();
        let mut next_group = 1;
        let mut word: Vec<&Token> = Vec::new();

        for token in &tokens {
            match token {
                Token::Space(c) => {
                    render_word(source, &word, &mut body)?;
                    word.clear();
                    body.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                }
                Token::Param(name, _) => {
                    render_word(source, &word, &mut body)?;
                    word.clear();
                    let parameter =
                        types
                            .get(name)
                            .ok_or_else(|| PatternError::UndefinedParameterType {
                                expression: source.to_owned(),
                                name: name.clone(),
                            })?;
                    body.push('(');
                    body.push_str(&parameter.regexp);
                    body.push(')');
                    slots.push(Slot {
                        group: next_group,
                        inner: parameter.inner_groups,
                        unescape: parameter.unescape,
                    });
                    next_group += 1 + parameter.inner_groups;
                }
                other => word.push(other),
            }
        }
        render_word(source, &word, &mut body)?;
        body.push('$');

        let regex = Regex::new(&body).map_err(|error| PatternError::Regex {
            pattern: body.clone(),
            source: error,
        })?;
        Ok(Self {
            source: source.to_owned(),
            regex,
            slots,
        })
    }

    /// Source text of the expression.
    #[must_use]
    pub fn source(&self) -> &str { &self.source }

    /// The anchored regex the expression compiled to.
    #[must_use]
    pub fn regex(&self) -> &Regex { &self.regex }

    /// Number of placeholders.
    #[must_use]
    pub fn slot_count(&self) -> usize { self.slots.len() }

    /// Match the whole of `text`, returning one value per placeholder.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            self.slots
                .iter()
                .map(|slot| {
                    let found = (slot.group + 1..=slot.group + slot.inner)
                        .find_map(|index| caps.get(index))
                        .or_else(|| caps.get(slot.group));
                    let raw = found.map_or("", |m| m.as_str());
                    if slot.unescape {
                        raw.replace("\\\"", "\"").replace("\\'", "'")
                    } else {
                        raw.to_owned()
                    }
                })
                .collect(),
        )
    }
}

fn syntax_error(source: &str, offset: usize, reason: &'static str) -> PatternError {
    PatternError::Expression {
        expression: source.to_owned(),
        offset,
        reason,
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices();
    while let Some((offset, c)) = chars.next() {
        let token = match c {
            '\\' => {
                let (_, escaped) = chars
                    .next()
                    .ok_or_else(|| syntax_error(source, offset, "dangling escape"))?;
                Token::Literal(escaped)
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((at, '{')) => {
                            return Err(syntax_error(source, at, "nested parameter"));
                        }
                        Some((_, ch)) => name.push(ch),
                        None => return Err(syntax_error(source, offset, "unterminated parameter")),
                    }
                }
                Token::Param(name, offset)
            }
            '(' => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, ')')) => break,
                        Some((at, '\\')) => {
                            let (_, escaped) = chars
                                .next()
                                .ok_or_else(|| syntax_error(source, at, "dangling escape"))?;
                            text.push(escaped);
                        }
                        Some((at, '{')) => {
                            return Err(syntax_error(
                                source,
                                at,
                                "parameters are not allowed in optional text",
                            ));
                        }
                        Some((at, '(')) => {
                            return Err(syntax_error(source, at, "optional text cannot be nested"));
                        }
                        Some((_, ch)) => text.push(ch),
                        None => return Err(syntax_error(source, offset, "unterminated optional")),
                    }
                }
                if text.is_empty() {
                    return Err(syntax_error(source, offset, "optional text is empty"));
                }
                Token::Optional(text)
            }
            '/' => Token::Slash(offset),
            c if c.is_whitespace() => Token::Space(c),
            c => Token::Literal(c),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn render_word(source: &str, word: &[&Token], out: &mut String) -> Result<(), PatternError> {
    if word.is_empty() {
        return Ok(());
    }
    let alternatives: Vec<&[&Token]> = word
        .split(|token| matches!(token, Token::Slash(_)))
        .collect();
    if alternatives.len() == 1 {
        render_pieces(word, out);
        return Ok(());
    }
    if alternatives.iter().any(|alt| alt.is_empty()) {
        let offset = word
            .iter()
            .find_map(|token| match token {
                Token::Slash(at) => Some(*at),
                _ => None,
            })
            .unwrap_or_default();
        return Err(syntax_error(source, offset, "alternative may not be empty"));
    }
    out.push_str("(?:");
    for (index, alternative) in alternatives.iter().enumerate() {
        if index > 0 {
            out.push('|');
        }
        render_pieces(alternative, out);
    }
    out.push(')');
    Ok(())
}

fn render_pieces(pieces: &[&Token], out: &mut String) {
    for piece in pieces {
        match piece {
            Token::Literal(c) => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            Token::Optional(text) => {
                out.push_str("(?:");
                out.push_str(&regex::escape(text));
                out.push_str(")?");
            }
            Token::Space(_) | Token::Slash(_) | Token::Param(..) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn types() -> ParameterTypes { ParameterTypes::default() }

    fn compile(source: &str, types: &ParameterTypes) -> Expression {
        Expression::compile(source, types).expect("expression should compile")
    }

    #[rstest]
    #[case("I have 1 cuke", Some(vec!["1"]))]
    #[case("I have 42 cukes", Some(vec!["42"]))]
    #[case("I have -3 cukes", Some(vec!["-3"]))]
    #[case("I have many cukes", None)]
    #[case("so I have 4 cukes", None)]
    fn optional_text_and_int(
        types: ParameterTypes,
        #[case] text: &str,
        #[case] expected: Option<Vec<&str>>,
    ) {
        let expr = compile("I have {int} cuke(s)", &types);
        let expected = expected.map(|v| v.into_iter().map(str::to_owned).collect::<Vec<_>>());
        assert_eq!(expr.captures(text), expected);
    }

    #[rstest]
    fn string_placeholder_strips_quotes(types: ParameterTypes) {
        let expr = compile("the label is {string} and {string}", &types);
        assert_eq!(expr.slot_count(), 2);
        assert_eq!(
            expr.captures(r#"the label is "say \"hi\"" and 'it''"#)
                .map(|v| v.len()),
            None
        );
        assert_eq!(
            expr.captures(r#"the label is "say \"hi\"" and 'it'"#),
            Some(vec![r#"say "hi""#.to_owned(), "it".to_owned()])
        );
        assert_eq!(
            expr.captures(r#"the label is "" and 'x'"#),
            Some(vec![String::new(), "x".to_owned()])
        );
    }

    #[rstest]
    fn alternation_selects_words(types: ParameterTypes) {
        let expr = compile("I eat/consume {float} kg", &types);
        assert_eq!(expr.captures("I consume 1.5 kg"), Some(vec!["1.5".to_owned()]));
        assert_eq!(expr.captures("I eat .5 kg"), Some(vec![".5".to_owned()]));
        assert_eq!(expr.captures("I devour 1 kg"), None);
    }

    #[rstest]
    fn escapes_are_literal(types: ParameterTypes) {
        let expr = compile(r"a \{int\} and a\/b (x)", &types);
        assert_eq!(expr.slot_count(), 0);
        assert!(expr.captures("a {int} and a/b x").is_some());
        assert!(expr.captures("a {int} and a/b ").is_some());
    }

    #[rstest]
    fn custom_types_plug_in(mut types: ParameterTypes) {
        types.define(ParameterType::new("colour", "red|green|(bl)ue").expect("valid type"));
        let expr = compile("a {colour} cuke", &types);
        assert_eq!(expr.captures("a green cuke"), Some(vec!["green".to_owned()]));
        assert_eq!(expr.captures("a blue cuke"), Some(vec!["bl".to_owned()]));
        assert_eq!(expr.captures("a purple cuke"), None);
    }

    #[rstest]
    #[case("I have {unknown}")]
    fn undefined_types_are_rejected(types: ParameterTypes, #[case] source: &str) {
        assert!(matches!(
            Expression::compile(source, &types),
            Err(PatternError::UndefinedParameterType { name, .. }) if name == "unknown"
        ));
    }

    #[rstest]
    #[case("I have {int")]
    #[case("cuke(s")]
    #[case("cuke()")]
    #[case("a ({int})")]
    #[case("eat/ cukes")]
    #[case("trailing \\")]
    fn syntax_errors_are_reported(types: ParameterTypes, #[case] source: &str) {
        assert!(matches!(
            Expression::compile(source, &types),
            Err(PatternError::Expression { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("with space")]
    #[case("a/b")]
    fn invalid_type_names_are_rejected(#[case] name: &str) {
        assert!(matches!(
            ParameterType::new(name, ".*"),
            Err(PatternError::InvalidParameterTypeName(_))
        ));
    }
}
