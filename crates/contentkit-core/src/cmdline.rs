//! Quote-aware command-line tokenizing and `-name value` parameter mapping.
//!
//! A raw command line is normalized (every whitespace run becomes a single
//! space), split into tokens by a single left-to-right scan that honours
//! double quotes, and then folded into a name → value map:
//!
//! - a token starting with `-` or `/` names a parameter,
//! - the token after a name is its value,
//! - a name followed by another name (or by nothing) maps to `""`,
//! - a value with no name in front of it is kept under [`BARE_VALUE_KEY`].
//!
//! The first token is always the executable path and never becomes a
//! parameter. Parsing happens once, in [`CommandLine::parse`], and the
//! resulting value is handed to whoever needs it.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use crate::error::{CoreError, Result};

/// Key under which a value with no preceding parameter name is stored.
pub const BARE_VALUE_KEY: &str = "parameter";

/// Collapse every run of whitespace (tabs and line breaks included) into one space.
#[must_use]
pub fn normalize(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_space = false;

    for ch in line.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }

    out
}

/// Tokens produced from one command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tokenized {
    /// Tokens in the order they were closed.
    pub tokens: Vec<String>,
    /// The line ended while a quoted segment was still open.
    pub unterminated_quote: bool,
}

/// Split a command line into tokens.
///
/// A space ends the current unquoted token. A `"` opens or closes a quoted
/// token; closing always emits a token, even an empty one. An opening quote
/// does not end an unquoted token already in progress, so `ab"cd"` yields
/// `cd` before `ab`.
///
/// If the line ends inside quotes, the partial quoted text is emitted as the
/// last token and [`Tokenized::unterminated_quote`] is set.
#[must_use]
pub fn tokenize(line: &str) -> Tokenized {
    let clean = normalize(line);
    let mut tokens = Vec::new();
    let mut unquoted = String::new();
    let mut quoted = String::new();
    let mut quote_on = false;

    for ch in clean.chars() {
        match ch {
            ' ' if !quote_on => {
                if !unquoted.is_empty() {
                    tokens.push(std::mem::take(&mut unquoted));
                }
            }
            '"' => {
                if quote_on {
                    tokens.push(std::mem::take(&mut quoted));
                }
                quote_on = !quote_on;
            }
            _ if quote_on => quoted.push(ch),
            _ => unquoted.push(ch),
        }
    }

    if !unquoted.is_empty() {
        tokens.push(unquoted);
    }

    if quote_on {
        log::warn!("command line ends inside a quoted segment: {quoted:?}");
        if !quoted.is_empty() {
            tokens.push(quoted);
        }
    }

    Tokenized {
        tokens,
        unterminated_quote: quote_on,
    }
}

/// Name → value map built from a token list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, String>);

impl Parameters {
    fn insert(&mut self, name: &str, value: &str) -> Result<()> {
        match self.0.entry(name.to_string()) {
            Entry::Occupied(_) => Err(CoreError::DuplicateParameter {
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                Ok(())
            }
        }
    }

    /// Value for `name`, if the parameter was given.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether `name` was given, with or without a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The value that appeared without a parameter name, if any.
    #[must_use]
    pub fn bare_value(&self) -> Option<&str> {
        self.get(BARE_VALUE_KEY)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no parameters were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Name carried by an operator token (`-name` or `/name`), without its marker.
///
/// Only the first character is stripped, so `--name` names `-name`.
fn operator_name(token: &str) -> Option<&str> {
    token
        .strip_prefix('-')
        .or_else(|| token.strip_prefix('/'))
}

/// Fold a token list into parameters. The first token (the executable) is skipped.
///
/// # Errors
///
/// Returns [`CoreError::DuplicateParameter`] when a name appears twice,
/// including a `-parameter` flag colliding with a bare value.
pub fn map_parameters<S: AsRef<str>>(tokens: &[S]) -> Result<Parameters> {
    let mut params = Parameters::default();
    let mut pending: Option<&str> = None;
    let mut bare: Option<&str> = None;

    for token in tokens.iter().skip(1).map(|t| t.as_ref()) {
        if token.is_empty() {
            continue;
        }

        if let Some(name) = operator_name(token) {
            if let Some(previous) = pending.take() {
                params.insert(previous, "")?;
            }
            pending = Some(name).filter(|n| !n.trim().is_empty());
        } else if let Some(name) = pending.take() {
            params.insert(name, token)?;
        } else {
            bare = Some(token);
        }
    }

    if let Some(name) = pending {
        params.insert(name, "")?;
    }

    if let Some(value) = bare.filter(|v| !v.trim().is_empty()) {
        params.insert(BARE_VALUE_KEY, value)?;
    }

    Ok(params)
}

/// A parsed command line: its tokens and the parameters read from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    tokens: Vec<String>,
    parameters: Parameters,
    unterminated_quote: bool,
}

impl CommandLine {
    /// Parse a complete command line, executable path included.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateParameter`] when a parameter name repeats.
    pub fn parse(line: &str) -> Result<Self> {
        let Tokenized {
            tokens,
            unterminated_quote,
        } = tokenize(line);
        let parameters = map_parameters(tokens.as_slice())?;

        log::debug!(
            "parsed command line into {} tokens and {} parameters",
            tokens.len(),
            parameters.len()
        );

        Ok(Self {
            tokens,
            parameters,
            unterminated_quote,
        })
    }

    /// Parse arguments that the OS has already split.
    ///
    /// The arguments are joined back into one line, with empty arguments and
    /// arguments containing whitespace wrapped in double quotes. Embedded
    /// double quotes are passed through as-is; the tokenizer has no escape
    /// syntax for them.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateParameter`] when a parameter name repeats.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse(&join_args(args))
    }

    /// Parse the arguments of the current process.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateParameter`] when a parameter name repeats.
    pub fn from_env() -> Result<Self> {
        Self::from_args(std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()))
    }

    /// The first token, or `""` for an empty line.
    #[must_use]
    pub fn executable_path(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }

    /// All tokens, executable path first.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Parameters read from the tokens.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Shorthand for `parameters().get(name)`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }

    /// Whether the line ended inside an open quote.
    #[must_use]
    pub const fn has_unterminated_quote(&self) -> bool {
        self.unterminated_quote
    }
}

fn join_args<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("\"{arg}\"")
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_tabs_and_newlines() {
        assert_eq!(normalize("a\t\tb\r\n c   d"), "a b c d");
        assert_eq!(normalize("  lead"), " lead");
    }

    #[test]
    fn unquoted_tokens_match_space_split() {
        let line = "prog.exe  -a\t1\r\n-b   two three";
        let normalized = normalize(line);
        let result = tokenize(line);
        assert_eq!(result.tokens.len(), normalized.split(' ').count());
        assert_eq!(
            result.tokens,
            vec!["prog.exe", "-a", "1", "-b", "two", "three"]
        );
        assert!(!result.unterminated_quote);
    }

    #[test]
    fn quoted_segments_keep_spaces() {
        let result = tokenize(r#"prog.exe -path "C:\Program Files\app" -x"#);
        assert_eq!(
            result.tokens,
            vec!["prog.exe", "-path", r"C:\Program Files\app", "-x"]
        );
    }

    #[test]
    fn empty_quotes_produce_empty_token() {
        let result = tokenize(r#"prog.exe "" tail"#);
        assert_eq!(result.tokens, vec!["prog.exe", "", "tail"]);
    }

    #[test]
    fn quote_inside_word_closes_before_the_word() {
        let result = tokenize(r#"prog ab"cd"ef"#);
        assert_eq!(result.tokens, vec!["prog", "cd", "abef"]);
    }

    #[test]
    fn unterminated_quote_is_flushed_and_flagged() {
        let result = tokenize(r#"prog.exe -name "half open"#);
        assert_eq!(result.tokens, vec!["prog.exe", "-name", "half open"]);
        assert!(result.unterminated_quote);
    }

    #[test]
    fn name_value_and_trailing_flag() {
        let cmd = CommandLine::parse("prog.exe -name value -flag").expect("parse");
        assert_eq!(cmd.get("name"), Some("value"));
        assert_eq!(cmd.get("flag"), Some(""));
        assert_eq!(cmd.parameters().len(), 2);
        assert_eq!(cmd.executable_path(), "prog.exe");
    }

    #[test]
    fn bare_value_lands_under_parameter_key() {
        let cmd = CommandLine::parse("prog.exe bareValue").expect("parse");
        assert_eq!(cmd.parameters().bare_value(), Some("bareValue"));
        assert_eq!(cmd.parameters().len(), 1);
    }

    #[test]
    fn last_bare_value_wins() {
        let cmd = CommandLine::parse("prog.exe first second").expect("parse");
        assert_eq!(cmd.get(BARE_VALUE_KEY), Some("second"));
    }

    #[test]
    fn slash_operators_and_consecutive_flags() {
        let cmd = CommandLine::parse("prog.exe /quiet /out report.txt").expect("parse");
        assert_eq!(cmd.get("quiet"), Some(""));
        assert_eq!(cmd.get("out"), Some("report.txt"));
    }

    #[test]
    fn duplicate_flag_is_an_error() {
        let err = CommandLine::parse("prog.exe -x 1 -x 2").expect_err("duplicate");
        match err {
            CoreError::DuplicateParameter { name } => assert_eq!(name, "x"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parameter_flag_collides_with_bare_value() {
        let err = CommandLine::parse("prog.exe loose -parameter set").expect_err("collision");
        assert!(matches!(err, CoreError::DuplicateParameter { .. }));
    }

    #[test]
    fn executable_is_never_a_parameter() {
        let cmd = CommandLine::parse("-prog").expect("parse");
        assert!(cmd.parameters().is_empty());
        assert_eq!(cmd.executable_path(), "-prog");
    }

    #[test]
    fn empty_line_has_no_executable() {
        let cmd = CommandLine::parse("").expect("parse");
        assert_eq!(cmd.executable_path(), "");
        assert!(cmd.tokens().is_empty());
    }

    #[test]
    fn from_args_requotes_spaced_arguments() {
        let cmd = CommandLine::from_args([
            "/usr/bin/tool",
            "-title",
            "Quarterly report",
            "-empty",
            "",
        ])
        .expect("parse");
        assert_eq!(cmd.get("title"), Some("Quarterly report"));
        assert_eq!(cmd.get("empty"), Some(""));
    }
}
