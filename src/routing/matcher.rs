//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Parse `{name}`, `{*name}` and `{#name}` placeholders out of a pattern
//! - Compile the pattern into an anchored, case-insensitive regex
//! - Extract named captures from a URL-decoded request path
//!
//! # Design Decisions
//! - Every placeholder is optional in the regex; the router decides afterwards
//!   whether a missing value is acceptable (defaults)
//! - A `/` directly before a placeholder belongs to the optional group, so
//!   `/{controller}/{action}` still matches `/`
//! - `/` in literal text matches one or more slashes, trailing slashes are ignored
//! - Literal text is escaped, only placeholders carry regex semantics

use std::fmt::Write;

use percent_encoding::percent_decode_str;
use regex::{Regex, RegexBuilder};

use crate::routing::params::{ParamValue, Parameters};

/// Characters a single path segment may contain.
const SEGMENT_CLASS: &str = r"a-z0-9_.~:#\[\]@!$&'()*+,;=\s\-";

/// How a placeholder captures its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `{name}`: one path segment.
    Segment,
    /// `{*name}`: the rest of the path, slashes included, as one string.
    CatchRest,
    /// `{#name}`: the rest of the path, split into a list of segments.
    ArraySegment,
}

impl PlaceholderKind {
    fn class(self) -> String {
        match self {
            PlaceholderKind::Segment => SEGMENT_CLASS.to_string(),
            PlaceholderKind::CatchRest | PlaceholderKind::ArraySegment => {
                format!("{SEGMENT_CLASS}/")
            }
        }
    }
}

/// A named variable declared in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub kind: PlaceholderKind,
}

#[derive(Debug)]
enum Token {
    Literal(String),
    Placeholder(Placeholder),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    regex: Regex,
    placeholders: Vec<Placeholder>,
}

impl PatternMatcher {
    /// Compile a route pattern.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let tokens = tokenize(pattern);
        let mut source = String::from("^");
        let mut placeholders = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Literal(text) => {
                    let before_placeholder =
                        matches!(tokens.get(i + 1), Some(Token::Placeholder(_)));
                    let text = if before_placeholder {
                        text.trim_end_matches('/')
                    } else {
                        text.as_str()
                    };
                    push_literal(&mut source, text);
                }
                Token::Placeholder(placeholder) => {
                    let after_slash = i > 0
                        && matches!(&tokens[i - 1], Token::Literal(text) if text.ends_with('/'));
                    let group = format!(
                        "(?P<{}>[{}]+)",
                        placeholder.name,
                        placeholder.kind.class()
                    );
                    // Writing to a String cannot fail.
                    let _ = if after_slash {
                        write!(source, "(?:/+{group})?")
                    } else {
                        write!(source, "{group}?")
                    };
                    placeholders.push(placeholder.clone());
                }
            }
        }
        source.push_str("/*$");

        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            placeholders,
        })
    }

    /// The pattern this matcher was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The generated regular expression.
    pub fn regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Declared placeholders in pattern order.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Match a raw (still URL-encoded) request path.
    ///
    /// Returns the named captures that participated in the match. Placeholders
    /// that matched nothing are left out.
    pub fn captures(&self, path: &str) -> Option<Parameters> {
        let decoded = decode_path(path);
        let caps = self.regex.captures(&decoded)?;

        let mut params = Parameters::new();
        for placeholder in &self.placeholders {
            let Some(m) = caps.name(&placeholder.name) else {
                continue;
            };
            let value = match placeholder.kind {
                PlaceholderKind::ArraySegment => ParamValue::List(
                    m.as_str()
                        .split('/')
                        .filter(|segment| !segment.is_empty())
                        .map(str::to_string)
                        .collect(),
                ),
                PlaceholderKind::Segment | PlaceholderKind::CatchRest => {
                    ParamValue::Str(m.as_str().to_string())
                }
            };
            params.insert(placeholder.name.clone(), value);
        }
        Some(params)
    }
}

/// Decode a path the way form data is decoded (`+` is a space).
fn decode_path(path: &str) -> String {
    percent_decode_str(&path.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn push_literal(source: &mut String, text: &str) {
    let mut pieces = text.split('/');
    if let Some(first) = pieces.next() {
        source.push_str(&regex::escape(first));
    }
    for piece in pieces {
        source.push_str("/+");
        source.push_str(&regex::escape(piece));
    }
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let parsed = after
            .find('}')
            .and_then(|close| parse_placeholder(&after[..close]).map(|p| (close, p)));
        match parsed {
            Some((close, placeholder)) => {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
                tokens.push(Token::Placeholder(placeholder));
                rest = &after[close + 1..];
            }
            None => {
                literal.push('{');
                rest = after;
            }
        }
    }
    literal.push_str(rest);
    tokens.push(Token::Literal(literal));
    tokens
}

fn parse_placeholder(body: &str) -> Option<Placeholder> {
    let (kind, name) = match body.as_bytes().first()? {
        b'*' => (PlaceholderKind::CatchRest, &body[1..]),
        b'#' => (PlaceholderKind::ArraySegment, &body[1..]),
        _ => (PlaceholderKind::Segment, body),
    };
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_lowercase() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(Placeholder {
        name: name.to_string(),
        kind,
    })
}
