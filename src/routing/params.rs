//! Parameter values produced by routing and consumed by binding.
//!
//! A matched route yields a flat map of parameter names to values. Most values
//! are single strings; array segments (`{#name}`) and `key[]` query entries
//! yield lists.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single routed, queried or posted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A scalar string value.
    Str(String),
    /// An ordered list of strings.
    List(Vec<String>),
}

impl ParamValue {
    /// The scalar value, if this is not a list.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::List(_) => None,
        }
    }

    /// The list value, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::Str(_) => None,
            ParamValue::List(items) => Some(items),
        }
    }

    /// Empty string or empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Str(s) => s.is_empty(),
            ParamValue::List(items) => items.is_empty(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Parameter name to value map. Ordered so that logs and listings are stable.
pub type Parameters = BTreeMap<String, ParamValue>;

/// Parse `application/x-www-form-urlencoded` data.
///
/// Keys ending in `[]` accumulate into a list under the bare key. A repeated
/// scalar key keeps its last value.
pub fn parse_urlencoded(input: &str) -> Parameters {
    let mut out = Parameters::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        if let Some(base) = key.strip_suffix("[]") {
            let slot = out
                .entry(base.to_string())
                .or_insert_with(|| ParamValue::List(Vec::new()));
            match slot {
                ParamValue::List(items) => items.push(value.into_owned()),
                other => *other = ParamValue::List(vec![value.into_owned()]),
            }
        } else {
            out.insert(key.into_owned(), ParamValue::Str(value.into_owned()));
        }
    }
    out
}
