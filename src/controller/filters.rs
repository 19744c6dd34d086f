//! Action match filters.
//!
//! A filter is a predicate over request metadata attached to an action.
//! Passing filters raise an action's score; a failing filter disqualifies it.

use std::fmt;

use axum::http::header::{HeaderName, ACCEPT};
use axum::http::Method;

use crate::http::request::essence;
use crate::http::DispatchRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchFilter {
    /// The request method must equal this one.
    Method(Method),
    /// The header must be present.
    HeaderPresent(HeaderName),
    /// The header must be present with exactly this value.
    HeaderEquals(HeaderName, String),
    /// The body media type must be this one (parameters ignored).
    ContentType(String),
    /// The `Accept` header must admit this media type.
    Accepts(String),
}

impl MatchFilter {
    pub fn evaluate(&self, request: &DispatchRequest) -> bool {
        match self {
            MatchFilter::Method(method) => request.method() == method,
            MatchFilter::HeaderPresent(name) => request.headers().contains_key(name),
            MatchFilter::HeaderEquals(name, expected) => request
                .headers()
                .get_all(name)
                .iter()
                .any(|value| value.to_str().is_ok_and(|v| v == expected)),
            MatchFilter::ContentType(expected) => request
                .content_type()
                .is_some_and(|actual| actual.eq_ignore_ascii_case(expected)),
            MatchFilter::Accepts(mime) => accepts(request.header(ACCEPT.as_str()), mime),
        }
    }
}

impl fmt::Display for MatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchFilter::Method(method) => write!(f, "method={method}"),
            MatchFilter::HeaderPresent(name) => write!(f, "header={name}"),
            MatchFilter::HeaderEquals(name, value) => write!(f, "header={name}:{value}"),
            MatchFilter::ContentType(mime) => write!(f, "content-type={mime}"),
            MatchFilter::Accepts(mime) => write!(f, "accept={mime}"),
        }
    }
}

fn accepts(header: Option<&str>, mime: &str) -> bool {
    let Some(header) = header else {
        return false;
    };
    let mime = mime.to_ascii_lowercase();
    let wildcard = mime
        .split_once('/')
        .map(|(kind, _)| format!("{kind}/*"))
        .unwrap_or_default();

    header.split(',').map(essence).any(|range| {
        range == mime || range == "*/*" || (!wildcard.is_empty() && range == wildcard)
    })
}
