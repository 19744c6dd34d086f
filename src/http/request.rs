//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Collect the request body up to the configured limit
//! - Expose path, query, method, headers and posted key/value data to the
//!   dispatch core as a `DispatchRequest`
//!
//! # Design Decisions
//! - Posted data is parsed once, up front; the core never touches raw bodies
//! - `application/x-www-form-urlencoded` and top-level JSON objects are the
//!   recognised body shapes, anything else yields no posted data

use std::future::poll_fn;
use std::pin::pin;

use axum::body::{Body, Bytes, HttpBody};
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::{parse_urlencoded, ParamValue, Parameters};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Failure to collect a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(#[source] axum::Error),
}

impl BodyError {
    pub fn status(&self) -> StatusCode {
        match self {
            BodyError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BodyError::Read(_) => StatusCode::BAD_REQUEST,
        }
    }
}

async fn collect_body(body: Body, limit: usize) -> Result<Bytes, BodyError> {
    let mut body = pin!(body);
    let mut collected = Vec::new();
    while let Some(frame) = poll_fn(|cx| body.as_mut().poll_frame(cx)).await {
        let frame = frame.map_err(BodyError::Read)?;
        if let Ok(data) = frame.into_data() {
            if collected.len() + data.len() > limit {
                return Err(BodyError::TooLarge { limit });
            }
            collected.extend_from_slice(&data);
        }
    }
    Ok(Bytes::from(collected))
}

/// The request view consumed by the dispatch core.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Parameters,
    form: Parameters,
}

impl DispatchRequest {
    /// A request with no headers and no posted data.
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = uri.query().map(parse_urlencoded).unwrap_or_default();
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            query,
            form: Parameters::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_form(mut self, form: Parameters) -> Self {
        self.form = form;
        self
    }

    /// Build from request parts and an already collected body.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        let mut request = Self::new(parts.method, parts.uri);
        request.headers = parts.headers;
        request.form = parse_body(request.content_type().as_deref(), &body);
        request
    }

    /// Collect an HTTP request, reading at most `limit` body bytes.
    pub async fn from_http(request: Request<Body>, limit: usize) -> Result<Self, BodyError> {
        let (parts, body) = request.into_parts();
        let body = collect_body(body, limit).await?;
        Ok(Self::from_parts(parts, body))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Media type of the body without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.header(CONTENT_TYPE.as_str()).map(essence)
    }

    /// Parsed query-string parameters.
    pub fn query(&self) -> &Parameters {
        &self.query
    }

    /// Parsed posted-body parameters.
    pub fn form(&self) -> &Parameters {
        &self.form
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }
}

/// `text/html; charset=utf-8` → `text/html`
pub(crate) fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn parse_body(content_type: Option<&str>, body: &Bytes) -> Parameters {
    if body.is_empty() {
        return Parameters::new();
    }
    match content_type {
        Some("application/x-www-form-urlencoded") => {
            parse_urlencoded(&String::from_utf8_lossy(body))
        }
        Some("application/json") => match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => map
                .into_iter()
                .filter_map(|(key, value)| json_param(value).map(|v| (key, v)))
                .collect(),
            Ok(_) => Parameters::new(),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed JSON body");
                Parameters::new()
            }
        },
        _ => Parameters::new(),
    }
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_param(value: serde_json::Value) -> Option<ParamValue> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(json_scalar)
            .collect::<Option<Vec<_>>>()
            .map(ParamValue::List),
        other => json_scalar(&other).map(ParamValue::Str),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(content_type: &str, body: &'static str) -> DispatchRequest {
        let (parts, _) = Request::builder()
            .method(Method::POST)
            .uri("/posts?draft=1")
            .header(CONTENT_TYPE, content_type)
            .body(())
            .unwrap()
            .into_parts();
        DispatchRequest::from_parts(parts, Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_query_is_parsed() {
        let request = DispatchRequest::new(Method::GET, "/search?q=rust&page=2".parse().unwrap());
        assert_eq!(request.path(), "/search");
        assert_eq!(request.query_string(), Some("q=rust&page=2"));
        assert_eq!(request.query().get("q"), Some(&ParamValue::from("rust")));
    }

    #[test]
    fn test_form_body() {
        let request = post(
            "application/x-www-form-urlencoded; charset=utf-8",
            "title=Hello+World&tags[]=a&tags[]=b",
        );
        assert_eq!(request.content_type().as_deref(), Some("application/x-www-form-urlencoded"));
        assert_eq!(request.form().get("title"), Some(&ParamValue::from("Hello World")));
        assert_eq!(request.query().get("draft"), Some(&ParamValue::from("1")));
        assert_eq!(
            request.form().get("tags"),
            Some(&ParamValue::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_json_body() {
        let request = post(
            "application/json",
            r#"{"title":"Hi","views":3,"published":true,"tags":["x","y"],"meta":{"a":1}}"#,
        );
        let form = request.form();
        assert_eq!(form.get("title"), Some(&ParamValue::from("Hi")));
        assert_eq!(form.get("views"), Some(&ParamValue::from("3")));
        assert_eq!(form.get("published"), Some(&ParamValue::from("true")));
        assert_eq!(form.get("tags"), Some(&ParamValue::List(vec!["x".into(), "y".into()])));
        assert!(!form.contains_key("meta"));
    }

    #[test]
    fn test_unknown_body_is_ignored() {
        assert!(post("text/plain", "title=x").form().is_empty());
        assert!(post("application/json", "{not json").form().is_empty());
    }

    #[tokio::test]
    async fn test_body_limit() {
        let request = |body: &'static str| {
            Request::post("/posts")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap()
        };

        let collected = DispatchRequest::from_http(request("title=ok"), 8).await.unwrap();
        assert_eq!(collected.form().get("title"), Some(&ParamValue::from("ok")));

        let err = DispatchRequest::from_http(request("title=too+long"), 8).await.unwrap_err();
        assert!(matches!(err, BodyError::TooLarge { limit: 8 }));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_request_id_generation() {
        let request = Request::builder().body(()).unwrap();
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        assert_eq!(id.header_value().len(), 36);
    }
}
