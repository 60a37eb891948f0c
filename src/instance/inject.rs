use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::dispatcher::{HandlerResponse, HeaderVec, QueryVec};

/// A request run in process through [`Instance::inject`](crate::Instance::inject).
///
/// ```rust
/// use routeshape::InjectRequest;
///
/// let req = InjectRequest::post("/users?notify=true")
///     .header("x-tenant", "acme")
///     .json(&serde_json::json!({ "name": "ada" }));
/// assert_eq!(req.url, "/users?notify=true");
/// ```
#[derive(Debug, Clone)]
pub struct InjectRequest {
    pub method: Method,
    /// Path plus optional `?query`
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Raw body text
    pub payload: Option<String>,
}

impl InjectRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            payload: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::HEAD, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Raw body; parsed according to the `content-type` header
    #[must_use]
    pub fn payload(mut self, body: impl Into<String>) -> Self {
        self.payload = Some(body.into());
        self
    }

    /// JSON body with a matching `content-type`
    #[must_use]
    pub fn json(self, body: &Value) -> Self {
        self.header("content-type", "application/json")
            .payload(body.to_string())
    }

    pub(crate) fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .rfind(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }
}

/// Split `url` into path and query string
pub(crate) fn split_url(url: &str) -> (&str, &str) {
    match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    }
}

pub(crate) fn parse_query(query: &str) -> QueryVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Header names lower-cased
pub(crate) fn collect_headers(headers: &[(String, String)]) -> HeaderVec {
    headers
        .iter()
        .map(|(k, v)| (Arc::from(k.to_ascii_lowercase().as_str()), v.clone()))
        .collect()
}

/// Parse the request payload.
///
/// No payload (or an empty one) gives `None`. JSON is assumed when no
/// content type is given; `text/*` bodies become JSON strings. Other media
/// types are rejected with 415, oversized bodies with 413 and malformed JSON
/// with 400.
pub(crate) fn parse_body(
    payload: Option<&str>,
    content_type: Option<&str>,
    limit: usize,
) -> Result<Option<Value>, HandlerResponse> {
    let Some(payload) = payload.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    if payload.len() > limit {
        return Err(HandlerResponse::error(
            413,
            &format!("Request body is too large ({} > {limit} bytes)", payload.len()),
        ));
    }
    let media = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match media.as_deref() {
        None => parse_json(payload),
        Some(m) if m == "application/json" || m.ends_with("+json") => parse_json(payload),
        Some(m) if m.starts_with("text/") => Ok(Some(Value::String(payload.to_string()))),
        Some(m) => Err(HandlerResponse::error(
            415,
            &format!("Unsupported Media Type: {m}"),
        )),
    }
}

fn parse_json(payload: &str) -> Result<Option<Value>, HandlerResponse> {
    serde_json::from_str(payload)
        .map(Some)
        .map_err(|err| HandlerResponse::error(400, &format!("Body is not valid JSON: {err}")))
}
