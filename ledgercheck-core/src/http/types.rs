use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use super::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
    /// Response headers (lowercased header names). Multiple values are joined with ", ".
    pub headers: Vec<(String, String)>,
    /// Wall time from sending the request until the full body was read.
    pub elapsed: Duration,
}

impl HttpResponse {
    /// Parses the body as JSON. Empty or malformed bodies yield `None`.
    pub fn json(&self) -> Option<serde_json::Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: http::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: http::Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(http::Method::GET, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(http::Method::DELETE, url)
    }

    pub fn post_json<T: Serialize + ?Sized>(url: impl Into<String>, body: &T) -> Result<Self> {
        Self::new(http::Method::POST, url).with_json(body)
    }

    pub fn put_json<T: Serialize + ?Sized>(url: impl Into<String>, body: &T) -> Result<Self> {
        Self::new(http::Method::PUT, url).with_json(body)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Bytes::from(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Sets a header, replacing any existing value with the same (case-insensitive) name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn with_header_replaces_case_insensitively() {
        let req = HttpRequest::get("http://localhost/contas")
            .with_header("authorization", "JWT a")
            .with_header("Authorization", "JWT b");

        assert_eq!(
            req.headers,
            vec![("Authorization".to_string(), "JWT b".to_string())]
        );
    }

    #[test]
    fn post_json_encodes_body() {
        let req = HttpRequest::post_json(
            "http://localhost/contas",
            &serde_json::json!({ "nome": "Conta 1" }),
        )
        .unwrap();

        assert_eq!(req.method, http::Method::POST);
        assert_eq!(req.body.as_ref(), br#"{"nome":"Conta 1"}"#);
    }

    #[test]
    fn empty_body_is_not_json() {
        let res = HttpResponse {
            status: 204,
            body: Bytes::new(),
            headers: Vec::new(),
            elapsed: Duration::ZERO,
        };
        assert!(res.json().is_none());
    }
}
