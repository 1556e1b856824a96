use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::{Duration, Instant};

use super::util::{has_header, host_header_value, merge_headers};
use super::{Error, HttpRequest, HttpResponse, Result};

/// Connect timeout used by [`HttpClient::default`]. Without it an unreachable API shows up as
/// a bootstrap that hangs for the OS TCP timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

type Connector = HttpsConnector<HttpConnector>;

/// HTTP/1 client for both `http://` and `https://` targets (webpki roots).
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<Connector, Full<Bytes>>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(Some(DEFAULT_CONNECT_TIMEOUT))
    }
}

impl HttpClient {
    #[must_use]
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        let mut tcp = HttpConnector::new();
        tcp.enforce_http(false);
        tcp.set_connect_timeout(connect_timeout);

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(tcp);

        Self {
            inner: Client::builder(TokioExecutor::new()).build(connector),
        }
    }

    /// Sends `req` and buffers the whole response body.
    ///
    /// `elapsed` covers the request and the body read. `req.timeout` bounds the same span.
    pub async fn request(&self, req: HttpRequest) -> Result<HttpResponse> {
        let timeout = req.timeout;
        let hyper_req = build_request(req)?;
        tracing::debug!(method = %hyper_req.method(), uri = %hyper_req.uri(), "sending request");

        let started = Instant::now();
        let roundtrip = async {
            let res = self.inner.request(hyper_req).await?;
            let (parts, body) = res.into_parts();
            let body = body.collect().await?.to_bytes();
            Ok::<_, Error>((parts, body))
        };
        let (parts, body) = match timeout {
            Some(limit) => tokio::time::timeout(limit, roundtrip)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => roundtrip.await?,
        };
        let elapsed = started.elapsed();

        let status = parts.status.as_u16();
        tracing::debug!(
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            body_len = body.len(),
            "received response"
        );

        Ok(HttpResponse {
            status,
            body,
            headers: merge_headers(&parts.headers),
            elapsed,
        })
    }
}

fn build_request(req: HttpRequest) -> Result<hyper::Request<Full<Bytes>>> {
    let url = url::Url::parse(&req.url).map_err(|_| Error::InvalidUrl(req.url.clone()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::UnsupportedScheme(req.url));
    }
    let uri: hyper::Uri = url
        .as_str()
        .parse()
        .map_err(|_| Error::InvalidUrl(req.url.clone()))?;

    let mut builder = hyper::Request::builder().method(req.method).uri(uri);

    if !has_header(&req.headers, "host")
        && let Some(host) = host_header_value(&url)
    {
        builder = builder.header(http::header::HOST, host);
    }
    if !req.body.is_empty() && !has_header(&req.headers, "content-length") {
        builder = builder.header(http::header::CONTENT_LENGTH, req.body.len());
    }

    for (name, value) in &req.headers {
        let invalid = || Error::InvalidHeader { name: name.clone() };
        let name = http::HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = http::HeaderValue::from_str(value).map_err(|_| invalid())?;
        builder = builder.header(name, value);
    }

    Ok(builder.body(Full::new(req.body))?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::http::HttpTransportErrorKind;

    #[tokio::test]
    async fn unreachable_host_fails_fast_with_connect_timeout() {
        let client = HttpClient::new(Some(Duration::from_millis(200)));
        let req = HttpRequest::get("http://192.0.2.1:81/contas");

        let started = Instant::now();
        let err = client.request(req).await.unwrap_err();

        assert_eq!(err.transport_error_kind(), HttpTransportErrorKind::Connect);
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "expected fast failure, elapsed={:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn rejects_unsupported_scheme() {
        let err = HttpClient::default()
            .request(HttpRequest::get("ftp://example.com/contas"))
            .await
            .unwrap_err();
        assert_eq!(
            err.transport_error_kind(),
            HttpTransportErrorKind::UnsupportedScheme
        );
    }

    #[test]
    fn build_request_sets_host_and_length() {
        let body = serde_json::json!({"nome": "x"});
        let req = HttpRequest::post_json("http://127.0.0.1:8080/contas", &body)
            .unwrap()
            .with_header("content-type", "application/json");
        let built = build_request(req).unwrap();

        assert_eq!(built.headers()[http::header::HOST], "127.0.0.1:8080");
        assert_eq!(built.headers()[http::header::CONTENT_LENGTH], "12");
        assert_eq!(*built.method(), http::Method::POST);
    }

    #[test]
    fn build_request_rejects_bad_header_value() {
        let req =
            HttpRequest::get("http://localhost/contas").with_header("authorization", "JWT a\nb");
        let err = build_request(req).unwrap_err();
        assert_eq!(
            err.transport_error_kind(),
            HttpTransportErrorKind::InvalidRequest
        );
    }
}
