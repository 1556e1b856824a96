//! Fixture constants and the validated configuration a suite run uses.
//!
//! The defaults point at the public ledger API the suite was written against.
//! Every value can be overridden at the CLI layer; the library only sees a
//! finished [`SuiteConfig`].

use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_BASE_URL: &str = "https://barrigarest.wcaquino.me/";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_BASE_PATH: &str = "";
pub const DEFAULT_EMAIL: &str = "helen@gmail.com";
pub const DEFAULT_PASSWORD: &str = "12345";
pub const DEFAULT_MAX_RESPONSE_TIME: Duration = Duration::from_millis(4000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Content type sent with every request and expected on every JSON response.
pub const CONTENT_TYPE_JSON: &str = "application/json";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base url `{0}`")]
    InvalidBaseUrl(String),

    #[error("base url `{0}` must use http or https")]
    UnsupportedScheme(String),

    #[error("port {port} cannot be applied to base url `{url}`")]
    InvalidPort { url: String, port: u16 },

    #[error("`max_response_time` must be greater than zero")]
    InvalidMaxResponseTime,

    #[error("`email` must not be empty")]
    EmptyEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Unvalidated settings as collected from flags/env.
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    pub base_url: String,
    /// Overrides the port of `base_url` when set.
    pub port: Option<u16>,
    pub base_path: String,
    pub credentials: Credentials,
    pub max_response_time: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            port: Some(DEFAULT_PORT),
            base_path: DEFAULT_BASE_PATH.to_string(),
            credentials: Credentials::default(),
            max_response_time: DEFAULT_MAX_RESPONSE_TIME,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuiteConfig {
    root: url::Url,
    pub credentials: Credentials,
    pub max_response_time: Duration,
    pub request_timeout: Option<Duration>,
}

impl SuiteConfig {
    /// Validates options and resolves base url + port + base path into one root url.
    pub fn from_options(opts: SuiteOptions) -> Result<Self> {
        let mut root = url::Url::parse(opts.base_url.trim())
            .map_err(|_| Error::InvalidBaseUrl(opts.base_url.clone()))?;

        if root.scheme() != "http" && root.scheme() != "https" {
            return Err(Error::UnsupportedScheme(opts.base_url));
        }

        if let Some(port) = opts.port {
            root.set_port(Some(port))
                .map_err(|()| Error::InvalidPort {
                    url: opts.base_url.clone(),
                    port,
                })?;
        }

        let mut path = root.path().trim_end_matches('/').to_string();
        let base_path = opts.base_path.trim_matches('/');
        if !base_path.is_empty() {
            path.push('/');
            path.push_str(base_path);
        }
        root.set_path(&path);
        root.set_query(None);
        root.set_fragment(None);

        if opts.max_response_time.is_zero() {
            return Err(Error::InvalidMaxResponseTime);
        }
        if opts.credentials.email.trim().is_empty() {
            return Err(Error::EmptyEmail);
        }

        Ok(Self {
            root,
            credentials: opts.credentials,
            max_response_time: opts.max_response_time,
            request_timeout: opts.request_timeout,
        })
    }

    /// Root url with the base path applied and no trailing slash.
    pub fn base_url(&self) -> &str {
        self.root.as_str().trim_end_matches('/')
    }

    /// Absolute url for an API path such as `/contas/7`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn defaults_resolve_to_public_api_root() {
        let cfg = SuiteConfig::from_options(SuiteOptions::default()).unwrap();
        assert_eq!(cfg.base_url(), "https://barrigarest.wcaquino.me");
        assert_eq!(cfg.endpoint("/signin"), "https://barrigarest.wcaquino.me/signin");
        assert_eq!(cfg.max_response_time, Duration::from_millis(4000));
    }

    #[test]
    fn port_and_base_path_are_applied() {
        let cfg = SuiteConfig::from_options(SuiteOptions {
            base_url: "http://127.0.0.1/".to_string(),
            port: Some(8080),
            base_path: "/api/v1/".to_string(),
            ..SuiteOptions::default()
        })
        .unwrap();

        assert_eq!(cfg.base_url(), "http://127.0.0.1:8080/api/v1");
        assert_eq!(cfg.endpoint("contas/3"), "http://127.0.0.1:8080/api/v1/contas/3");
    }

    #[test]
    fn base_url_port_is_kept_without_override() {
        let cfg = SuiteConfig::from_options(SuiteOptions {
            base_url: "http://127.0.0.1:3001".to_string(),
            port: None,
            ..SuiteOptions::default()
        })
        .unwrap();

        assert_eq!(cfg.endpoint("/reset"), "http://127.0.0.1:3001/reset");
    }

    #[test]
    fn rejects_invalid_options() {
        let bad_url = SuiteConfig::from_options(SuiteOptions {
            base_url: "not a url".to_string(),
            ..SuiteOptions::default()
        });
        assert!(matches!(bad_url, Err(Error::InvalidBaseUrl(_))));

        let bad_scheme = SuiteConfig::from_options(SuiteOptions {
            base_url: "ftp://example.com".to_string(),
            ..SuiteOptions::default()
        });
        assert!(matches!(bad_scheme, Err(Error::UnsupportedScheme(_))));

        let zero_budget = SuiteConfig::from_options(SuiteOptions {
            max_response_time: Duration::ZERO,
            ..SuiteOptions::default()
        });
        assert!(matches!(zero_budget, Err(Error::InvalidMaxResponseTime)));
    }

    #[test]
    fn credentials_serialize_with_wire_names() {
        let json = serde_json::to_value(Credentials::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "email": "helen@gmail.com", "senha": "12345" })
        );
    }
}
