use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used in logs and scenario reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HttpTransportErrorKind {
    InvalidUrl,
    UnsupportedScheme,
    InvalidRequest,
    Encode,
    Connect,
    Timeout,
    BodyRead,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("only http:// and https:// URLs are supported: {0}")]
    UnsupportedScheme(String),

    #[error("invalid header `{name}`")]
    InvalidHeader { name: String },

    #[error("failed to build request: {0}")]
    InvalidRequest(#[from] http::Error),

    #[error("failed to encode json body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("failed to read response body: {0}")]
    BodyRead(#[from] hyper::Error),
}

impl Error {
    #[must_use]
    pub fn transport_error_kind(&self) -> HttpTransportErrorKind {
        match self {
            Self::InvalidUrl(_) => HttpTransportErrorKind::InvalidUrl,
            Self::UnsupportedScheme(_) => HttpTransportErrorKind::UnsupportedScheme,
            Self::InvalidHeader { .. } | Self::InvalidRequest(_) => {
                HttpTransportErrorKind::InvalidRequest
            }
            Self::Encode(_) => HttpTransportErrorKind::Encode,
            Self::Connect(_) => HttpTransportErrorKind::Connect,
            Self::Timeout(_) => HttpTransportErrorKind::Timeout,
            Self::BodyRead(_) => HttpTransportErrorKind::BodyRead,
        }
    }
}
