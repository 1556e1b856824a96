//! Authentication state and the one-time suite bootstrap.

use serde::Serialize;

use crate::api::{Exchange, LedgerApi};
use crate::checks::{CheckResult, Checks};
use crate::config::CONTENT_TYPE_JSON;
use crate::http::HttpRequest;

/// Scheme prefix the ledger API expects in the `Authorization` header.
pub const AUTH_SCHEME: &str = "JWT";

const AUTHORIZATION: &str = "authorization";
const CONTENT_TYPE: &str = "content-type";

/// Headers applied to a request before it is sent.
///
/// Profiles are plain values: attaching or detaching credentials returns a new profile and
/// never changes one that another scenario already holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestProfile {
    headers: Vec<(String, String)>,
}

impl RequestProfile {
    /// JSON content type, no credentials.
    pub fn json() -> Self {
        Self::default().with_header(CONTENT_TYPE, CONTENT_TYPE_JSON)
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    #[must_use]
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self
    }

    pub fn apply(&self, req: HttpRequest) -> HttpRequest {
        self.headers
            .iter()
            .fold(req, |req, (k, v)| req.with_header(k, v.as_str()))
    }
}

/// Token obtained from `/signin`. Created once per run and never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn authorization_value(&self) -> String {
        format!("{AUTH_SCHEME} {}", self.token)
    }

    /// `profile` plus `Authorization: JWT <token>`.
    pub fn attach(&self, profile: RequestProfile) -> RequestProfile {
        profile.with_header(AUTHORIZATION, self.authorization_value())
    }

    /// `profile` with any `Authorization` header removed.
    pub fn detach(&self, profile: RequestProfile) -> RequestProfile {
        profile.without_header(AUTHORIZATION)
    }

    /// Default identity for scenario requests.
    pub fn profile(&self) -> RequestProfile {
        self.attach(RequestProfile::json())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BootstrapStep {
    SignIn,
    Reset,
}

/// Any of these aborts the whole run: no scenario is meaningful without a session and a
/// clean server.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("bootstrap {step} failed: {source}")]
    Transport {
        step: BootstrapStep,
        #[source]
        source: crate::http::Error,
    },

    #[error("bootstrap {step} returned status {actual} (expected {expected}): {body}")]
    UnexpectedStatus {
        step: BootstrapStep,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("bootstrap sign_in response has no string `token` field: {body}")]
    MissingToken { body: String },
}

impl BootstrapError {
    pub fn step(&self) -> BootstrapStep {
        match self {
            Self::Transport { step, .. } | Self::UnexpectedStatus { step, .. } => *step,
            Self::MissingToken { .. } => BootstrapStep::SignIn,
        }
    }
}

/// A signed-in session plus the checks recorded on the sign-in and reset calls.
#[derive(Debug)]
pub struct Bootstrap {
    pub session: Session,
    /// Status and response-time checks, names prefixed with the step (`sign_in: ...`).
    pub checks: Vec<CheckResult>,
}

/// Signs in, installs the token and resets the server fixtures.
///
/// A wrong status or a missing token is fatal. A response-time overrun is not: it is
/// returned as a failed check so the run can go on and report it.
pub async fn bootstrap(api: &LedgerApi) -> Result<Bootstrap, BootstrapError> {
    let anonymous = RequestProfile::json();

    let signin = api
        .sign_in(&anonymous)
        .await
        .map_err(|source| BootstrapError::Transport {
            step: BootstrapStep::SignIn,
            source,
        })?;
    expect_ok(BootstrapStep::SignIn, &signin)?;

    let token = signin
        .response
        .json()
        .and_then(|v| v.get("token").and_then(|t| t.as_str()).map(str::to_string))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BootstrapError::MissingToken {
            body: body_preview(&signin),
        })?;
    let session = Session::new(token);
    tracing::info!(email = %api.config().credentials.email, "signed in");

    let reset = api
        .reset(&session.profile())
        .await
        .map_err(|source| BootstrapError::Transport {
            step: BootstrapStep::Reset,
            source,
        })?;
    expect_ok(BootstrapStep::Reset, &reset)?;
    tracing::info!("server fixtures reset");

    let mut checks = step_checks(api, BootstrapStep::SignIn, &signin);
    checks.extend(step_checks(api, BootstrapStep::Reset, &reset));

    Ok(Bootstrap { session, checks })
}

fn step_checks(api: &LedgerApi, step: BootstrapStep, exchange: &Exchange) -> Vec<CheckResult> {
    let mut checks = Checks::new(&exchange.response);
    checks.status(200);
    if !checks.response_time(api.config().max_response_time) {
        tracing::warn!(
            %step,
            url = %exchange.request.url,
            elapsed_ms = exchange.response.elapsed.as_millis() as u64,
            "bootstrap request exceeded the response time budget"
        );
    }

    checks
        .into_results()
        .into_iter()
        .map(|mut c| {
            c.name = format!("{step}: {}", c.name);
            c
        })
        .collect()
}

fn expect_ok(step: BootstrapStep, exchange: &Exchange) -> Result<(), BootstrapError> {
    if exchange.response.status == 200 {
        return Ok(());
    }
    Err(BootstrapError::UnexpectedStatus {
        step,
        expected: 200,
        actual: exchange.response.status,
        body: body_preview(exchange),
    })
}

fn body_preview(exchange: &Exchange) -> String {
    const MAX: usize = 256;
    let body = String::from_utf8_lossy(&exchange.response.body);
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn attach_adds_jwt_header_without_touching_input() {
        let session = Session::new("abc");
        let base = RequestProfile::json();
        let attached = session.attach(base.clone());

        assert_eq!(header(&attached.headers, "Authorization"), Some("JWT abc"));
        assert_eq!(
            header(&attached.headers, "content-type"),
            Some("application/json")
        );
        assert_eq!(header(&base.headers, "authorization"), None);
    }

    #[test]
    fn detach_removes_only_authorization() {
        let session = Session::new("abc");
        let detached = session.detach(session.profile());

        assert_eq!(header(&detached.headers, "authorization"), None);
        assert_eq!(
            header(&detached.headers, "content-type"),
            Some("application/json")
        );
        assert!(header(&session.profile().headers, "authorization").is_some());
    }

    #[test]
    fn apply_sets_headers_on_request() {
        let req = Session::new("t1")
            .profile()
            .apply(HttpRequest::get("http://localhost/contas"));
        assert_eq!(header(&req.headers, "authorization"), Some("JWT t1"));
        assert_eq!(
            header(&req.headers, "content-type"),
            Some("application/json")
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let dbg = format!("{:?}", Session::new("secret-token"));
        assert!(!dbg.contains("secret-token"));
    }
}
