use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::sleep;

pub mod ledger;

pub use ledger::{Ledger, LedgerError};

pub const PATH_SIGNIN: &str = "/signin";
pub const PATH_RESET: &str = "/reset";
pub const PATH_ACCOUNTS: &str = "/contas";
pub const PATH_ACCOUNT: &str = "/contas/{id}";
pub const PATH_MOVEMENTS: &str = "/transacoes";
pub const PATH_MOVEMENT: &str = "/transacoes/{id}";
pub const PATH_BALANCE: &str = "/saldo";

pub const DEFAULT_EMAIL: &str = "helen@gmail.com";
pub const DEFAULT_PASSWORD: &str = "12345";

#[derive(Debug, Clone)]
pub struct TestServerOptions {
    pub email: String,
    pub password: String,
    /// Delay applied to every request before it is handled.
    pub delay: Option<Duration>,
    /// Answer `/reset` with 500.
    pub fail_reset: bool,
    /// Answer `POST /contas` with 500 instead of creating the account.
    pub fail_account_creation: bool,
    /// Accept duplicate account names instead of answering 400.
    pub allow_duplicate_names: bool,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            delay: None,
            fail_reset: false,
            fail_account_creation: false,
            allow_duplicate_names: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
    unauthorized_total: Arc<AtomicU64>,
    resets_total: Arc<AtomicU64>,
}

impl TestServerStats {
    fn inc_requests_total(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_unauthorized_total(&self) {
        self.unauthorized_total.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_resets_total(&self) {
        self.resets_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn unauthorized_total(&self) -> u64 {
        self.unauthorized_total.load(Ordering::Relaxed)
    }

    pub fn resets_total(&self) -> u64 {
        self.resets_total.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Mutex<Ledger>>,
    stats: TestServerStats,
    options: Arc<TestServerOptions>,
}

impl AppState {
    pub fn new(options: TestServerOptions) -> Self {
        let mut ledger = Ledger::new(&options.email, &options.password);
        ledger.set_unique_names(!options.allow_duplicate_names);
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            stats: TestServerStats::default(),
            options: Arc::new(options),
        }
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn enter(&self) {
        self.stats.inc_requests_total();
        if let Some(delay) = self.options.delay {
            sleep(delay).await;
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if self.ledger().is_authorized(auth) {
            return Ok(());
        }
        self.stats.inc_unauthorized_total();
        Err((StatusCode::UNAUTHORIZED, "Unauthorized").into_response())
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            Self::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(Value::Array(errors))).into_response()
            }
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            Self::Constraint(detail) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(detail)).into_response()
            }
        }
    }
}

fn parse_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

async fn handle_signin(State(state): State<AppState>, body: Bytes) -> Response {
    state.enter().await;
    let body = parse_body(&body);

    let token = state
        .ledger()
        .sign_in(field(&body, "email"), field(&body, "senha"));
    match token {
        Some(token) => (
            StatusCode::OK,
            Json(json!({ "id": 1, "nome": "Helen", "token": token })),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": ledger::MSG_BAD_LOGIN })),
        )
            .into_response(),
    }
}

async fn handle_reset(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }
    if state.options.fail_reset {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    state.ledger().reset();
    state.stats.inc_resets_total();
    StatusCode::OK.into_response()
}

async fn handle_list_accounts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }
    let accounts = state.ledger().accounts();
    (StatusCode::OK, Json(accounts)).into_response()
}

async fn handle_create_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }
    if state.options.fail_account_creation {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let body = parse_body(&body);
    let created = state.ledger().create_account(field(&body, "nome"));
    match created {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn handle_rename_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }

    let body = parse_body(&body);
    let renamed = state.ledger().rename_account(id, field(&body, "nome"));
    match renamed {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn handle_delete_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }

    let deleted = state.ledger().delete_account(id);
    match deleted {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn handle_create_movement(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }

    let body = parse_body(&body);
    let created = state.ledger().create_movement(&body);
    match created {
        Ok(movement) => (StatusCode::CREATED, Json(movement)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn handle_delete_movement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }

    let deleted = state.ledger().delete_movement(id);
    match deleted {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn handle_balance(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.enter().await;
    if let Err(res) = state.authorize(&headers) {
        return res;
    }
    let balance = state.ledger().balance();
    (StatusCode::OK, Json(balance)).into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PATH_SIGNIN, post(handle_signin))
        .route(PATH_RESET, get(handle_reset))
        .route(
            PATH_ACCOUNTS,
            get(handle_list_accounts).post(handle_create_account),
        )
        .route(
            PATH_ACCOUNT,
            put(handle_rename_account).delete(handle_delete_account),
        )
        .route(PATH_MOVEMENTS, post(handle_create_movement))
        .route(
            PATH_MOVEMENT,
            axum::routing::delete(handle_delete_movement),
        )
        .route(PATH_BALANCE, get(handle_balance))
        .with_state(state)
}

pub struct TestServer {
    base_url: String,
    state: AppState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(TestServerOptions::default()).await
    }

    pub async fn start_with(options: TestServerOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = AppState::new(options);
        let app = router(state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats(&self) -> &TestServerStats {
        self.state.stats()
    }

    pub fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.state.ledger()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
