use serde::Serialize;

use crate::config::SuiteConfig;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Result};
use crate::movement::Movement;
use crate::session::RequestProfile;

pub const PATH_SIGNIN: &str = "/signin";
pub const PATH_RESET: &str = "/reset";
pub const PATH_ACCOUNTS: &str = "/contas";
pub const PATH_MOVEMENTS: &str = "/transacoes";
pub const PATH_BALANCE: &str = "/saldo";

/// A request together with the response it produced.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request: HttpRequest,
    pub response: HttpResponse,
}

#[derive(Debug, Serialize)]
struct AccountBody<'a> {
    #[serde(rename = "nome")]
    name: &'a str,
}

/// Typed access to the ledger endpoints. Carries no auth state of its own; every call
/// takes the [`RequestProfile`] it should be sent with.
#[derive(Debug, Clone)]
pub struct LedgerApi {
    client: HttpClient,
    config: SuiteConfig,
}

impl LedgerApi {
    pub fn new(client: HttpClient, config: SuiteConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub async fn sign_in(&self, profile: &RequestProfile) -> Result<Exchange> {
        let req = HttpRequest::post_json(
            self.config.endpoint(PATH_SIGNIN),
            &self.config.credentials,
        )?;
        self.send(profile, req).await
    }

    pub async fn reset(&self, profile: &RequestProfile) -> Result<Exchange> {
        let req = HttpRequest::get(self.config.endpoint(PATH_RESET));
        self.send(profile, req).await
    }

    pub async fn list_accounts(&self, profile: &RequestProfile) -> Result<Exchange> {
        let req = HttpRequest::get(self.config.endpoint(PATH_ACCOUNTS));
        self.send(profile, req).await
    }

    pub async fn create_account(&self, profile: &RequestProfile, name: &str) -> Result<Exchange> {
        let req = HttpRequest::post_json(
            self.config.endpoint(PATH_ACCOUNTS),
            &AccountBody { name },
        )?;
        self.send(profile, req).await
    }

    pub async fn rename_account(
        &self,
        profile: &RequestProfile,
        id: i64,
        name: &str,
    ) -> Result<Exchange> {
        let req = HttpRequest::put_json(self.account_url(id), &AccountBody { name })?;
        self.send(profile, req).await
    }

    pub async fn delete_account(&self, profile: &RequestProfile, id: i64) -> Result<Exchange> {
        let req = HttpRequest::delete(self.account_url(id));
        self.send(profile, req).await
    }

    pub async fn create_movement(
        &self,
        profile: &RequestProfile,
        movement: &Movement,
    ) -> Result<Exchange> {
        let req = HttpRequest::post_json(self.config.endpoint(PATH_MOVEMENTS), movement)?;
        self.send(profile, req).await
    }

    pub async fn delete_movement(&self, profile: &RequestProfile, id: i64) -> Result<Exchange> {
        let req = HttpRequest::delete(self.config.endpoint(&format!("{PATH_MOVEMENTS}/{id}")));
        self.send(profile, req).await
    }

    pub async fn balance(&self, profile: &RequestProfile) -> Result<Exchange> {
        let req = HttpRequest::get(self.config.endpoint(PATH_BALANCE));
        self.send(profile, req).await
    }

    fn account_url(&self, id: i64) -> String {
        self.config.endpoint(&format!("{PATH_ACCOUNTS}/{id}"))
    }

    async fn send(&self, profile: &RequestProfile, req: HttpRequest) -> Result<Exchange> {
        let request = profile
            .apply(req)
            .with_timeout(self.config.request_timeout);
        let response = self.client.request(request.clone()).await?;
        Ok(Exchange { request, response })
    }
}
