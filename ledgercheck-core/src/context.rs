//! Fixture state shared by the scenarios of one suite run.
//!
//! Each field starts out absent and is written by exactly one scenario. Scenarios that read
//! a field declare it as a [`Dependency`]; the runner refuses to start a scenario whose
//! dependencies are missing instead of letting an absent id leak into a request url.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::session::Session;

/// Suffix appended to the account name by the rename scenario.
pub const RENAMED_SUFFIX: &str = "alterada";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dependency {
    /// Id of the account created by `create_account`.
    AccountId,
    /// Account name after `rename_account` succeeded.
    RenamedAccount,
    /// Id of the movement created by `create_movement`.
    MovementId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing dependency `{0}`: the scenario that provides it did not succeed")]
pub struct MissingDependency(pub Dependency);

#[derive(Debug, Clone)]
pub struct SuiteContext {
    pub session: Session,
    pub account_name: String,
    pub account_id: Option<i64>,
    pub renamed_account: Option<String>,
    pub movement_id: Option<i64>,
}

impl SuiteContext {
    /// Fresh context with a run-unique account name (`Conta <unix nanos>`).
    pub fn new(session: Session) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::with_account_name(session, format!("Conta {nanos}"))
    }

    pub fn with_account_name(session: Session, account_name: impl Into<String>) -> Self {
        Self {
            session,
            account_name: account_name.into(),
            account_id: None,
            renamed_account: None,
            movement_id: None,
        }
    }

    /// Name the rename scenario assigns to the account.
    pub fn renamed_account_name(&self) -> String {
        format!("{}{RENAMED_SUFFIX}", self.account_name)
    }

    pub fn is_available(&self, dep: Dependency) -> bool {
        match dep {
            Dependency::AccountId => self.account_id.is_some(),
            Dependency::RenamedAccount => self.renamed_account.is_some(),
            Dependency::MovementId => self.movement_id.is_some(),
        }
    }

    /// First dependency in `deps` that is not available yet.
    pub fn first_missing(&self, deps: &[Dependency]) -> Option<MissingDependency> {
        deps.iter()
            .copied()
            .find(|d| !self.is_available(*d))
            .map(MissingDependency)
    }

    pub fn require_account_id(&self) -> Result<i64, MissingDependency> {
        self.account_id
            .ok_or(MissingDependency(Dependency::AccountId))
    }

    pub fn require_renamed_account(&self) -> Result<&str, MissingDependency> {
        self.renamed_account
            .as_deref()
            .ok_or(MissingDependency(Dependency::RenamedAccount))
    }

    pub fn require_movement_id(&self) -> Result<i64, MissingDependency> {
        self.movement_id
            .ok_or(MissingDependency(Dependency::MovementId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SuiteContext {
        SuiteContext::with_account_name(Session::new("t"), "Conta 1")
    }

    #[test]
    fn fresh_context_has_nothing_available() {
        let ctx = ctx();
        assert_eq!(
            ctx.first_missing(&[Dependency::AccountId, Dependency::MovementId]),
            Some(MissingDependency(Dependency::AccountId))
        );
        assert_eq!(
            ctx.require_movement_id(),
            Err(MissingDependency(Dependency::MovementId))
        );
        assert_eq!(
            ctx.require_renamed_account(),
            Err(MissingDependency(Dependency::RenamedAccount))
        );
    }

    #[test]
    fn reports_first_missing_in_declared_order() {
        let mut ctx = ctx();
        ctx.account_id = Some(7);
        assert_eq!(
            ctx.first_missing(&[Dependency::AccountId, Dependency::MovementId]),
            Some(MissingDependency(Dependency::MovementId))
        );

        ctx.movement_id = Some(9);
        assert_eq!(
            ctx.first_missing(&[Dependency::AccountId, Dependency::MovementId]),
            None
        );
        assert_eq!(ctx.require_account_id(), Ok(7));
    }

    #[test]
    fn generated_name_is_clock_derived_and_renamable() {
        let a = SuiteContext::new(Session::new("t"));
        let suffix = a.account_name.trim_start_matches("Conta ");
        assert!(a.account_name.starts_with("Conta "));
        assert!(suffix.parse::<u128>().is_ok(), "{}", a.account_name);
        assert_eq!(
            a.renamed_account_name(),
            format!("{}alterada", a.account_name)
        );
    }

    #[test]
    fn missing_dependency_names_the_field() {
        let err = MissingDependency(Dependency::RenamedAccount);
        assert!(err.to_string().contains("renamed_account"));
    }
}
