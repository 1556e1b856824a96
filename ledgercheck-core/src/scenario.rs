//! The ordered scenario chain.
//!
//! [`SCENARIOS`] is the only ordering key: scenarios run in array order and each one
//! declares which fixture fields it reads. A scenario writes its post-condition into the
//! [`SuiteContext`] only when the checks that establish that entity passed.

use serde::Serialize;

use crate::api::{Exchange, LedgerApi};
use crate::checks::{CheckResult, Checks};
use crate::context::{Dependency, MissingDependency, SuiteContext};
use crate::dates::offset_date;
use crate::http;
use crate::movement::Movement;

/// Error body returned when an account name is already taken.
pub const DUPLICATE_ACCOUNT_MESSAGE: &str = "Já existe uma conta com esse nome!";

/// Validation message returned for a transaction dated after today.
pub const FUTURE_MOVEMENT_MESSAGE: &str =
    "Data da Movimentação deve ser menor ou igual à data atual";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScenarioId {
    CreateAccount,
    RenameAccount,
    RejectDuplicateAccountName,
    CreateMovement,
    RejectIncompleteMovement,
    RejectFutureMovement,
    RejectAccountDeletionWithMovements,
    ComputeBalance,
    DeleteMovement,
    RejectUnauthenticatedAccess,
}

impl ScenarioId {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub order: u8,
    pub id: ScenarioId,
    pub story: &'static str,
    pub description: &'static str,
    pub requires: &'static [Dependency],
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        self.id.name()
    }
}

pub const SCENARIOS: [Scenario; 10] = [
    Scenario {
        order: 1,
        id: ScenarioId::CreateAccount,
        story: "Create account",
        description: "An account with a fresh name is created.",
        requires: &[],
    },
    Scenario {
        order: 2,
        id: ScenarioId::RenameAccount,
        story: "Rename account",
        description: "The created account can be renamed.",
        requires: &[Dependency::AccountId],
    },
    Scenario {
        order: 3,
        id: ScenarioId::RejectDuplicateAccountName,
        story: "Duplicate account name",
        description: "Creating an account with a name already in use is rejected.",
        requires: &[Dependency::RenamedAccount],
    },
    Scenario {
        order: 4,
        id: ScenarioId::CreateMovement,
        story: "Create movement",
        description: "A valid movement is recorded against the account.",
        requires: &[Dependency::AccountId],
    },
    Scenario {
        order: 5,
        id: ScenarioId::RejectIncompleteMovement,
        story: "Required movement fields",
        description: "A movement with every field absent is rejected.",
        requires: &[],
    },
    Scenario {
        order: 6,
        id: ScenarioId::RejectFutureMovement,
        story: "Future movement",
        description: "A movement dated after today is rejected with one validation message.",
        requires: &[],
    },
    Scenario {
        order: 7,
        id: ScenarioId::RejectAccountDeletionWithMovements,
        story: "Delete account with movements",
        description: "An account that still has movements cannot be deleted.",
        requires: &[Dependency::AccountId, Dependency::MovementId],
    },
    Scenario {
        order: 8,
        id: ScenarioId::ComputeBalance,
        story: "Account balance",
        description: "The aggregate balance is computed.",
        requires: &[],
    },
    Scenario {
        order: 9,
        id: ScenarioId::DeleteMovement,
        story: "Delete movement",
        description: "An existing movement is deleted.",
        requires: &[Dependency::MovementId],
    },
    Scenario {
        order: 10,
        id: ScenarioId::RejectUnauthenticatedAccess,
        story: "Access without token",
        description: "Reads without an Authorization header are refused.",
        requires: &[],
    },
];

/// Looks a scenario up by its stable name.
pub fn find(name: &str) -> Option<&'static Scenario> {
    let id = name.parse::<ScenarioId>().ok()?;
    SCENARIOS.iter().find(|s| s.id == id)
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Missing(#[from] MissingDependency),

    #[error(transparent)]
    Http(#[from] http::Error),
}

/// What a scenario sent, received and checked.
#[derive(Debug)]
pub struct Execution {
    pub exchange: Exchange,
    pub checks: Vec<CheckResult>,
}

impl Execution {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

pub(crate) async fn execute(
    scenario: &Scenario,
    api: &LedgerApi,
    ctx: &mut SuiteContext,
) -> Result<Execution, ScenarioError> {
    let profile = ctx.session.profile();

    match scenario.id {
        ScenarioId::CreateAccount => {
            let exchange = api.create_account(&profile, &ctx.account_name).await?;
            let (execution, id) = evaluate(api, exchange, |c| {
                let created = c.status(201);
                c.json_positive_id("id").filter(|_| created)
            });
            if let Some(id) = id {
                ctx.account_id = Some(id);
            }
            Ok(execution)
        }

        ScenarioId::RenameAccount => {
            let id = ctx.require_account_id()?;
            let new_name = ctx.renamed_account_name();
            let exchange = api.rename_account(&profile, id, &new_name).await?;
            let (execution, renamed) = evaluate(api, exchange, |c| {
                let ok = c.status(200);
                c.json_eq("nome", &new_name) && ok
            });
            if renamed {
                ctx.renamed_account = Some(new_name);
            }
            Ok(execution)
        }

        ScenarioId::RejectDuplicateAccountName => {
            let name = ctx.require_renamed_account()?.to_string();
            let exchange = api.create_account(&profile, &name).await?;
            let (execution, ()) = evaluate(api, exchange, |c| {
                c.status(400);
                c.json_eq("error", DUPLICATE_ACCOUNT_MESSAGE);
            });
            Ok(execution)
        }

        ScenarioId::CreateMovement => {
            let account_id = ctx.require_account_id()?;
            let movement = Movement::valid(Some(account_id));
            let exchange = api.create_movement(&profile, &movement).await?;
            let (execution, id) = evaluate(api, exchange, |c| {
                let created = c.status(201);
                c.json_positive_id("id").filter(|_| created)
            });
            if let Some(id) = id {
                ctx.movement_id = Some(id);
            }
            Ok(execution)
        }

        ScenarioId::RejectIncompleteMovement => {
            let exchange = api.create_movement(&profile, &Movement::empty()).await?;
            let (execution, ()) = evaluate(api, exchange, |c| {
                c.status(400);
            });
            Ok(execution)
        }

        ScenarioId::RejectFutureMovement => {
            let movement = Movement::valid(ctx.account_id).with_transaction_date(offset_date(2));
            let exchange = api.create_movement(&profile, &movement).await?;
            let (execution, ()) = evaluate(api, exchange, |c| {
                c.status(400);
                c.json_len("$", 1);
                c.json_has_item("msg", FUTURE_MOVEMENT_MESSAGE);
            });
            Ok(execution)
        }

        ScenarioId::RejectAccountDeletionWithMovements => {
            let account_id = ctx.require_account_id()?;
            ctx.require_movement_id()?;
            let exchange = api.delete_account(&profile, account_id).await?;
            // The service reports this conflict as an unhandled error rather than a 4xx.
            let (execution, ()) = evaluate(api, exchange, |c| {
                c.status(500);
            });
            Ok(execution)
        }

        ScenarioId::ComputeBalance => {
            let exchange = api.balance(&profile).await?;
            let (execution, ()) = evaluate(api, exchange, |c| {
                c.status(200);
                c.json_not_null("saldo");
            });
            Ok(execution)
        }

        ScenarioId::DeleteMovement => {
            let movement_id = ctx.require_movement_id()?;
            let exchange = api.delete_movement(&profile, movement_id).await?;
            let (execution, ()) = evaluate(api, exchange, |c| {
                c.status(204);
                c.empty_body();
            });
            Ok(execution)
        }

        ScenarioId::RejectUnauthenticatedAccess => {
            let anonymous = ctx.session.detach(profile);
            let exchange = api.list_accounts(&anonymous).await?;
            let (execution, ()) = evaluate(api, exchange, |c| {
                c.status(401);
            });
            Ok(execution)
        }
    }
}

/// Runs the scenario-specific checks followed by the global response time check.
fn evaluate<T>(
    api: &LedgerApi,
    exchange: Exchange,
    f: impl FnOnce(&mut Checks<'_>) -> T,
) -> (Execution, T) {
    let mut checks = Checks::new(&exchange.response);
    let out = f(&mut checks);
    checks.response_time(api.config().max_response_time);
    let checks = checks.into_results();

    (Execution { exchange, checks }, out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn order_is_strict_and_names_are_unique() {
        let orders: Vec<u8> = SCENARIOS.iter().map(|s| s.order).collect();
        assert_eq!(orders, (1..=10).collect::<Vec<u8>>());

        let names: HashSet<&str> = SCENARIOS.iter().map(Scenario::name).collect();
        assert_eq!(names.len(), SCENARIOS.len());
    }

    #[test]
    fn every_dependency_is_provided_by_an_earlier_scenario() {
        let provider = |dep: Dependency| match dep {
            Dependency::AccountId => ScenarioId::CreateAccount,
            Dependency::RenamedAccount => ScenarioId::RenameAccount,
            Dependency::MovementId => ScenarioId::CreateMovement,
        };

        for (idx, s) in SCENARIOS.iter().enumerate() {
            for dep in s.requires {
                let pos = SCENARIOS
                    .iter()
                    .position(|p| p.id == provider(*dep))
                    .unwrap_or(usize::MAX);
                assert!(pos < idx, "{} requires {dep} before it is provided", s.name());
            }
        }
    }

    #[test]
    fn names_round_trip_through_find() {
        assert_eq!(
            find("reject_account_deletion_with_movements").map(|s| s.order),
            Some(7)
        );
        assert!(find("t07_naoDeveRemoverConta").is_none());
        assert_eq!(
            "compute_balance".parse::<ScenarioId>().ok(),
            Some(ScenarioId::ComputeBalance)
        );
    }
}
