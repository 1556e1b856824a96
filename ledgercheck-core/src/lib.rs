#![forbid(unsafe_code)]
//! Ordered contract checks for the ledger REST API.
//!
//! A run signs in once, resets the server, then walks [`SCENARIOS`] in order. Ids created by
//! earlier scenarios are carried in a [`SuiteContext`]; a scenario whose inputs are missing
//! is reported as blocked instead of being sent.

pub mod api;
pub mod checks;
pub mod config;
pub mod context;
pub mod dates;
pub mod http;
pub mod movement;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod session;

pub use api::{Exchange, LedgerApi};
pub use checks::{CheckResult, Checks};
pub use config::{Credentials, SuiteConfig, SuiteOptions};
pub use context::{Dependency, MissingDependency, SuiteContext};
pub use dates::{offset_date, offset_date_from};
pub use http::HttpClient;
pub use movement::{Movement, MovementKind};
pub use report::{Outcome, ScenarioReport, SuiteReport, Totals};
pub use runner::{ProgressFn, run_scenarios, run_suite};
pub use scenario::{SCENARIOS, Scenario, ScenarioId};
pub use session::{Bootstrap, BootstrapError, BootstrapStep, RequestProfile, Session, bootstrap};
