use serde::Serialize;

use crate::checks::CheckResult;
use crate::context::Dependency;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// At least one check failed.
    Failed,
    /// Not started: a scenario it depends on did not provide `missing`.
    Blocked { missing: Dependency },
    /// The request could not be completed (transport error, timeout).
    Errored { error: String },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Blocked { .. } => "blocked",
            Self::Errored { .. } => "errored",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub order: u8,
    pub name: &'static str,
    pub story: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub elapsed_ms: u64,
    pub checks: Vec<CheckResult>,
}

impl ScenarioReport {
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub scenarios: usize,
    pub passed: usize,
    pub failed: usize,
    pub blocked: usize,
    pub errored: usize,
    /// Sign-in and reset checks that failed (response time budget).
    pub bootstrap_failed: usize,
    pub checks_total: usize,
    pub checks_failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub account_name: String,
    pub elapsed_ms: u64,
    /// Checks recorded on the sign-in and reset requests.
    pub bootstrap: Vec<CheckResult>,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn totals(&self) -> Totals {
        let mut t = Totals {
            scenarios: self.scenarios.len(),
            bootstrap_failed: self.failed_bootstrap_checks().count(),
            checks_total: self.bootstrap.len(),
            ..Totals::default()
        };
        t.checks_failed = t.bootstrap_failed;
        for s in &self.scenarios {
            match s.outcome {
                Outcome::Passed => t.passed += 1,
                Outcome::Failed => t.failed += 1,
                Outcome::Blocked { .. } => t.blocked += 1,
                Outcome::Errored { .. } => t.errored += 1,
            }
            t.checks_total += s.checks.len();
            t.checks_failed += s.failed_checks().count();
        }
        t
    }

    /// True when every bootstrap check and every scenario passed.
    pub fn is_success(&self) -> bool {
        self.bootstrap.iter().all(|c| c.passed)
            && self.scenarios.iter().all(|s| s.outcome.is_passed())
    }

    pub fn failed_bootstrap_checks(&self) -> impl Iterator<Item = &CheckResult> {
        self.bootstrap.iter().filter(|c| !c.passed)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn report(name: &'static str, outcome: Outcome, checks: Vec<CheckResult>) -> ScenarioReport {
        ScenarioReport {
            order: 1,
            name,
            story: "story",
            outcome,
            method: None,
            url: None,
            http_status: None,
            elapsed_ms: 0,
            checks,
        }
    }

    fn check(passed: bool) -> CheckResult {
        CheckResult {
            name: "status is 200".to_string(),
            passed,
            expected: "200".to_string(),
            actual: if passed { "200" } else { "500" }.to_string(),
        }
    }

    #[test]
    fn totals_count_each_outcome() {
        let suite = SuiteReport {
            account_name: "Conta 1".to_string(),
            elapsed_ms: 3,
            bootstrap: vec![check(true), check(true)],
            scenarios: vec![
                report("a", Outcome::Passed, vec![check(true)]),
                report("b", Outcome::Failed, vec![check(true), check(false)]),
                report(
                    "c",
                    Outcome::Blocked {
                        missing: Dependency::AccountId,
                    },
                    vec![],
                ),
                report(
                    "d",
                    Outcome::Errored {
                        error: "timeout".to_string(),
                    },
                    vec![],
                ),
            ],
        };

        let t = suite.totals();
        assert_eq!((t.passed, t.failed, t.blocked, t.errored), (1, 1, 1, 1));
        assert_eq!((t.checks_total, t.checks_failed), (5, 1));
        assert_eq!(t.bootstrap_failed, 0);
        assert!(!suite.is_success());
    }

    #[test]
    fn slow_bootstrap_fails_an_otherwise_green_suite() {
        let mut suite = SuiteReport {
            account_name: "Conta 1".to_string(),
            elapsed_ms: 3,
            bootstrap: vec![check(true), check(true)],
            scenarios: vec![report("a", Outcome::Passed, vec![check(true)])],
        };
        assert!(suite.is_success());

        suite.bootstrap[1] = CheckResult {
            name: "sign_in: response time < 50ms".to_string(),
            passed: false,
            expected: "< 50ms".to_string(),
            actual: "200ms".to_string(),
        };

        let t = suite.totals();
        assert_eq!((t.passed, t.failed), (1, 0));
        assert_eq!(t.bootstrap_failed, 1);
        assert_eq!((t.checks_total, t.checks_failed), (3, 1));
        assert!(!suite.is_success());
        assert_eq!(suite.failed_bootstrap_checks().count(), 1);
    }

    #[test]
    fn outcome_serializes_flat_with_status_tag() {
        let r = report(
            "rename_account",
            Outcome::Blocked {
                missing: Dependency::AccountId,
            },
            vec![],
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "blocked");
        assert_eq!(json["missing"], "account_id");
        assert_eq!(json["name"], "rename_account");
        assert!(json.get("url").is_none());
    }
}
