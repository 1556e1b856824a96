use std::fmt::Write as _;

use ledgercheck_core::{Outcome, SuiteReport};

use super::format::format_millis;

pub(crate) fn render(report: &SuiteReport) -> String {
    let mut out = String::new();

    if report.scenarios.is_empty() {
        out.push_str("summary: no scenarios\n");
        return out;
    }

    out.push_str("\nsummary\n");
    writeln!(&mut out, "account: {}", report.account_name).ok();

    for c in report.failed_bootstrap_checks() {
        writeln!(
            &mut out,
            "bootstrap check failed: {} (expected {}, got {})",
            c.name, c.expected, c.actual
        )
        .ok();
    }

    for s in report.scenarios.iter().filter(|s| !s.outcome.is_passed()) {
        writeln!(&mut out, "scenario: {} ({})", s.name, s.outcome.label()).ok();
        writeln!(&mut out, "  story: {}", s.story).ok();
        match &s.outcome {
            Outcome::Blocked { missing } => {
                writeln!(&mut out, "  missing: {missing}").ok();
            }
            Outcome::Errored { error } => {
                writeln!(&mut out, "  error: {error}").ok();
            }
            Outcome::Failed => {
                for c in s.failed_checks() {
                    writeln!(
                        &mut out,
                        "  check failed: {} (expected {}, got {})",
                        c.name, c.expected, c.actual
                    )
                    .ok();
                }
            }
            Outcome::Passed => {}
        }
    }

    let t = report.totals();
    writeln!(
        &mut out,
        "scenarios: {} passed {} failed {} blocked {} errored {}",
        t.scenarios, t.passed, t.failed, t.blocked, t.errored
    )
    .ok();
    writeln!(
        &mut out,
        "checks: {} (failed {})",
        t.checks_total, t.checks_failed
    )
    .ok();
    writeln!(&mut out, "elapsed: {}", format_millis(report.elapsed_ms)).ok();

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgercheck_core::{CheckResult, Dependency, ScenarioReport};

    fn scenario(name: &'static str, outcome: Outcome, checks: Vec<CheckResult>) -> ScenarioReport {
        ScenarioReport {
            order: 1,
            name,
            story: "story",
            outcome,
            method: None,
            url: None,
            http_status: None,
            elapsed_ms: 3,
            checks,
        }
    }

    #[test]
    fn render_lists_only_non_passing_scenarios() {
        let report = SuiteReport {
            account_name: "Conta 1".to_string(),
            elapsed_ms: 1_500,
            bootstrap: Vec::new(),
            scenarios: vec![
                scenario(
                    "create_account",
                    Outcome::Failed,
                    vec![CheckResult {
                        name: "status".to_string(),
                        passed: false,
                        expected: "201".to_string(),
                        actual: "500".to_string(),
                    }],
                ),
                scenario(
                    "rename_account",
                    Outcome::Blocked {
                        missing: Dependency::AccountId,
                    },
                    Vec::new(),
                ),
                scenario("compute_balance", Outcome::Passed, Vec::new()),
            ],
        };

        let out = render(&report);
        assert!(out.contains("scenario: create_account (failed)"));
        assert!(out.contains("check failed: status (expected 201, got 500)"));
        assert!(out.contains("scenario: rename_account (blocked)"));
        assert!(out.contains("missing: account_id"));
        assert!(!out.contains("scenario: compute_balance"));
        assert!(out.contains("scenarios: 3 passed 1 failed 1 blocked 1 errored 0"));
        assert!(out.contains("elapsed: 1.50s"));
        assert!(!out.contains("bootstrap check failed"));
    }

    #[test]
    fn render_lists_slow_bootstrap_requests() {
        let report = SuiteReport {
            account_name: "Conta 1".to_string(),
            elapsed_ms: 900,
            bootstrap: vec![
                CheckResult {
                    name: "sign_in: status is 200".to_string(),
                    passed: true,
                    expected: "200".to_string(),
                    actual: "200".to_string(),
                },
                CheckResult {
                    name: "sign_in: response time < 50ms".to_string(),
                    passed: false,
                    expected: "< 50ms".to_string(),
                    actual: "210ms".to_string(),
                },
            ],
            scenarios: vec![scenario("create_account", Outcome::Passed, Vec::new())],
        };

        let out = render(&report);
        assert!(out.contains(
            "bootstrap check failed: sign_in: response time < 50ms (expected < 50ms, got 210ms)"
        ));
        assert!(!out.contains("sign_in: status is 200"));
        assert!(out.contains("checks: 2 (failed 1)"));
    }

    #[test]
    fn render_handles_empty_report() {
        let report = SuiteReport {
            account_name: String::new(),
            elapsed_ms: 0,
            bootstrap: Vec::new(),
            scenarios: Vec::new(),
        };
        assert_eq!(render(&report), "summary: no scenarios\n");
    }
}
