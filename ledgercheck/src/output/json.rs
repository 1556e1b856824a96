use serde::Serialize;
use std::io::Write as _;
use std::sync::Arc;

use ledgercheck_core::{CheckResult, ScenarioReport, SuiteReport, Totals};

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _config: &ledgercheck_core::SuiteConfig) {}

    fn progress(&self) -> Option<ledgercheck_core::ProgressFn> {
        Some(Arc::new(move |report: &ScenarioReport| {
            let line = JsonScenarioLine {
                kind: "scenario",
                report,
            };
            emit_json_line(&line);
        }))
    }

    fn print_summary(&self, report: &SuiteReport) -> anyhow::Result<()> {
        let line = build_summary_line(report);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonScenarioLine<'a> {
    pub kind: &'static str,
    #[serde(flatten)]
    pub report: &'a ScenarioReport,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummaryLine<'a> {
    pub kind: &'static str,
    pub success: bool,
    pub account_name: &'a str,
    pub elapsed_ms: u64,
    pub bootstrap: &'a [CheckResult],
    pub totals: Totals,
}

fn build_summary_line(report: &SuiteReport) -> JsonSummaryLine<'_> {
    JsonSummaryLine {
        kind: "summary",
        success: report.is_success(),
        account_name: &report.account_name,
        elapsed_ms: report.elapsed_ms,
        bootstrap: &report.bootstrap,
        totals: report.totals(),
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut stdout = std::io::stdout().lock();
    if serde_json::to_writer(&mut stdout, line).is_ok() {
        let _ = stdout.write_all(b"\n");
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgercheck_core::{Dependency, Outcome};
    use serde_json::Value;

    fn scenario(name: &'static str, outcome: Outcome) -> ScenarioReport {
        ScenarioReport {
            order: 2,
            name,
            story: "story",
            outcome,
            method: None,
            url: None,
            http_status: None,
            elapsed_ms: 0,
            checks: Vec::new(),
        }
    }

    #[test]
    fn scenario_line_flattens_report() -> anyhow::Result<()> {
        let report = scenario(
            "rename_account",
            Outcome::Blocked {
                missing: Dependency::AccountId,
            },
        );
        let v = serde_json::to_value(JsonScenarioLine {
            kind: "scenario",
            report: &report,
        })?;

        assert_eq!(v.get("kind").and_then(Value::as_str), Some("scenario"));
        assert_eq!(v.get("name").and_then(Value::as_str), Some("rename_account"));
        assert_eq!(v.get("status").and_then(Value::as_str), Some("blocked"));
        assert_eq!(v.get("missing").and_then(Value::as_str), Some("account_id"));
        assert!(v.get("http_status").is_none());
        Ok(())
    }

    #[test]
    fn summary_line_carries_totals() -> anyhow::Result<()> {
        let report = SuiteReport {
            account_name: "Conta 7".to_string(),
            elapsed_ms: 42,
            bootstrap: vec![CheckResult {
                name: "reset: response time < 4000ms".to_string(),
                passed: false,
                expected: "< 4000ms".to_string(),
                actual: "4100ms".to_string(),
            }],
            scenarios: vec![
                scenario("create_account", Outcome::Passed),
                scenario("rename_account", Outcome::Failed),
            ],
        };
        let v = serde_json::to_value(build_summary_line(&report))?;

        assert_eq!(v.get("kind").and_then(Value::as_str), Some("summary"));
        assert_eq!(v.get("success").and_then(Value::as_bool), Some(false));
        assert_eq!(
            v.pointer("/totals/scenarios").and_then(Value::as_u64),
            Some(2)
        );
        assert_eq!(v.pointer("/totals/failed").and_then(Value::as_u64), Some(1));
        assert_eq!(v.get("account_name").and_then(Value::as_str), Some("Conta 7"));
        assert_eq!(
            v.pointer("/bootstrap/0/passed").and_then(Value::as_bool),
            Some(false)
        );
        assert_eq!(
            v.pointer("/totals/bootstrap_failed").and_then(Value::as_u64),
            Some(1)
        );
        Ok(())
    }
}
