use std::sync::Arc;
use std::time::Instant;

use crate::api::{Exchange, LedgerApi};
use crate::context::SuiteContext;
use crate::report::{Outcome, ScenarioReport, SuiteReport};
use crate::scenario::{self, SCENARIOS, Scenario, ScenarioError};
use crate::session::{Bootstrap, BootstrapError, bootstrap};

/// Called with each scenario report as soon as that scenario finishes.
pub type ProgressFn = Arc<dyn Fn(&ScenarioReport) + Send + Sync>;

/// Bootstraps a session and runs the full scenario chain.
///
/// Bootstrap failures abort the run; a slow but successful bootstrap is recorded as failed
/// checks on the report. Anything after that is recorded per scenario and never
/// stops the loop.
pub async fn run_suite(
    api: &LedgerApi,
    progress: Option<ProgressFn>,
) -> Result<SuiteReport, BootstrapError> {
    let started = Instant::now();
    let Bootstrap { session, checks } = bootstrap(api).await?;
    let mut ctx = SuiteContext::new(session);

    let scenarios = run_scenarios(api, &mut ctx, &SCENARIOS, progress).await;

    Ok(SuiteReport {
        account_name: ctx.account_name,
        elapsed_ms: started.elapsed().as_millis() as u64,
        bootstrap: checks,
        scenarios,
    })
}

/// Runs `scenarios` strictly in slice order against an already bootstrapped context.
pub async fn run_scenarios(
    api: &LedgerApi,
    ctx: &mut SuiteContext,
    scenarios: &[Scenario],
    progress: Option<ProgressFn>,
) -> Vec<ScenarioReport> {
    let mut reports = Vec::with_capacity(scenarios.len());

    for s in scenarios {
        let report = run_one(api, ctx, s).await;
        if let Some(p) = &progress {
            p(&report);
        }
        reports.push(report);
    }

    reports
}

async fn run_one(api: &LedgerApi, ctx: &mut SuiteContext, s: &Scenario) -> ScenarioReport {
    let mut report = ScenarioReport {
        order: s.order,
        name: s.name(),
        story: s.story,
        outcome: Outcome::Passed,
        method: None,
        url: None,
        http_status: None,
        elapsed_ms: 0,
        checks: Vec::new(),
    };

    if let Some(missing) = ctx.first_missing(s.requires) {
        tracing::warn!(scenario = s.name(), %missing, "scenario blocked");
        report.outcome = Outcome::Blocked { missing: missing.0 };
        return report;
    }

    match scenario::execute(s, api, ctx).await {
        Ok(execution) => {
            let passed = execution.passed();
            let Exchange { request, response } = &execution.exchange;

            report.method = Some(request.method.to_string());
            report.url = Some(request.url.clone());
            report.http_status = Some(response.status);
            report.elapsed_ms = response.elapsed.as_millis() as u64;
            report.checks = execution.checks.clone();

            if passed {
                tracing::debug!(scenario = s.name(), "scenario passed");
            } else {
                report.outcome = Outcome::Failed;
                log_failed_exchange(s, &execution.exchange, &report);
            }
        }
        Err(ScenarioError::Missing(missing)) => {
            tracing::warn!(scenario = s.name(), %missing, "scenario blocked");
            report.outcome = Outcome::Blocked { missing: missing.0 };
        }
        Err(ScenarioError::Http(err)) => {
            tracing::warn!(
                scenario = s.name(),
                kind = %err.transport_error_kind(),
                error = %err,
                "scenario request failed"
            );
            report.outcome = Outcome::Errored {
                error: err.to_string(),
            };
        }
    }

    report
}

fn log_failed_exchange(s: &Scenario, exchange: &Exchange, report: &ScenarioReport) {
    let failed: Vec<&str> = report.failed_checks().map(|c| c.name.as_str()).collect();
    let request_body = String::from_utf8_lossy(&exchange.request.body);
    let response_body = String::from_utf8_lossy(&exchange.response.body);

    tracing::warn!(
        scenario = s.name(),
        failed_checks = ?failed,
        method = %exchange.request.method,
        url = %exchange.request.url,
        request_headers = ?redacted_headers(&exchange.request.headers),
        request_body = %request_body,
        status = exchange.response.status,
        response_headers = ?exchange.response.headers,
        response_body = %response_body,
        "scenario checks failed"
    );
}

fn redacted_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            if k.eq_ignore_ascii_case("authorization") {
                (k.clone(), "<redacted>".to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_is_redacted_in_logs() {
        let headers = vec![
            ("authorization".to_string(), "JWT abc".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        let out = redacted_headers(&headers);
        assert_eq!(out[0].1, "<redacted>");
        assert_eq!(out[1].1, "application/json");
    }
}
