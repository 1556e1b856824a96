use ledgercheck_core::{Outcome, ScenarioReport};

pub(crate) fn format_millis(ms: u64) -> String {
    if ms >= 1_000 {
        return format!("{:.2}s", (ms as f64) / 1_000.0);
    }
    format!("{ms}ms")
}

fn marker(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Passed => "ok",
        Outcome::Failed => "FAIL",
        Outcome::Blocked { .. } => "BLOCKED",
        Outcome::Errored { .. } => "ERROR",
    }
}

/// `[ok] 01 create_account POST http://.../contas -> 201 (12ms)`
pub(crate) fn scenario_line(report: &ScenarioReport) -> String {
    let mut line = format!(
        "[{}] {:02} {}",
        marker(&report.outcome),
        report.order,
        report.name
    );

    match &report.outcome {
        Outcome::Blocked { missing } => {
            line.push_str(&format!(" (missing {missing})"));
        }
        Outcome::Errored { error } => {
            line.push_str(&format!(" ({error})"));
        }
        Outcome::Passed | Outcome::Failed => {
            if let (Some(method), Some(url)) = (&report.method, &report.url) {
                line.push_str(&format!(" {method} {url}"));
            }
            if let Some(status) = report.http_status {
                line.push_str(&format!(" -> {status}"));
            }
            line.push_str(&format!(" ({})", format_millis(report.elapsed_ms)));
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgercheck_core::Dependency;

    fn report(outcome: Outcome) -> ScenarioReport {
        ScenarioReport {
            order: 3,
            name: "reject_duplicate_account_name",
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
    fn format_millis_switches_to_seconds() {
        assert_eq!(format_millis(250), "250ms");
        assert_eq!(format_millis(4_250), "4.25s");
    }

    #[test]
    fn blocked_line_names_missing_dependency() {
        let line = scenario_line(&report(Outcome::Blocked {
            missing: Dependency::RenamedAccount,
        }));
        assert_eq!(
            line,
            "[BLOCKED] 03 reject_duplicate_account_name (missing renamed_account)"
        );
    }

    #[test]
    fn passed_line_includes_exchange() {
        let mut r = report(Outcome::Passed);
        r.method = Some("POST".to_string());
        r.url = Some("http://127.0.0.1:1/contas".to_string());
        r.http_status = Some(400);
        r.elapsed_ms = 12;
        assert_eq!(
            scenario_line(&r),
            "[ok] 03 reject_duplicate_account_name POST http://127.0.0.1:1/contas -> 400 (12ms)"
        );
    }
}
