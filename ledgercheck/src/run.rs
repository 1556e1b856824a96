use anyhow::Context as _;
use std::path::Path;

use ledgercheck_core::{
    Credentials, HttpClient, LedgerApi, Scenario, SuiteConfig, SuiteOptions, SuiteReport,
};

use crate::cli::RunArgs;
use crate::exit_codes::ExitCode;
use crate::output;

/// A run that ended before producing a report, tagged with the exit code it maps to.
#[derive(Debug)]
pub struct RunError {
    code: ExitCode,
    error: anyhow::Error,
}

impl RunError {
    fn invalid_input(error: anyhow::Error) -> Self {
        Self {
            code: ExitCode::InvalidInput,
            error,
        }
    }

    fn bootstrap_failed(error: anyhow::Error) -> Self {
        Self {
            code: ExitCode::BootstrapFailed,
            error,
        }
    }

    fn runtime(error: anyhow::Error) -> Self {
        Self {
            code: ExitCode::RuntimeError,
            error,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.code
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.error)
    }
}

pub async fn run(args: RunArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    let config = suite_config(&args).map_err(RunError::invalid_input)?;
    out.print_header(&config);

    let api = LedgerApi::new(HttpClient::default(), config);
    let report = match ledgercheck_core::run_suite(&api, out.progress()).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(step = %err.step(), error = %err, "bootstrap failed");
            return Err(RunError::bootstrap_failed(
                anyhow::Error::new(err).context("bootstrap failed; no scenario was run"),
            ));
        }
    };

    out.print_summary(&report).map_err(RunError::runtime)?;

    if let Some(path) = &args.report_out {
        write_report(path, &report)
            .await
            .map_err(RunError::runtime)?;
    }

    Ok(ExitCode::from_report(&report))
}

/// Prints every scenario in execution order, or only `name` when given.
pub fn list_scenarios(name: Option<&str>) -> Result<(), RunError> {
    let Some(name) = name else {
        ledgercheck_core::SCENARIOS.iter().for_each(print_scenario);
        return Ok(());
    };

    let scenario = ledgercheck_core::scenario::find(name).ok_or_else(|| {
        RunError::invalid_input(anyhow::anyhow!(
            "unknown scenario `{name}`; run `ledgercheck scenarios` to list them"
        ))
    })?;
    print_scenario(scenario);
    Ok(())
}

fn print_scenario(s: &Scenario) {
    let requires = if s.requires.is_empty() {
        "-".to_string()
    } else {
        s.requires
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };
    println!("{:>2}  {:<40} requires={requires}", s.order, s.name());
    println!("    {}", s.description);
}

fn suite_config(args: &RunArgs) -> anyhow::Result<SuiteConfig> {
    let options = SuiteOptions {
        base_url: args.base_url.clone(),
        port: args.port,
        base_path: args.base_path.clone(),
        credentials: Credentials {
            email: args.email.clone(),
            password: args.password.clone(),
        },
        max_response_time: args.max_response_time,
        request_timeout: (!args.request_timeout.is_zero()).then_some(args.request_timeout),
    };

    SuiteConfig::from_options(options).context("invalid suite configuration")
}

async fn write_report(path: &Path, report: &SuiteReport) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(report).context("failed to serialize report")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create report dir: {}", parent.display()))?;
    }
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("failed to write report: {}", path.display()))
}
