use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use ledgercheck_core::config;

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 4s, 250ms, 1m)".to_string());
    }
    humantime::parse_duration(s)
        .map_err(|err| format!("invalid duration '{s}': {err} (expected e.g. 4s, 250ms, 1m)"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable progress and summary.
    HumanReadable,
    /// Emit one JSON line per scenario plus a summary line (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "ledgercheck",
    author,
    version,
    about = "Ordered contract checks for the ledger REST API",
    long_about = "ledgercheck signs in to a ledger REST API, resets its state and then runs a fixed chain of dependent scenarios (accounts, movements, balance, auth).\n\nEach scenario is checked for status, body shape and response time. A scenario whose inputs were never produced by an earlier one is reported as blocked.",
    after_help = "Examples:\n  ledgercheck run\n  ledgercheck run --base-url http://127.0.0.1:8080 --output json\n  ledgercheck run --max-response-time 2s --report-out report.json\n  ledgercheck scenarios\n  ledgercheck scenarios compute_balance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the scenario chain against a server
    Run(RunArgs),

    /// List the scenarios in execution order
    Scenarios(ScenariosArgs),
}

#[derive(Debug, Args)]
pub struct ScenariosArgs {
    /// Show only this scenario (e.g. compute_balance)
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Base URL of the API
    #[arg(long, env = "LEDGERCHECK_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Override the port of the base URL
    #[arg(long, env = "LEDGERCHECK_PORT")]
    pub port: Option<u16>,

    /// Path prefix appended to the base URL
    #[arg(long, env = "LEDGERCHECK_BASE_PATH", default_value = config::DEFAULT_BASE_PATH)]
    pub base_path: String,

    /// Login email
    #[arg(long, env = "LEDGERCHECK_EMAIL", default_value = config::DEFAULT_EMAIL)]
    pub email: String,

    /// Login password
    #[arg(
        long,
        env = "LEDGERCHECK_PASSWORD",
        default_value = config::DEFAULT_PASSWORD,
        hide_env_values = true
    )]
    pub password: String,

    /// Maximum response time for every request (e.g. 4s, 500ms)
    #[arg(
        long,
        env = "LEDGERCHECK_MAX_RESPONSE_TIME",
        default_value = "4s",
        value_parser = parse_duration
    )]
    pub max_response_time: Duration,

    /// Transport timeout per request; a timed out request marks its scenario as errored
    #[arg(
        long,
        env = "LEDGERCHECK_REQUEST_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration
    )]
    pub request_timeout: Duration,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,

    /// Write the full JSON report to this file
    #[arg(long, value_name = "PATH")]
    pub report_out: Option<PathBuf>,

    /// Log filter directive (e.g. warn, ledgercheck_core=debug); takes precedence over
    /// RUST_LOG, and defaults to warn when neither is set
    #[arg(long, env = "LEDGERCHECK_LOG")]
    pub log_level: Option<String>,
}
