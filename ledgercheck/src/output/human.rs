use std::sync::Arc;

mod format;
mod progress;
mod summary;

use format::scenario_line;
use progress::HumanProgress;
use summary::render;

use ledgercheck_core::ScenarioReport;

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new(ledgercheck_core::SCENARIOS.len() as u64)),
        }
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, config: &ledgercheck_core::SuiteConfig) {
        println!("target: {}", config.base_url());
        println!(
            "scenarios: {} max_response_time={}ms",
            ledgercheck_core::SCENARIOS.len(),
            config.max_response_time.as_millis()
        );
        println!();
    }

    fn progress(&self) -> Option<ledgercheck_core::ProgressFn> {
        let progress = self.progress.clone();
        Some(Arc::new(move |report: &ScenarioReport| {
            progress.scenario_done(report.name, scenario_line(report));
        }))
    }

    fn print_summary(&self, report: &ledgercheck_core::SuiteReport) -> anyhow::Result<()> {
        self.progress.finish();
        print!("{}", render(report));
        Ok(())
    }
}
