use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// One bar for the whole chain; finished scenarios are printed above it.
///
/// The bar is only drawn once the first scenario reports, so config errors and bootstrap
/// failures never leave a spinner behind.
pub(crate) struct HumanProgress {
    total: u64,
    pb: OnceLock<ProgressBar>,
}

impl HumanProgress {
    pub(crate) fn new(total: u64) -> Self {
        Self {
            total,
            pb: OnceLock::new(),
        }
    }

    pub(crate) fn scenario_done(&self, name: &str, line: String) {
        let pb = self.pb.get_or_init(|| start_bar(self.total));
        pb.suspend(|| println!("{line}"));
        pb.inc(1);
        pb.set_message(format!("last={name}"));
    }

    pub(crate) fn finish(&self) {
        if let Some(pb) = self.pb.get() {
            pb.finish_and_clear();
        }
    }

    #[cfg(test)]
    fn is_started(&self) -> bool {
        self.pb.get().is_some()
    }
}

fn start_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr_with_hz(5));
    pb.set_style(bar_style());
    pb.set_prefix("scenarios");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} {spinner} [ {bar:20.cyan/blue} ] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_created_on_first_scenario() {
        let progress = HumanProgress::new(10);
        assert!(!progress.is_started());
        progress.finish();
        assert!(!progress.is_started());

        progress.scenario_done("create_account", "  1 create_account passed".to_string());
        assert!(progress.is_started());
        assert_eq!(progress.pb.get().map(ProgressBar::position), Some(1));
        progress.finish();
    }
}
