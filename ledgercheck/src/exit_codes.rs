#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// A scenario did not pass, or a bootstrap request exceeded the response time budget.
    ScenariosFailed = 10,

    /// Sign-in or reset failed; no scenario ran.
    BootstrapFailed = 20,

    /// Invalid CLI/config/options (bad flags, invalid durations, bad base url, etc.).
    InvalidInput = 30,

    /// Internal/runtime error (IO errors writing reports, runtime setup, etc.).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_report(report: &ledgercheck_core::SuiteReport) -> Self {
        if report.is_success() {
            Self::Success
        } else {
            Self::ScenariosFailed
        }
    }
}
