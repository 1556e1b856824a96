use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

/// Installs the stderr subscriber.
///
/// The filter comes from `--log-level` (or `LEDGERCHECK_LOG`), then `RUST_LOG`, then `warn`.
pub fn init(log_level: Option<&str>) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = resolve_directive(log_level, rust_log.as_deref());

    let filter = EnvFilter::try_new(directive)
        .map_err(|err| anyhow::anyhow!("invalid log filter `{directive}`: {err}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))
}

fn resolve_directive<'a>(log_level: Option<&'a str>, rust_log: Option<&'a str>) -> &'a str {
    let set = |v: &&str| !v.trim().is_empty();
    log_level
        .filter(set)
        .or(rust_log.filter(set))
        .unwrap_or(DEFAULT_DIRECTIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_rust_log() {
        assert_eq!(
            resolve_directive(Some("ledgercheck_core=debug"), Some("error")),
            "ledgercheck_core=debug"
        );
    }

    #[test]
    fn rust_log_applies_without_flag() {
        assert_eq!(resolve_directive(None, Some("info")), "info");
        assert_eq!(resolve_directive(Some(""), Some("info")), "info");
    }

    #[test]
    fn defaults_to_warn() {
        assert_eq!(resolve_directive(None, None), "warn");
        assert_eq!(resolve_directive(None, Some("  ")), "warn");
    }
}
