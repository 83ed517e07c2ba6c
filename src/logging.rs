//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays free for streamed answers.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `level`.
///
/// Calling this twice is harmless: the second call leaves the first
/// subscriber in place and returns `false`.
pub fn init_logging(level: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

/// Level used by the binary for a given `--verbose` setting.
pub fn level_for(verbose: bool) -> &'static str {
    if verbose {
        "chatflow_client=debug,chatflow=debug,warn"
    } else {
        "warn"
    }
}
