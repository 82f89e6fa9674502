use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var that overrides `--log-level`, e.g. `BOMCHECK_LOG=bomcheck_recon=debug`.
pub const LOG_ENV: &str = "BOMCHECK_LOG";

/// Install the stderr subscriber. `log` records from the engine and IO
/// crates are bridged in by tracing-subscriber's `tracing-log` feature.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
