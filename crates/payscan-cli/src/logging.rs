use std::env;
use std::io::{stderr, IsTerminal};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout stays
/// parseable; plain terminals get ANSI text, pipes get JSON lines.
pub fn setup_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    if stderr().is_terminal() {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(stderr)
            .with_ansi(true)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(stderr)
            .with_ansi(false)
            .with_target(true)
            .init();
    }
    tracing::debug!("logging initialized with level {:?}", log_level);
}
