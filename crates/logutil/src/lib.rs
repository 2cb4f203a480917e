//! Utilities for logging.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<Verbosity> for LevelFilter {
    fn from(value: Verbosity) -> Self {
        match value {
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    #[default]
    Compact,
    Json,
}

/// Initialize a global subscriber.
///
/// `RUST_LOG` takes precedence over the provided verbosity. Does nothing if a
/// subscriber has already been installed.
pub fn init(verbosity: Verbosity, mode: LoggingMode) {
    let level: LevelFilter = verbosity.into();
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = FmtSubscriber::builder().with_env_filter(env_filter);
    let _ = match mode {
        LoggingMode::Json => builder.json().try_init(),
        LoggingMode::Compact => builder.compact().try_init(),
    };
}

/// Initialize logging for tests.
///
/// Output goes through the test writer so it's only shown for failing tests.
/// Safe to call from every test.
pub fn init_test() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy();

    let _ = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
