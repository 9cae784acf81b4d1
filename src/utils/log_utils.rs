//! Logging setup for the application

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log levels for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Normal execution, no verbose flag
    Normal = 0,
    /// Info level, one verbose flag (-v)
    Info = 1,
    /// Debug level, two verbose flags (-v -v)
    Debug = 2,
}

impl LogLevel {
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => LogLevel::Normal,
            1 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Normal => "warn",
            LogLevel::Info => "medupload=info,warn",
            LogLevel::Debug => "medupload=debug,info",
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity count.
///
/// Logs go to stderr so stdout only carries URLs.
pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let level = LogLevel::from_verbosity(verbosity);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    tracing::debug!(?level, "logging initialized");
    Ok(())
}
