//! Process-wide log output for the populate binary.

use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

use crate::util::env::{env_flag, env_opt};

/// Default filter when `RUST_LOG` is unset: crate progress at info, HTTP noise off.
pub const DEFAULT_FILTER: &str = "info,catalog_populate=info,reqwest=warn,hyper=warn";

/// How log lines are rendered.
///
/// Env:
/// - `RUST_LOG` replaces the default filter
/// - `POPULATE_LOG_SOURCE` adds file and line to each event (default off)
/// - `NO_COLOR` disables ANSI colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub filter: String,
    pub source_locations: bool,
    pub ansi: bool,
}

impl LogOptions {
    pub fn new(default_filter: &str) -> Self {
        Self {
            filter: default_filter.to_string(),
            source_locations: false,
            ansi: true,
        }
    }

    pub fn from_env(default_filter: &str) -> Self {
        Self {
            filter: env_opt("RUST_LOG").unwrap_or_else(|| default_filter.to_string()),
            source_locations: env_flag("POPULATE_LOG_SOURCE", false),
            ansi: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Parsed filter; an unparsable directive string falls back to [`DEFAULT_FILTER`].
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Installs the global fmt subscriber described by `options`.
pub fn init_tracing(options: &LogOptions) -> Result<(), anyhow::Error> {
    SubscriberBuilder::default()
        .with_env_filter(options.env_filter())
        .with_target(true)
        .with_file(options.source_locations)
        .with_line_number(options.source_locations)
        .with_ansi(options.ansi)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}
