//! Diagnostics for `fnote`.
//!
//! Everything is written to stderr so that note ids, JSON and HTML printed
//! on stdout can be piped. `FIELDNOTES_LOG` (or `RUST_LOG`) replaces the
//! filter chosen from the command line flags.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "FIELDNOTES_LOG";

/// How much `fnote` reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only; used with `-q` so `add` prints just the new id.
    Quiet,
    /// Saves, deletes and capture failures.
    #[default]
    Normal,
    /// Storage reads and writes, record normalization.
    Verbose,
    /// Everything, including SQL from the store.
    Trace,
}

impl Verbosity {
    /// Maximum level for events from this crate.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directives for this verbosity. Other crates never go past `warn`.
    #[must_use]
    pub fn directives(self) -> String {
        let others = self.level().min(LevelFilter::WARN);
        format!(
            "{},{}={}",
            others.to_string().to_lowercase(),
            env!("CARGO_CRATE_NAME"),
            self.level().to_string().to_lowercase()
        )
    }
}

/// Build the filter: a parseable `directives` override wins, otherwise the
/// flags decide.
#[must_use]
pub fn build_filter(verbosity: Verbosity, directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directives()))
}

fn env_directives() -> Option<String> {
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok()
}

/// Install the stderr subscriber. Later calls are ignored.
pub fn init_logging(verbosity: Verbosity) {
    let filter = build_filter(verbosity, env_directives().as_deref());
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= Verbosity::Verbose)
        .without_time();

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

/// Route warnings to the test harness output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
