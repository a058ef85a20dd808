#![forbid(unsafe_code)]

//! Logging bootstrap for hosts embedding swipebox.
//!
//! The library itself only emits `tracing` events and spans. Hosts that do
//! not already install a subscriber can call [`init`] once at startup.
//! Filtering follows `RUST_LOG` and falls back to `info`; set
//! `SWIPEBOX_LOG_FORMAT=json` for newline-delimited JSON output.

use tracing_subscriber::EnvFilter;

/// Output format for [`init_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Read `SWIPEBOX_LOG_FORMAT` (`json` selects [`LogFormat::Json`]).
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("SWIPEBOX_LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install a global subscriber using the format from the environment.
///
/// Returns `false` if a global subscriber was already set.
pub fn init() -> bool {
    init_with(LogFormat::from_env())
}

/// Install a global subscriber with an explicit format.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_with(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
