//! Tracing subscriber setup.
//!
//! Targets: "quiz" (session/grading), "game" (prompt guessing), "quizbench" (startup, wiring).

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LogSettings, DEFAULT_LOG_FILTER};

/// Install the global subscriber. An unparsable filter falls back to the default
/// and is reported once the subscriber is up.
pub fn init_tracing(settings: &LogSettings) {
    let (filter, rejected) = match EnvFilter::try_new(&settings.filter) {
        Ok(f) => (f, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match settings.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    if let Some(e) = rejected {
        tracing::warn!(target: "quizbench", filter = %settings.filter, error = %e, "Invalid LOG_LEVEL; using the default filter");
    }
}
