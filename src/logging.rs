//! Subscriber setup for hosts that don't install their own.
//!
//! The library only emits `tracing` events: data warnings at `warn`, lifecycle changes at
//! `debug`, text changes at `trace`. Filtering is read from `CAPTIONS_LOG`
//! (e.g. `CAPTIONS_LOG=captions=debug`) and defaults to `warn`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// How log events are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log collectors.
    #[default]
    Json,
    /// Compact single-line text, for terminals.
    Compact,
}

/// Install a global subscriber writing to stderr.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_env_var("CAPTIONS_LOG")
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => registry.with(fmt.json().with_current_span(true)).try_init(),
        LogFormat::Compact => registry.with(fmt.compact()).try_init(),
    };
}
