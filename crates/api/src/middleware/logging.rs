//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level. Production emits JSON lines,
//! development a multi-line pretty format.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Output format selected by `logging.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Unknown values fall back to pretty output.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Safe to call once per process.
pub fn init_logging(config: &LoggingConfig) {
    let subscriber = tracing_subscriber::registry().with(build_filter(&config.level));

    let result = match LogFormat::parse(&config.format) {
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Compact => subscriber
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialised: {}", e);
    }
}
