//! Tracing setup.
//!
//! Stdout belongs to the JSONL event stream read by the host process, so
//! every log line, plain or JSON, goes to stderr. `RUST_LOG` takes
//! precedence over the configured level.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber described by `config`.
///
/// A subscriber installed earlier (by a test harness or an embedding host)
/// stays in place.
pub fn init_logging(config: &LoggingConfig) {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(level_filter(&config.level))
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(
            builder
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };
    installed.ok();
}

/// `RUST_LOG` if set and valid, else the configured level, else `info`.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
