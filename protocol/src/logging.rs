//! # Structured Logging
//!
//! The library itself only emits `tracing` events; it never installs a
//! subscriber behind your back. Binaries, tests and the demo call
//! [`init_logging`] once to get output.
//!
//! Log output goes to stderr so that stdout stays clean for whatever the
//! host program prints (signed transactions piped into another tool, say).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "steem_protocol=info";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Colored multi-line output for a terminal.
    #[default]
    Pretty,
    /// Machine-parseable JSON lines.
    Json,
}

impl LogFormat {
    /// Reads a `LOG_FORMAT`-style value. Anything other than `json`, in
    /// any case, means `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_level` when set, using `EnvFilter`
/// directive syntax:
///
/// ```text
/// RUST_LOG=steem_protocol::transaction=debug,steem_protocol::memo=trace
/// ```
///
/// # Errors
///
/// [`Error::Config`] if a global subscriber is already installed.
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init(),
    };
    installed.map_err(|e| Error::Config(format!("logging already initialized: {e}")))?;

    tracing::debug!(?format, "log subscriber installed");
    Ok(())
}
