//! Subscriber setup for the `tracing` events emitted by the `sshdata` crates.
//!
//! Key generation, signing, verification, issuance and release log at
//! `debug`; decoding a certificate with [`VerifyMode::UnsafeNoVerify`]
//! logs at `warn`. No secret material is ever logged.
//!
//! [`VerifyMode::UnsafeNoVerify`]: crate::VerifyMode::UnsafeNoVerify
//!
//! ```no_run
//! use sshdata::logging::{init_logging, LogConfig, LogFormat, LogLevel};
//!
//! // Debug output from sshdata only, warnings from everything else.
//! let config = LogConfig {
//!     level: LogLevel::Debug,
//!     format: LogFormat::Compact,
//!     sshdata_only: true,
//! };
//! init_logging(&config).expect("logging init");
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Targets whose events [`LogConfig::sshdata_only`] selects.
pub const TARGETS: &[&str] = &["sshdata", "sshdata_core", "sshdata_crypto"];

/// Error type for logging initialization failures.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A global subscriber is already installed.
    #[error("failed to initialize logging: {0}")]
    SubscriberInit(String),
    /// The level or filter directive is invalid.
    #[error("invalid log configuration: {0}")]
    InvalidConfig(String),
}

/// Minimum severity of logged events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    #[allow(missing_docs)]
    Trace,
    #[allow(missing_docs)]
    Debug,
    #[allow(missing_docs)]
    #[default]
    Info,
    #[allow(missing_docs)]
    Warn,
    #[allow(missing_docs)]
    Error,
}

impl LogLevel {
    /// The filter directive name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(LogError::InvalidConfig(format!("unknown log level: {other}"))),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
    /// One line per event.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Apply `level` to the sshdata [`TARGETS`] only and keep other crates
    /// at `warn`.
    pub sshdata_only: bool,
}

impl LogConfig {
    /// The `EnvFilter` directive this configuration installs.
    ///
    /// ```
    /// use sshdata::logging::{LogConfig, LogLevel};
    ///
    /// let config = LogConfig { level: LogLevel::Debug, sshdata_only: true, ..LogConfig::default() };
    /// assert_eq!(
    ///     config.filter_directive(),
    ///     "warn,sshdata=debug,sshdata_core=debug,sshdata_crypto=debug"
    /// );
    /// ```
    #[must_use]
    pub fn filter_directive(&self) -> String {
        if !self.sshdata_only {
            return self.level.as_str().to_string();
        }
        let mut directive = LogLevel::Warn.as_str().to_string();
        for target in TARGETS {
            directive.push_str(&format!(",{target}={}", self.level));
        }
        directive
    }
}

/// Install a global tracing subscriber. `RUST_LOG` is not consulted.
///
/// # Errors
///
/// Returns [`LogError::SubscriberInit`] if a global subscriber is already
/// installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(config.filter_directive())
        .map_err(|e| LogError::InvalidConfig(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Pretty => registry.with(fmt_layer::layer().pretty()).try_init(),
        LogFormat::Json => registry.with(fmt_layer::layer().json()).try_init(),
        LogFormat::Compact => registry.with(fmt_layer::layer().compact()).try_init(),
    };
    result.map_err(|e| LogError::SubscriberInit(e.to_string()))
}
