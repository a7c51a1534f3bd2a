//! Telemetry and tracing utilities
//!
//! Initializes the `tracing` subscriber used by the `misty` binary. Library
//! code only emits events; installing a subscriber is up to the application.
//!
//! ## Example
//!
//! ```rust,no_run
//! use misty_client::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! # Ok::<(), misty_client::MistyError>(())
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::MistyError;

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

impl FromStr for OutputFormat {
    type Err = MistyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            other => Err(MistyError::InvalidInput(format!(
                "Invalid log format: {other}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Parse a level name (trace, debug, info, warn, error).
pub fn parse_level(level: &str) -> Result<tracing::Level, MistyError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(MistyError::InvalidInput(format!(
            "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
        ))),
    }
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to stderr
    pub enable_console: bool,
    /// Write to this file instead of the console
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            enable_console: true,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// Filter directives for this crate and the binary.
    fn filter(&self) -> String {
        let level = self.log_level.as_str().to_lowercase();
        format!("misty_client={level},misty={level}")
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    enable_console: Option<bool>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn log_level_str(mut self, level: &str) -> Result<Self, MistyError> {
        self.log_level = Some(parse_level(level)?);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.enable_console = Some(enable);
        self
    }

    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            enable_console: self.enable_console.unwrap_or(true),
            log_file: self.log_file,
        }
    }
}

/// Initialize the global subscriber.
///
/// Returns the non-blocking writer's guard; keep it alive for the duration of
/// the program so buffered lines are flushed. An already-installed subscriber
/// is not an error and yields `None`.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, MistyError> {
    let filter = EnvFilter::try_new(config.filter())
        .map_err(|e| MistyError::InvalidInput(format!("invalid log filter: {e}")))?;

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path.file_name().ok_or_else(|| {
                MistyError::InvalidInput(format!("log file {} has no file name", path.display()))
            })?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (writer, Some(guard))
        }
        None if config.enable_console => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, Some(guard))
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::sink());
            (writer, Some(guard))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);
    let init_result = match config.output_format {
        OutputFormat::Json => builder.json().try_init(),
        OutputFormat::JsonCompact => builder.json().flatten_event(true).try_init(),
        OutputFormat::Text => builder.try_init(),
    };

    match init_result {
        Ok(()) => Ok(guard),
        Err(e) => {
            // Either the dispatcher or the `log` bridge was installed earlier.
            if e.to_string().contains("already") {
                Ok(None)
            } else {
                Err(MistyError::InvalidInput(format!(
                    "Failed to initialize tracing: {e}"
                )))
            }
        }
    }
}

/// Initialize from `MISTY_LOG_LEVEL`, `MISTY_LOG_FORMAT` and `MISTY_LOG_FILE`.
pub fn init_from_env() -> Result<Option<WorkerGuard>, MistyError> {
    init_subscriber(config_from_env(SubscriberConfig::builder())?)
}

/// Apply the `MISTY_LOG_*` variables on top of `builder`.
pub fn config_from_env(
    mut builder: SubscriberConfigBuilder,
) -> Result<SubscriberConfig, MistyError> {
    if let Ok(level) = std::env::var("MISTY_LOG_LEVEL") {
        builder = builder.log_level_str(&level)?;
    }
    if let Ok(format) = std::env::var("MISTY_LOG_FORMAT") {
        builder = builder.output_format(format.parse()?);
    }
    if let Ok(file_path) = std::env::var("MISTY_LOG_FILE") {
        builder = builder.log_file(PathBuf::from(file_path));
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_and_formats() {
        assert_eq!(parse_level("DEBUG").unwrap(), tracing::Level::DEBUG);
        assert!(parse_level("verbose").is_err());
        assert_eq!("json-compact".parse::<OutputFormat>().unwrap(), OutputFormat::JsonCompact);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn filter_covers_library_and_binary() {
        let config = SubscriberConfig::debug();
        assert_eq!(config.filter(), "misty_client=debug,misty=debug");
    }

    #[test]
    fn builder_defaults() {
        let config = SubscriberConfig::builder().build();
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert_eq!(config.output_format, OutputFormat::Text);
        assert!(config.enable_console);
        assert!(config.log_file.is_none());
    }
}
