/// Structured logging for the water-level anomaly service
///
/// Provides context-rich logging with region/site identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for scheduled runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Usgs,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Usgs => write!(f, "USGS"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Unexpected failure - service degradation or an API format change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, source: &DataSource, context: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let context_part = context.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, source, context_part, message)
    }

    /// Log a message with the global logger
    fn log(&self, level: LogLevel, source: &DataSource, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, source, context, message);
        let context_part = context.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output goes to stderr so a JSON report on stdout stays clean
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, context_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, context_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, source: DataSource, context: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &source, context, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, source, context, message);
}

/// Log a warning message
pub fn warn(source: DataSource, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, source, context, message);
}

/// Log an error message
pub fn error(source: DataSource, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, source, context, message);
}

/// Log a debug message
pub fn debug(source: DataSource, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, source, context, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a region fetch/parse failure from its error message
pub fn classify_usgs_failure(_region: &str, error_message: &str) -> FailureType {
    // Server-side errors and unreachable hosts point at the service
    if error_message.contains("HTTP error") || error_message.contains("Request failed") {
        FailureType::Unexpected
    }
    // A body we cannot read means the API changed or returned an error page
    else if error_message.contains("Parse error") || error_message.contains("Data format error") {
        FailureType::Unexpected
    }
    // Bad values (e.g. "Ice", "Eqp") are usually sensor-side and transient
    else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a region failure with automatic classification
pub fn log_usgs_failure(region: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_usgs_failure(region, &error_msg);

    let message = format!(
        "{} failed [{}]: {}",
        operation,
        failure_type,
        error_msg
    );

    match failure_type {
        FailureType::Unexpected => error(DataSource::Usgs, Some(region), &message),
        FailureType::Unknown => warn(DataSource::Usgs, Some(region), &message),
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a multi-region fetch
pub fn log_fetch_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Fetch complete: {}/{} regions successful, {} failed",
        successful,
        total,
        failed
    );

    if failed == 0 {
        info(DataSource::Usgs, None, &message);
    } else if successful == 0 {
        error(DataSource::Usgs, None, &message);
    } else {
        warn(DataSource::Usgs, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NwisError;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let http = NwisError::HttpError { region: "tx".to_string(), status: 500 };
        assert_eq!(classify_usgs_failure("tx", &http.to_string()), FailureType::Unexpected);

        let format = NwisError::DataFormat { path: "value".to_string() };
        assert_eq!(classify_usgs_failure("tx", &format.to_string()), FailureType::Unexpected);

        let value = NwisError::ValueParse {
            site_id: "08158000".to_string(),
            timestamp: "2024-01-01T00:00:00".to_string(),
            raw: "Ice".to_string(),
        };
        assert_eq!(classify_usgs_failure("tx", &value.to_string()), FailureType::Unknown);
    }

    #[test]
    fn test_entry_includes_level_source_and_context() {
        let entry = Logger::format_entry(LogLevel::Warning, &DataSource::Usgs, Some("ok"), "slow");
        assert!(entry.ends_with("WARN USGS [ok]: slow"), "got '{}'", entry);
    }
}
