//! Logging service - structured event logging to a JSONL file
//!
//! Records events in `logs.jsonl` under the keyline directory. No user data
//! (addresses, amounts, balances) is ever logged; events carry only names,
//! chain/backend labels, and error text.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    // Lower 48 bits of timestamp, upper 16 bits of counter
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Get current unix timestamp in milliseconds
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Watcher,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Watcher => "watcher",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            chain: None,
            backend: None,
            command: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the chain context
    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    /// Set the backend context
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set error details (additional context)
    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub event: String,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
}

/// Service for structured event logging
pub struct LoggingService {
    file_path: PathBuf,
    write_lock: Mutex<()>,
    entry_point: EntryPoint,
    app_version: String,
}

impl LoggingService {
    /// Create a new logging service writing to logs.jsonl in the keyline
    /// directory
    pub fn new(
        keyline_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(keyline_dir)?;
        Ok(Self {
            file_path: keyline_dir.join("logs.jsonl"),
            write_lock: Mutex::new(()),
            entry_point,
            app_version: app_version.into(),
        })
    }

    /// Log an event
    ///
    /// The entry point and app version are added from the service
    /// configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            app_version: self.app_version.clone(),
            event: event.event,
            chain: event.chain,
            backend: event.backend,
            command: event.command,
            error_message: event.error_message,
            error_details: event.error_details,
        };

        let line = serde_json::to_string(&entry)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Log a simple event with just a name
    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    /// Log a CLI command execution
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    /// Log an error
    pub fn log_error(&self, event: &str, message: &str, details: Option<&str>) -> Result<()> {
        let mut log_event = LogEvent::new(event).with_error(message);
        if let Some(d) = details {
            log_event = log_event.with_error_details(d);
        }
        self.log(log_event)
    }

    fn read_all(&self) -> Vec<LogEntry> {
        match std::fs::read_to_string(&self.file_path) {
            Ok(content) => content
                .lines()
                .filter_map(|line| serde_json::from_str(line).ok())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Query recent log entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries = self.read_all();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Query log entries with errors, newest first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries: Vec<LogEntry> = self
            .read_all()
            .into_iter()
            .filter(|e| e.error_message.is_some())
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Get the total number of log entries
    pub fn count(&self) -> Result<u64> {
        Ok(self.read_all().len() as u64)
    }

    /// Delete logs older than the specified timestamp (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let entries = self.read_all();
        let kept: Vec<&LogEntry> = entries
            .iter()
            .filter(|e| e.timestamp >= timestamp_ms)
            .collect();
        let deleted = (entries.len() - kept.len()) as u64;

        let mut content = String::new();
        for entry in &kept {
            content.push_str(&serde_json::to_string(entry)?);
            content.push('\n');
        }
        std::fs::write(&self.file_path, content)?;
        Ok(deleted)
    }

    /// Get the path to the log file
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_event() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log_event("test_event").unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "test_event");
        assert_eq!(entries[0].entry_point, "cli");
        assert_eq!(entries[0].app_version, "1.0.0");
    }

    #[test]
    fn test_log_with_context() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Watcher, "2.0.0").unwrap();

        service
            .log(
                LogEvent::new("transfer_submitted")
                    .with_chain("polygonAmoy")
                    .with_backend("relayer"),
            )
            .unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "transfer_submitted");
        assert_eq!(entries[0].chain, Some("polygonAmoy".to_string()));
        assert_eq!(entries[0].backend, Some("relayer".to_string()));
        assert_eq!(entries[0].entry_point, "watcher");
    }

    #[test]
    fn test_log_error() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service
            .log_error("balance_refresh_failed", "Connection timeout", Some("rpc"))
            .unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "balance_refresh_failed");
        assert_eq!(
            errors[0].error_message,
            Some("Connection timeout".to_string())
        );
    }

    #[test]
    fn test_count_and_delete() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log_event("event1").unwrap();
        service.log_event("event2").unwrap();
        service.log_event("event3").unwrap();

        assert_eq!(service.count().unwrap(), 3);

        let deleted = service.delete_before(now_ms() + 1000).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log_event("good").unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(service.file_path())
            .and_then(|mut f| writeln!(f, "{{broken"))
            .unwrap();
        service.log_event("also_good").unwrap();

        assert_eq!(service.count().unwrap(), 2);
    }
}
