//! Decoupled logging pipeline for the dashboard.
//!
//! Every `log::*` call is routed through [`LogCollector`], which persists it
//! on a background thread and forwards it, without blocking, to a front-end
//! console channel.
//!
//! ```text
//! log::info!() / log_parsed!()
//!     |
//! [LogCollector] (crossbeam unbounded)
//!     |
//! [disk thread] ---> logs/full/<ts>_session.log
//!     |         \--> logs/parsed/<ts>_session.log   (target "parsed" only)
//!     v
//! ui_tx.try_send()   (dropped if the console is full)
//! ```

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DashboardSettings;

/// Log target for high-level status lines
pub const PARSED_TARGET: &str = "parsed";

/// Logging macros for convenient access
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        $crate::log::info!("{}", msg);
    }}
}

#[macro_export]
macro_rules! log_parsed {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        // target="parsed" marks high-level status lines
        $crate::log::info!(target: "parsed", "{}", msg);
    }}
}

enum LogMessage {
    Line(LogLine),
    /// Flush marker; the sender is signalled once everything before it is on disk
    Flush(std::sync::mpsc::Sender<()>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Full,
    Parsed,
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    pub kind: LogKind,
    /// Wall-clock time the line was created (HH:MM:SS.mmm)
    pub timestamp: String,
}

impl LogLine {
    pub fn new(message: String) -> Self {
        LogLine {
            message,
            kind: LogKind::Full,
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn parsed(message: String) -> Self {
        LogLine {
            kind: LogKind::Parsed,
            ..LogLine::new(message)
        }
    }

    fn formatted(&self) -> String {
        format!("[{}] {}\n", self.timestamp, self.message)
    }
}

/// Ensure a log directory exists
pub fn ensure_logs_dir_exists(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("Failed to create logs directory: {}", e))
}

/// Unified logger that handles disk and console dispatch
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    session_path: PathBuf,
    level: LevelFilter,
}

impl LogCollector {
    /// Create the session files under `log_dir` and start the disk thread.
    pub fn new(
        log_dir: PathBuf,
        ui_tx: tokio::sync::mpsc::Sender<LogLine>,
        level: LevelFilter,
    ) -> Result<Self, String> {
        let full_dir = log_dir.join("full");
        let parsed_dir = log_dir.join("parsed");
        ensure_logs_dir_exists(&full_dir)?;
        ensure_logs_dir_exists(&parsed_dir)?;

        let file_name = format!("{}_session.log", Local::now().format("%Y%m%d_%H%M%S"));
        let session_path = full_dir.join(&file_name);
        let mut full_file = open_append(&session_path)?;
        let mut parsed_file = open_append(&parsed_dir.join(&file_name))?;

        let (tx, rx) = unbounded::<LogMessage>();

        // OS thread, not a tokio task: log calls may come from any runtime or none.
        std::thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let formatted = line.formatted();
                        let _ = full_file.write_all(formatted.as_bytes());
                        if line.kind == LogKind::Parsed {
                            let _ = parsed_file.write_all(formatted.as_bytes());
                        }
                        // Disk always wins; the console may drop lines.
                        let _ = ui_tx.try_send(line);
                    }
                    LogMessage::Flush(done) => {
                        let _ = full_file.flush();
                        let _ = parsed_file.flush();
                        let _ = done.send(());
                    }
                }
            }
        });

        Ok(LogCollector {
            tx,
            session_path,
            level,
        })
    }

    /// Path of this session's full log file
    pub fn session_log_path(&self) -> &Path {
        &self.session_path
    }

    /// Send a log line (non-blocking)
    pub fn log_line(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    pub fn log_str(&self, message: impl Into<String>) {
        self.log_line(LogLine::new(message.into()));
    }

    pub fn log_parsed(&self, message: impl Into<String>) {
        self.log_line(LogLine::parsed(message.into()));
    }

    /// Wait until every line sent before this call has been written.
    pub async fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;

        tokio::task::spawn_blocking(move || rx.recv())
            .await
            .map_err(|e| format!("Flush task failed: {}", e))?
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("[{}] {}", record.level(), record.args());
        if record.target() == PARSED_TARGET {
            self.log_parsed(message);
        } else {
            self.log_str(message);
        }
    }

    fn flush(&self) {}
}

fn open_append(path: &Path) -> Result<File, String> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))
}

/// Create the collector for `settings` and install it as the global logger.
///
/// If another logger is already installed the collector is still returned;
/// only explicit `log_line` calls will reach it.
pub fn initialize_logging(
    settings: &DashboardSettings,
    ui_tx: tokio::sync::mpsc::Sender<LogLine>,
) -> Result<Arc<LogCollector>, String> {
    let level = settings.log_level_filter();
    let collector = Arc::new(LogCollector::new(
        PathBuf::from(&settings.log_dir),
        ui_tx,
        level,
    )?);

    match log::set_boxed_logger(Box::new((*collector).clone())) {
        Ok(()) => {
            log::set_max_level(level);
            log::info!(
                "[Log] Logging initialized at {} -> {}",
                level,
                collector.session_log_path().display()
            );
        }
        Err(e) => eprintln!("[Log] WARNING: Failed to set LogCollector as global logger: {}", e),
    }
    Ok(collector)
}
