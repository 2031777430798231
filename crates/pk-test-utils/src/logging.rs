// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-test log files

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TestLogError {
    #[error("test log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write to test log file: {path}")]
    WriteError { path: PathBuf },

    #[error("invalid test name: {name}")]
    InvalidTestName { name: String },
}

/// Log file for a single test
///
/// Besides explicit [`TestLogger::log`] lines, [`TestLogger::capture_tracing`]
/// routes `tracing` events of the current thread into the same file, so the
/// session's own `debug!` transitions end up next to the test's notes.
pub struct TestLogger {
    log_path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
    test_name: String,
    start_time: DateTime<Utc>,
}

impl TestLogger {
    pub fn new(test_name: &str) -> Result<Self, TestLogError> {
        validate_test_name(test_name)?;

        let log_path = create_unique_test_log(test_name)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_path)?;

        let logger = Self {
            log_path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
            test_name: test_name.to_string(),
            start_time: Utc::now(),
        };
        logger.write_header()?;
        Ok(logger)
    }

    pub fn log(&self, message: &str) -> Result<(), TestLogError> {
        let timestamp = Utc::now().format("%H:%M:%S%.3f");
        self.write_line(&format!("[{}] {}", timestamp, message))
    }

    pub fn log_json<T: serde::Serialize>(&self, label: &str, data: &T) -> Result<(), TestLogError> {
        let json = serde_json::to_string_pretty(data).map_err(|_| self.write_error())?;
        self.log(&format!("{}: {}", label, json))
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Send `tracing` output of the current thread to this log until the guard drops
    pub fn capture_tracing(&self) -> tracing::subscriber::DefaultGuard {
        let sink = LogSink(self.writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn finish_success(self) -> Result<PathBuf, TestLogError> {
        let elapsed = self.elapsed_secs();
        self.log(&format!("Test completed successfully in {:.3}s", elapsed))?;
        self.flush()?;
        Ok(self.log_path)
    }

    /// Record the failure and print where the full log lives
    pub fn finish_failure(self, error_message: &str) -> Result<PathBuf, TestLogError> {
        let elapsed = self.elapsed_secs();
        self.log(&format!("Test failed after {:.3}s: {}", elapsed, error_message))?;
        self.flush()?;

        match fs::metadata(&self.log_path) {
            Ok(metadata) => println!(
                "{} failed - Log: {} ({} bytes)",
                self.test_name,
                self.log_path.display(),
                metadata.len()
            ),
            Err(_) => println!("{} failed - Log: {}", self.test_name, self.log_path.display()),
        }
        Ok(self.log_path)
    }

    fn elapsed_secs(&self) -> f64 {
        Utc::now().signed_duration_since(self.start_time).num_milliseconds() as f64 / 1000.0
    }

    fn write_header(&self) -> Result<(), TestLogError> {
        self.write_line("=== patternkeep test log ===")?;
        self.write_line(&format!("Test: {}", self.test_name))?;
        self.write_line(&format!(
            "Started: {}",
            self.start_time.format("%Y-%m-%d %H:%M:%S UTC")
        ))?;
        self.write_line(&format!("Process: {}", std::process::id()))?;
        self.write_line("")
    }

    fn write_line(&self, line: &str) -> Result<(), TestLogError> {
        let mut writer = self.writer.lock().map_err(|_| self.write_error())?;
        writeln!(writer, "{}", line).map_err(|_| self.write_error())?;
        writer.flush().map_err(|_| self.write_error())
    }

    fn flush(&self) -> Result<(), TestLogError> {
        let mut writer = self.writer.lock().map_err(|_| self.write_error())?;
        writer.flush().map_err(|_| self.write_error())
    }

    fn write_error(&self) -> TestLogError {
        TestLogError::WriteError {
            path: self.log_path.clone(),
        }
    }
}

#[derive(Clone)]
struct LogSink(Arc<Mutex<BufWriter<File>>>);

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut writer) => writer.write(buf),
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut writer) => writer.flush(),
            Err(_) => Ok(()),
        }
    }
}

/// Unique path under `<workspace>/target/test-logs/<date>/`
pub fn create_unique_test_log(test_name: &str) -> Result<PathBuf, TestLogError> {
    let now = Utc::now();
    let log_dir = find_workspace_root()
        .join("target")
        .join("test-logs")
        .join(now.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&log_dir)?;

    let filename = format!(
        "{}-{}-{}.log",
        sanitize_filename(test_name),
        now.format("%H-%M-%S"),
        Uuid::new_v4()
    );
    Ok(log_dir.join(filename))
}

fn find_workspace_root() -> PathBuf {
    let current_dir = env::current_dir().unwrap_or_else(|_| env::temp_dir());
    current_dir
        .ancestors()
        .find(|dir| {
            fs::read_to_string(dir.join("Cargo.toml"))
                .map(|content| content.contains("[workspace]"))
                .unwrap_or(false)
        })
        .map(Path::to_path_buf)
        .unwrap_or(current_dir)
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

fn validate_test_name(name: &str) -> Result<(), TestLogError> {
    if name.is_empty() || name.len() > 200 {
        return Err(TestLogError::InvalidTestName {
            name: name.chars().take(40).collect(),
        });
    }
    Ok(())
}
