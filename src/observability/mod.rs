//! HTTP trace logging.
//!
//! When `--trace` is set, every request and response the API client makes is
//! appended to a log file so a failing invocation can be reconstructed after
//! the fact.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends timestamped trace lines to a log file.
#[derive(Debug, Clone)]
pub struct TraceLogger {
    log_file: PathBuf,
}

impl TraceLogger {
    /// Initialize the trace logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to the log file. If None, creates a timestamped
    ///   file in the temp directory.
    pub fn new(log_file: Option<&Path>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let mut dir = std::env::temp_dir();
                dir.push("nimbusctl-logs");
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create log directory: {}", dir.display()))?;
                let filename = format!(
                    "trace_{}_{}.log",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory: {}", parent.display()))?;
        }

        Ok(Self { log_file })
    }

    /// Path of the file trace lines are appended to.
    pub fn path(&self) -> &Path {
        &self.log_file
    }

    /// Record an outgoing request.
    pub fn request(&self, method: &str, url: &str) {
        self.append(&format!("--> {} {}", method, url));
    }

    /// Record a response status for a request.
    pub fn response(&self, status: u16, url: &str) {
        self.append(&format!("<-- {} {}", status, url));
    }

    /// Record a transport-level failure.
    pub fn error(&self, message: &str) {
        self.append(&format!("ERR {}", message));
    }

    // Trace logging must never turn a working command into a failing one, so
    // write errors only warn.
    fn append(&self, line: &str) {
        let entry = format!("{} {}\n", Utc::now().to_rfc3339(), line);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .and_then(|mut f| f.write_all(entry.as_bytes()));

        if let Err(e) = result {
            eprintln!("Warning: failed to write trace log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_request_and_response_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");

        let logger = TraceLogger::new(Some(&path)).unwrap();
        logger.request("GET", "https://api.example.com/v2/servers");
        logger.response(200, "https://api.example.com/v2/servers");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("--> GET https://api.example.com/v2/servers"));
        assert!(contents.contains("<-- 200"));
        assert_eq!(contents.lines().count(), 2);
    }
}
