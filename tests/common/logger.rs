//! Per-test phase logging.
#![allow(dead_code)]
//!
//! Prints `[test] phase: message` lines to stderr (shown only for failing
//! tests) so a failure shows how far the test got.
//!
//! - `TEST_LOG_LEVEL` - minimum level: debug, info, warn (default: info)

use std::env;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

fn min_level() -> LogLevel {
    static MIN_LEVEL: OnceLock<LogLevel> = OnceLock::new();
    *MIN_LEVEL.get_or_init(|| {
        match env::var("TEST_LOG_LEVEL")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "debug" | "trace" => LogLevel::Debug,
            "warn" | "error" => LogLevel::Warn,
            _ => LogLevel::Info,
        }
    })
}

/// Logger for one test function.
pub struct TestLogger {
    test_name: String,
    start_time: Instant,
    current_phase: Mutex<String>,
}

impl TestLogger {
    #[must_use]
    pub fn new(test_name: &str) -> Self {
        let logger = Self {
            test_name: test_name.to_string(),
            start_time: Instant::now(),
            current_phase: Mutex::new("init".to_string()),
        };
        logger.log(LogLevel::Info, "Test starting");
        logger
    }

    /// Set the current phase: "setup", "execute", "verify".
    pub fn phase(&self, phase: &str) {
        if let Ok(mut current) = self.current_phase.lock() {
            *current = phase.to_string();
        }
        self.log(LogLevel::Debug, &format!("Phase: {phase}"));
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Log an outbound HTTP request.
    pub fn http_request(&self, method: &str, url: &str) {
        self.debug(&format!("HTTP {method} {url}"));
    }

    pub fn finish_ok(&self) {
        let duration_ms = self.start_time.elapsed().as_millis();
        self.log(
            LogLevel::Info,
            &format!("Test passed (duration: {duration_ms}ms)"),
        );
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level < min_level() {
            return;
        }
        let phase = self
            .current_phase
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default();
        eprintln!("[{}] {:?} {phase}: {message}", self.test_name, level);
    }
}
