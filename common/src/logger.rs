use std::sync::OnceLock;

use chrono::{DateTime, Local};

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Diagnostics go to stderr so they never interleave with the board on stdout.
pub struct Logger {
    prefix: Option<String>,
}

impl Logger {
    fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn format_line(&self, timestamp: DateTime<Local>, location: &str, message: &str) -> String {
        let timestamp = timestamp.format("%Y-%m-%d %H:%M:%S");
        match self.prefix {
            Some(ref prefix) => format!("[{}][{}][{}] {}", timestamp, prefix, location, message),
            None => format!("[{}][{}] {}", timestamp, location, message),
        }
    }

    pub fn log(&self, location: &str, message: &str) {
        eprintln!("{}", self.format_line(Local::now(), location, message));
    }
}

/// Returns false if a logger was already installed.
pub fn init_logger(prefix: Option<String>) -> bool {
    LOGGER.set(Logger::new(prefix)).is_ok()
}

/// Lines logged before `init_logger` are dropped, which keeps library code
/// quiet under tests.
pub fn log(location: &str, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.log(location, message);
    }
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::logger::log(
            &format!("{}:{}", file!(), line!()),
            &format!($($arg)*),
        )
    };
}
