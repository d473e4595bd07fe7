//! Logging system initialization
//!
//! Sets up `tracing` from the `[logging]` config section: stdout, a plain
//! append-only file, or daily rolling files, in text or JSON format.

use crate::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

const DEFAULT_LOG_NAME: &str = "kpi-ledger.log";

/// Initialize logging system based on configuration
///
/// **Note**: call once at startup. The returned `WorkerGuard` must stay
/// alive for the whole program so buffered lines get flushed.
///
/// A log file that cannot be opened falls back to stdout.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    let (writer, to_console) = build_writer(config);

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(to_console);

    // 重复初始化（例如测试中）时忽略错误
    let _ = if config.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };

    guard
}

fn build_writer(config: &LoggingConfig) -> (Box<dyn std::io::Write + Send + Sync>, bool) {
    let Some(log_file) = config.file.as_deref().filter(|f| !f.is_empty()) else {
        return (Box::new(std::io::stdout()), true);
    };

    if config.enable_rotation {
        let path = std::path::Path::new(log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(std::path::Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_NAME);
        match rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups.max(1) as usize)
            .build(dir)
        {
            Ok(appender) => (Box::new(appender), false),
            Err(e) => {
                eprintln!("[WARN] Failed to create rolling log appender: {}", e);
                (Box::new(std::io::stdout()), true)
            }
        }
    } else {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
        {
            Ok(file) => (Box::new(file), false),
            Err(e) => {
                eprintln!("[WARN] Failed to open log file {}: {}", log_file, e);
                (Box::new(std::io::stdout()), true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_writer_when_no_file() {
        let config = LoggingConfig::default();
        let (_, to_console) = build_writer(&config);
        assert!(to_console);
    }

    #[test]
    fn test_plain_file_writer() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ledger.log");
        let config = LoggingConfig {
            file: Some(path.to_string_lossy().to_string()),
            enable_rotation: false,
            ..Default::default()
        };
        let (_, to_console) = build_writer(&config);
        assert!(!to_console);
        assert!(path.exists());
    }
}
