//! Logging initialization
//!
//! Console output always, plus a log file when `LOG_FILE_PATH` is set. The
//! level comes from `LOG_LEVEL`.

use anyhow::Result;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

/// Parses a `LOG_LEVEL` value. Unknown values fall back to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" | "critical" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize logger for console and (optionally) file output
///
/// # Arguments
/// * `level` - Value of `LOG_LEVEL`
/// * `log_file_path` - Optional path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already set
pub fn init_logger(level: &str, log_file_path: Option<&str>) -> Result<()> {
    let level = parse_level(level);

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file_path {
        let log_file = File::create(path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;
        loggers.push(WriteLogger::new(level, Config::default(), log_file));
    }

    CombinedLogger::init(loggers).map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    log::info!("Logging configured at level {}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("warning"), LevelFilter::Warn);
        assert_eq!(parse_level("critical"), LevelFilter::Error);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn test_init_logger_with_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weatherbot.log");
        assert!(!path.exists());

        // The file is created before the global logger is installed, so this
        // holds even if another test already set a logger
        let _ = init_logger("info", path.to_str());
        assert!(path.exists());
    }
}
