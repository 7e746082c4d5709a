//! Diagnostic logging setup.
//!
//! The chat screen owns the terminal, so while it runs logs can only go to a
//! file. One-shot commands may log to stderr instead.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "huddle=info";
pub const LOG_FILE_ENV: &str = "HUDDLE_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    Disabled,
}

impl LogTarget {
    /// `--log` wins over `HUDDLE_LOG`, which wins over the config file. With
    /// none of them set, interactive sessions log nowhere.
    pub fn resolve(
        cli_log: Option<&str>,
        env_log: Option<&str>,
        config_log: Option<&str>,
        interactive: bool,
    ) -> Self {
        let chosen = [cli_log, env_log, config_log]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|path| !path.is_empty());
        match chosen {
            Some(path) => LogTarget::File(PathBuf::from(path)),
            None if interactive => LogTarget::Disabled,
            None => LogTarget::Stderr,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Calling it twice is harmless; the first
/// subscriber stays.
pub fn init(target: &LogTarget) -> Result<(), Box<dyn Error>> {
    match target {
        LogTarget::Disabled => Ok(()),
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
            Ok(())
        }
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
            Ok(())
        }
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File, Box<dyn Error>> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_takes_precedence() {
        assert_eq!(
            LogTarget::resolve(Some("cli.log"), Some("env.log"), Some("cfg.log"), true),
            LogTarget::File(PathBuf::from("cli.log"))
        );
        assert_eq!(
            LogTarget::resolve(None, Some(" "), Some("cfg.log"), true),
            LogTarget::File(PathBuf::from("cfg.log"))
        );
    }

    #[test]
    fn interactive_sessions_without_a_file_are_silent() {
        assert_eq!(LogTarget::resolve(None, None, None, true), LogTarget::Disabled);
        assert_eq!(LogTarget::resolve(None, None, None, false), LogTarget::Stderr);
    }

    #[test]
    fn log_file_is_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("huddle.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
