use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::conversation::ManagerType;
use crate::core::temperature::Temperature;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_INPUT_MAX_HEIGHT: u16 = 6;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the coaching API, e.g. "https://coach.example.com/api"
    pub api_base_url: Option<String>,
    /// Persona used when a new conversation is started without one
    pub default_manager_type: Option<ManagerType>,
    /// Sampling temperature sent with each message (0.00 to 1.00)
    pub temperature: Option<Temperature>,
    /// Store the auth token in the system keyring
    pub use_keyring: Option<bool>,
    /// Write diagnostics to this file
    pub log_file: Option<String>,
    /// Tallest the message input may grow, in rows
    pub input_max_height: Option<u16>,
}

impl Config {
    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn default_manager_type(&self) -> ManagerType {
        self.default_manager_type.unwrap_or_default()
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature.unwrap_or_default()
    }

    pub fn use_keyring(&self) -> bool {
        self.use_keyring.unwrap_or(true)
    }

    pub fn input_max_height(&self) -> u16 {
        self.input_max_height
            .unwrap_or(DEFAULT_INPUT_MAX_HEIGHT)
            .max(1)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
