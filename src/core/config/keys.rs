//! Keys accepted by `huddle set` / `huddle unset`.

use std::str::FromStr;

use crate::core::config::data::Config;
use crate::core::conversation::ManagerType;
use crate::core::temperature::Temperature;
use crate::utils::url::normalize_base_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiUrl,
    DefaultManager,
    Temperature,
    UseKeyring,
    LogFile,
    InputMaxHeight,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::ApiUrl,
        ConfigKey::DefaultManager,
        ConfigKey::Temperature,
        ConfigKey::UseKeyring,
        ConfigKey::LogFile,
        ConfigKey::InputMaxHeight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::ApiUrl => "api-url",
            ConfigKey::DefaultManager => "default-manager",
            ConfigKey::Temperature => "temperature",
            ConfigKey::UseKeyring => "use-keyring",
            ConfigKey::LogFile => "log-file",
            ConfigKey::InputMaxHeight => "input-max-height",
        }
    }

    /// Applies `value` and returns the value as stored.
    pub fn set(self, config: &mut Config, value: &str) -> Result<String, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("{} needs a value", self.name()));
        }
        match self {
            ConfigKey::ApiUrl => {
                let url = reqwest::Url::parse(value).map_err(|err| format!("invalid URL: {err}"))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(format!("unsupported URL scheme: {}", url.scheme()));
                }
                let normalized = normalize_base_url(value);
                config.api_base_url = Some(normalized.clone());
                Ok(normalized)
            }
            ConfigKey::DefaultManager => {
                let kind = ManagerType::from_str(value)?;
                config.default_manager_type = Some(kind);
                Ok(kind.to_string())
            }
            ConfigKey::Temperature => {
                let raw: f32 = value
                    .parse()
                    .map_err(|_| format!("temperature must be a number, got '{value}'"))?;
                let temperature = Temperature::new(raw);
                config.temperature = Some(temperature);
                Ok(temperature.to_string())
            }
            ConfigKey::UseKeyring => {
                let enabled = parse_bool(value)?;
                config.use_keyring = Some(enabled);
                Ok(if enabled { "on" } else { "off" }.to_string())
            }
            ConfigKey::LogFile => {
                config.log_file = Some(value.to_string());
                Ok(value.to_string())
            }
            ConfigKey::InputMaxHeight => {
                let rows: u16 = value
                    .parse()
                    .ok()
                    .filter(|rows| *rows > 0)
                    .ok_or_else(|| format!("input-max-height must be a positive integer, got '{value}'"))?;
                config.input_max_height = Some(rows);
                Ok(rows.to_string())
            }
        }
    }

    pub fn unset(self, config: &mut Config) {
        match self {
            ConfigKey::ApiUrl => config.api_base_url = None,
            ConfigKey::DefaultManager => config.default_manager_type = None,
            ConfigKey::Temperature => config.temperature = None,
            ConfigKey::UseKeyring => config.use_keyring = None,
            ConfigKey::LogFile => config.log_file = None,
            ConfigKey::InputMaxHeight => config.input_max_height = None,
        }
    }

    /// Effective value, with defaults filled in.
    pub fn display_value(self, config: &Config) -> String {
        match self {
            ConfigKey::ApiUrl => config.api_base_url().to_string(),
            ConfigKey::DefaultManager => config.default_manager_type().to_string(),
            ConfigKey::Temperature => config.temperature().to_string(),
            ConfigKey::UseKeyring => if config.use_keyring() { "on" } else { "off" }.to_string(),
            ConfigKey::LogFile => config
                .log_file
                .clone()
                .unwrap_or_else(|| "(unset)".to_string()),
            ConfigKey::InputMaxHeight => config.input_max_height().to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.name()).collect();
                format!("unknown config key '{value}' (known: {})", known.join(", "))
            })
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("expected on/off, got '{value}'")),
    }
}

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        for key in ConfigKey::ALL {
            println!("  {}: {}", key.name(), key.display_value(self));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_with_either_separator() {
        assert_eq!("api_url".parse::<ConfigKey>(), Ok(ConfigKey::ApiUrl));
        assert_eq!("Temperature".parse::<ConfigKey>(), Ok(ConfigKey::Temperature));
        assert!("theme".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn temperature_is_clamped_and_rounded_on_set() {
        let mut config = Config::default();
        assert_eq!(
            ConfigKey::Temperature.set(&mut config, "1.234"),
            Ok("1.00".to_string())
        );
        assert_eq!(
            ConfigKey::Temperature.set(&mut config, "0.456"),
            Ok("0.46".to_string())
        );
        assert!(ConfigKey::Temperature.set(&mut config, "warm").is_err());
    }

    #[test]
    fn api_url_is_validated_and_normalized() {
        let mut config = Config::default();
        assert_eq!(
            ConfigKey::ApiUrl.set(&mut config, "https://coach.example.com/api/"),
            Ok("https://coach.example.com/api".to_string())
        );
        assert!(ConfigKey::ApiUrl.set(&mut config, "ftp://coach.example.com").is_err());
        assert!(ConfigKey::ApiUrl.set(&mut config, "nope").is_err());
        assert_eq!(config.api_base_url(), "https://coach.example.com/api");
    }

    #[test]
    fn unset_restores_default_display() {
        let mut config = Config::default();
        ConfigKey::DefaultManager
            .set(&mut config, "life-coach")
            .unwrap();
        assert_eq!(ConfigKey::DefaultManager.display_value(&config), "life_coach");
        ConfigKey::DefaultManager.unset(&mut config);
        assert_eq!(
            ConfigKey::DefaultManager.display_value(&config),
            "career_coach"
        );
    }

    #[test]
    fn keyring_toggle_accepts_common_spellings() {
        let mut config = Config::default();
        assert_eq!(ConfigKey::UseKeyring.set(&mut config, "no"), Ok("off".into()));
        assert!(!config.use_keyring());
        assert!(ConfigKey::UseKeyring.set(&mut config, "maybe").is_err());
        assert!(ConfigKey::InputMaxHeight.set(&mut config, "0").is_err());
    }
}
