//! Configuration for the sensor hub.

use crate::core::ValuePolicy;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the sensor hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial transport settings
    pub serial: SerialConfig,

    /// Run a processing pass after this many received lines (0 disables)
    pub process_every: u64,

    /// How value text that is not a clean number is handled
    pub value_policy: ValuePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            process_every: 5,
            value_policy: ValuePolicy::Lenient,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensor-hub")
            .join("config.json")
    }
}

/// Serial port settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path or port name
    pub port: String,

    pub baud_rate: u32,

    /// Wait after opening the port, for boards that reset on connect
    #[serde(rename = "settle_delay_ms", with = "millis_serde")]
    pub settle_delay: Duration,

    /// Read timeout, bounds how long a stop request can go unnoticed
    #[serde(rename = "read_timeout_ms", with = "millis_serde")]
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            settle_delay: Duration::from_secs(2),
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Serde support for Duration as whole milliseconds.
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.process_every, 5);
        assert_eq!(config.value_policy, ValuePolicy::Lenient);
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.settle_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"value_policy":"strict","serial":{"baud_rate":9600}}"#)
                .unwrap();
        assert_eq!(config.value_policy, ValuePolicy::Strict);
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.process_every, 5);
    }

    #[test]
    fn test_durations_serialize_as_millis() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["serial"]["settle_delay_ms"], 2000);
        assert_eq!(json["serial"]["read_timeout_ms"], 1000);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("sensor-hub-config-test-{}", std::process::id()))
            .join("config.json");

        let mut config = Config::default();
        config.process_every = 12;
        config.serial.port = "COM3".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("sensor-hub-does-not-exist").join("config.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
