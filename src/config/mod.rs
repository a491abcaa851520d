use anyhow::{Context, Result};
use config::{Config, File};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::geo::QueryOptions;
use crate::store::discovery;

fn default_store_root() -> String {
    "/var/lib/fakegps/enum".to_string()
}

fn default_provider_host() -> String {
    "127.0.0.1".to_string()
}

fn default_provider_port() -> u16 {
    2947
}

fn default_wait_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

// INI has no list syntax; candidate lists are comma-separated strings.
fn deserialize_name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;

    Ok(value
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect())
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_root")]
    pub root: String,
    #[serde(
        default = "discovery::default_device_classes",
        deserialize_with = "deserialize_name_list"
    )]
    pub device_classes: Vec<String>,
    #[serde(
        default = "discovery::default_instance_ids",
        deserialize_with = "deserialize_name_list"
    )]
    pub instance_ids: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
            device_classes: discovery::default_device_classes(),
            instance_ids: discovery::default_instance_ids(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_host")]
    pub host: String,
    #[serde(default = "default_provider_port")]
    pub port: u16,
    #[serde(default = "default_wait_ms")]
    pub start_timeout_ms: u64,
    #[serde(default = "default_wait_ms")]
    pub settle_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: default_provider_host(),
            port: default_provider_port(),
            start_timeout_ms: default_wait_ms(),
            settle_delay_ms: default_wait_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(rename = "STORE", default)]
    pub store: StoreConfig,
    #[serde(rename = "PROVIDER", default)]
    pub provider: ProviderConfig,
    #[serde(rename = "LOGGING", default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        Self::from_file("config.ini")
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    /// Provider wait durations for the live-location query.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            start_timeout: Duration::from_millis(self.provider.start_timeout_ms),
            settle_delay: Duration::from_millis(self.provider.settle_delay_ms),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(
                File::with_name(config_path.to_str().unwrap_or("")).format(config::FileFormat::Ini),
            )
            .build()
            .context(format!(
                "Failed to load config from {}",
                config_path.display()
            ))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref();

        // Build the config string
        let mut config_str = String::new();

        // STORE section
        config_str.push_str(&format!(
            "[STORE]\nroot = {}\ndevice_classes = {}\ninstance_ids = {}\n\n",
            self.store.root,
            self.store.device_classes.join(", "),
            self.store.instance_ids.join(", ")
        ));

        // PROVIDER section
        config_str.push_str(&format!(
            "[PROVIDER]\nhost = {}\nport = {}\nstart_timeout_ms = {}\nsettle_delay_ms = {}\n\n",
            self.provider.host,
            self.provider.port,
            self.provider.start_timeout_ms,
            self.provider.settle_delay_ms
        ));

        // LOGGING section
        config_str.push_str(&format!("[LOGGING]\nlevel = {}\n", self.logging.level));

        fs::write(config_path, config_str).context(format!(
            "Failed to save config to {}",
            config_path.display()
        ))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.store.root, "/var/lib/fakegps/enum");
        assert_eq!(config.store.device_classes, vec!["SENSOR", "UNKNOWN"]);
        assert_eq!(
            config.store.instance_ids,
            vec!["0000", "0001", "0002", "0003"]
        );
        assert_eq!(config.provider.host, "127.0.0.1");
        assert_eq!(config.provider.port, 2947);
        assert_eq!(config.provider.start_timeout_ms, 1000);
        assert_eq!(config.provider.settle_delay_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = "[STORE]\nroot = \"/tmp/enum\"\ndevice_classes = \"SENSOR\"\ninstance_ids = \"0000, 0001\"\n\n[PROVIDER]\nhost = \"localhost\"\nport = 12345\nstart_timeout_ms = 250\nsettle_delay_ms = 0\n\n[LOGGING]\nlevel = \"debug\"\n";

        temp_file.write_all(config_content.as_bytes()).unwrap();
        let config_path = temp_file.path();

        let config = AppConfig::from_file(config_path).unwrap();

        assert_eq!(config.store.root, "/tmp/enum");
        assert_eq!(config.store.device_classes, vec!["SENSOR"]);
        assert_eq!(config.store.instance_ids, vec!["0000", "0001"]);
        assert_eq!(config.provider.host, "localhost");
        assert_eq!(config.provider.port, 12345);
        assert_eq!(config.provider.start_timeout_ms, 250);
        assert_eq!(config.provider.settle_delay_ms, 0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = "[LOGGING]\nlevel = \"warn\"\n";

        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.store.device_classes, vec!["SENSOR", "UNKNOWN"]);
        assert_eq!(config.provider.port, 2947);
    }

    #[test]
    fn test_save_config() {
        let mut config = AppConfig::default();
        config.store.root = "/tmp/fakegps-test".to_string();
        config.store.device_classes = vec!["SENSOR".to_string()];
        config.provider.port = 2948;
        config.provider.settle_delay_ms = 500;
        config.logging.level = "debug".to_string();

        let temp_file = NamedTempFile::new().unwrap();
        let config_path = temp_file.path();

        config.save(config_path).unwrap();

        let loaded_config = AppConfig::from_file(config_path).unwrap();

        assert_eq!(loaded_config.store.root, "/tmp/fakegps-test");
        assert_eq!(loaded_config.store.device_classes, vec!["SENSOR"]);
        assert_eq!(loaded_config.provider.port, 2948);
        assert_eq!(loaded_config.provider.settle_delay_ms, 500);
        assert_eq!(loaded_config.logging.level, "debug");
    }

    #[test]
    fn test_query_options() {
        let mut config = AppConfig::default();
        config.provider.start_timeout_ms = 250;
        config.provider.settle_delay_ms = 0;

        let opts = config.query_options();
        assert_eq!(opts.start_timeout, Duration::from_millis(250));
        assert_eq!(opts.settle_delay, Duration::ZERO);
    }
}
