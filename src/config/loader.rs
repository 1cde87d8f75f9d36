use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProviderConfig,
    pub watch_list: WatchListConfig,
    pub refresh: RefreshConfig,
    pub stream: StreamConfig,
    pub notifications: NotificationConfig,
    pub synthetic_alerts: SyntheticAlertConfig,
    pub preferences: PreferenceConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layers `config/default`, `config/<env>` and `LIVEDASH__*` variables
    /// (e.g. `LIVEDASH__PROVIDERS__NEWS_API_KEY`) over the built-in defaults.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LIVEDASH").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let config: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The effective configuration, for the startup log.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh.interval_secs == 0 {
            return Err(Error::ConfigError("refresh.interval_secs must be greater than 0".to_string()));
        }

        if !(self.stream.alert_threshold_percent > 0.0) {
            return Err(Error::ConfigError(format!(
                "stream.alert_threshold_percent must be positive, got {}",
                self.stream.alert_threshold_percent
            )));
        }

        if self.notifications.capacity == 0 {
            return Err(Error::ConfigError("notifications.capacity must be greater than 0".to_string()));
        }

        let alerts = &self.synthetic_alerts;
        if alerts.enabled {
            if alerts.min_interval_secs > alerts.max_interval_secs {
                return Err(Error::ConfigError(format!(
                    "synthetic_alerts interval range is empty: {}..{}",
                    alerts.min_interval_secs, alerts.max_interval_secs
                )));
            }
            if alerts.locations.is_empty() || alerts.messages.is_empty() {
                return Err(Error::ConfigError(
                    "synthetic_alerts needs at least one location and one message".to_string(),
                ));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::ConfigError(format!(
                "Invalid logging.level: {}. Must be one of: {:?}",
                self.logging.level, valid_log_levels
            )));
        }

        Ok(())
    }
}
