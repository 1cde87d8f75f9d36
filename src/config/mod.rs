use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod loader;
pub mod stream;
pub mod watch_list;

pub use loader::AppConfig;
pub use stream::{StreamConfig, SyntheticAlertConfig};
pub use watch_list::WatchListConfig;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub weather_base_url: String,
    pub weather_api_key: String,
    pub crypto_base_url: String,
    pub news_base_url: String,
    pub news_api_key: String,
    pub request_timeout_secs: u64,
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            weather_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            weather_api_key: String::new(),
            crypto_base_url: "https://api.coingecko.com/api/v3".to_string(),
            news_base_url: "https://newsdata.io/api/1".to_string(),
            news_api_key: String::new(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    pub history_days: u32,
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: 60,
            history_days: 7,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            capacity: crate::notifications::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PreferenceConfig {
    pub storage_dir: String,
    pub key: String,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        PreferenceConfig {
            storage_dir: "./data".to_string(),
            key: crate::preferences::PREFERENCES_KEY.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}
