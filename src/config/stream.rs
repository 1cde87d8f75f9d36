use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    pub enabled: bool,
    pub url: String,
    pub max_reconnect_attempts: u32,
    pub reconnect_delay_secs: u64,
    pub alert_threshold_percent: f64,
}

impl StreamConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            enabled: true,
            url: "wss://ws.coincap.io/prices".to_string(),
            max_reconnect_attempts: 5,
            reconnect_delay_secs: 5,
            alert_threshold_percent: crate::RATE_ALERT_THRESHOLD_PERCENT,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SyntheticAlertConfig {
    pub enabled: bool,
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
    pub locations: Vec<String>,
    pub messages: Vec<String>,
}

impl Default for SyntheticAlertConfig {
    fn default() -> Self {
        SyntheticAlertConfig {
            enabled: true,
            min_interval_secs: 60,
            max_interval_secs: 120,
            locations: vec!["New York".to_string(), "London".to_string(), "Tokyo".to_string()],
            messages: vec![
                "Heavy rainfall expected".to_string(),
                "Heatwave warning".to_string(),
                "Strong winds advisory".to_string(),
                "Thunderstorm warning".to_string(),
                "Air quality alert".to_string(),
            ],
        }
    }
}
