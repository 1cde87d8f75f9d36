use serde::{Deserialize, Serialize};

/// Entities refreshed automatically and tracked by the price stream.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchListConfig {
    pub locations: Vec<String>,
    pub assets: Vec<String>,
    pub news_query: String,
    pub news_limit: usize,
}

impl Default for WatchListConfig {
    fn default() -> Self {
        WatchListConfig {
            locations: vec!["New York".to_string(), "London".to_string(), "Tokyo".to_string()],
            assets: vec!["bitcoin".to_string(), "ethereum".to_string(), "solana".to_string()],
            news_query: "cryptocurrency OR bitcoin OR ethereum".to_string(),
            news_limit: 5,
        }
    }
}
