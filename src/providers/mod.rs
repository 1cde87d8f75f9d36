//! External data providers consumed by the refresh scheduler.

pub mod coingecko;
pub mod http;
pub mod newsdata;
pub mod openweather;

use async_trait::async_trait;
use std::sync::Arc;
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::store::{CryptoRecord, HistoryPoint, NewsItem, WeatherRecord, WeatherSample};

pub use coingecko::CoinGeckoClient;
pub use newsdata::NewsDataClient;
pub use openweather::OpenWeatherClient;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a location name or provider id.
    async fn current(&self, location: &str) -> Result<WeatherRecord>;

    /// Short-range forecast, chronological.
    async fn forecast(&self, location: &str) -> Result<Vec<HistoryPoint<WeatherSample>>>;
}

#[async_trait]
pub trait CryptoProvider: Send + Sync {
    async fn quote(&self, asset_id: &str) -> Result<CryptoRecord>;

    /// Daily-or-finer price history covering the last `days` days.
    async fn history(&self, asset_id: &str, days: u32) -> Result<Vec<HistoryPoint<f64>>>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>>;
}

/// The three collaborators the scheduler fans out to.
#[derive(Clone)]
pub struct Providers {
    pub weather: Arc<dyn WeatherProvider>,
    pub crypto: Arc<dyn CryptoProvider>,
    pub news: Arc<dyn NewsProvider>,
}

impl Providers {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = http::HttpClient::new(config.request_timeout())?;

        Ok(Providers {
            weather: Arc::new(OpenWeatherClient::new(
                client.clone(),
                &config.weather_base_url,
                &config.weather_api_key,
            )),
            crypto: Arc::new(CoinGeckoClient::new(client.clone(), &config.crypto_base_url)),
            news: Arc::new(NewsDataClient::new(
                client,
                &config.news_base_url,
                &config.news_api_key,
            )),
        })
    }
}
