use async_trait::async_trait;
use serde::Deserialize;
use crate::error::{Error, Result};
use crate::providers::http::{join_url, HttpClient};
use crate::providers::CryptoProvider;
use crate::store::{CryptoQuote, CryptoRecord, HistoryPoint};
use crate::types::Timestamp;

pub struct CoinGeckoClient {
    http: HttpClient,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        CoinGeckoClient {
            http,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl CryptoProvider for CoinGeckoClient {
    async fn quote(&self, asset_id: &str) -> Result<CryptoRecord> {
        let url = join_url(&self.base_url, &format!("coins/{}", asset_id));
        let query = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
        ];
        let data: GeckoCoin = self.http.get_json(&url, &query).await?;

        let price = data.market_data.current_price.usd
            .ok_or_else(|| Error::Payload(format!("no USD price for {}", asset_id)))?;

        Ok(CryptoRecord::new(data.id, data.name, CryptoQuote {
            symbol: data.symbol,
            price,
            change_24h_percent: data.market_data.price_change_percentage_24h.unwrap_or(0.0),
            market_cap: data.market_data.market_cap.usd.unwrap_or(0.0),
            provider_updated_at: data.last_updated.unwrap_or_default(),
        }))
    }

    async fn history(&self, asset_id: &str, days: u32) -> Result<Vec<HistoryPoint<f64>>> {
        let url = join_url(&self.base_url, &format!("coins/{}/market_chart", asset_id));
        let query = [
            ("vs_currency", "usd".to_string()),
            ("days", days.to_string()),
        ];
        let data: GeckoMarketChart = self.http.get_json(&url, &query).await?;

        Ok(data.prices.into_iter()
            .map(|(millis, price)| HistoryPoint::new(Timestamp::from_millis(millis.max(0.0) as u64), price))
            .collect())
    }
}

#[derive(Deserialize)]
struct GeckoCoin {
    id: String,
    symbol: String,
    name: String,
    last_updated: Option<String>,
    market_data: GeckoMarketData,
}

#[derive(Deserialize)]
struct GeckoMarketData {
    current_price: GeckoUsd,
    market_cap: GeckoUsd,
    price_change_percentage_24h: Option<f64>,
}

#[derive(Deserialize)]
struct GeckoUsd {
    usd: Option<f64>,
}

#[derive(Deserialize)]
struct GeckoMarketChart {
    prices: Vec<(f64, f64)>,
}
