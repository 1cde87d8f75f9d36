use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use crate::store::{RecordTables, ResourceKind};
use crate::types::Timestamp;

/// One weather location or crypto asset, keyed by `id` within its kind.
///
/// `history: None` on an incoming record means "not fetched here"; the store
/// keeps whatever history it already had for that id.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceRecord<V: RecordValue> {
    pub id: String,
    pub display_name: String,
    pub current: V,
    pub last_updated_at: Timestamp,
    pub history: Option<Vec<HistoryPoint<V::Sample>>>,
}

impl<V: RecordValue> ResourceRecord<V> {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, current: V) -> Self {
        ResourceRecord {
            id: id.into(),
            display_name: display_name.into(),
            current,
            last_updated_at: Timestamp::now(),
            history: None,
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryPoint<V::Sample>>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn history(&self) -> &[HistoryPoint<V::Sample>] {
        self.history.as_deref().unwrap_or(&[])
    }
}

/// Domain payload of a [`ResourceRecord`]. `Sample` is the value type of one
/// history point.
pub trait RecordValue: Clone + Debug + PartialEq + Send + Sync + 'static {
    type Sample: Clone + Debug + PartialEq + Send + Sync;

    const KIND: ResourceKind;

    #[doc(hidden)]
    fn table(tables: &RecordTables) -> &HashMap<String, ResourceRecord<Self>>;

    #[doc(hidden)]
    fn table_mut(tables: &mut RecordTables) -> &mut HashMap<String, ResourceRecord<Self>>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint<S> {
    pub at: Timestamp,
    pub value: S,
}

impl<S> HistoryPoint<S> {
    pub fn new(at: Timestamp, value: S) -> Self {
        HistoryPoint { at, value }
    }

    pub fn date_label(&self) -> String {
        self.at.date_label()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherNow {
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub temperature: f64,
    pub humidity: f64,
}

impl RecordValue for WeatherNow {
    type Sample = WeatherSample;

    const KIND: ResourceKind = ResourceKind::Weather;

    fn table(tables: &RecordTables) -> &HashMap<String, ResourceRecord<Self>> {
        &tables.weather
    }

    fn table_mut(tables: &mut RecordTables) -> &mut HashMap<String, ResourceRecord<Self>> {
        &mut tables.weather
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub symbol: String,
    pub price: f64,
    pub change_24h_percent: f64,
    pub market_cap: f64,
    /// Provider's own last-updated stamp, kept verbatim.
    pub provider_updated_at: String,
}

impl RecordValue for CryptoQuote {
    type Sample = f64;

    const KIND: ResourceKind = ResourceKind::Crypto;

    fn table(tables: &RecordTables) -> &HashMap<String, ResourceRecord<Self>> {
        &tables.crypto
    }

    fn table_mut(tables: &mut RecordTables) -> &mut HashMap<String, ResourceRecord<Self>> {
        &mut tables.crypto
    }
}

pub type WeatherRecord = ResourceRecord<WeatherNow>;
pub type CryptoRecord = ResourceRecord<CryptoQuote>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: String,
}

/// One streamed price observation.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTick {
    pub asset_id: String,
    pub price: f64,
    pub observed_at: Timestamp,
}

impl PriceTick {
    pub fn new(asset_id: impl Into<String>, price: f64) -> Self {
        PriceTick {
            asset_id: asset_id.into(),
            price,
            observed_at: Timestamp::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LivePrice {
    pub price: f64,
    pub observed_at: Timestamp,
}
