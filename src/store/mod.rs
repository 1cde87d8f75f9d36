//! Resource Store
//!
//! In-memory state shared by the refresh scheduler, the price stream and
//! presentation. Every operation is a short synchronous step under one lock
//! and never fails; callers report fetch problems through
//! [`ResourceStore::set_error`].
//!
//! Writes within a kind are last-write-wins. Two refreshes of the same id in
//! flight at once store whichever response lands last, with no staleness
//! check.

pub mod record;
pub mod status;

pub use record::{
    CryptoQuote, CryptoRecord, HistoryPoint, LivePrice, NewsItem, PriceTick, RecordValue,
    ResourceRecord, WeatherNow, WeatherRecord, WeatherSample,
};
pub use status::{RefreshStatus, ResourceKind};

use parking_lot::RwLock;
use std::collections::HashMap;
use crate::types::Timestamp;

/// Per-kind record maps, addressed generically through [`RecordValue`].
#[derive(Debug, Default)]
pub struct RecordTables {
    pub(crate) weather: HashMap<String, WeatherRecord>,
    pub(crate) crypto: HashMap<String, CryptoRecord>,
}

#[derive(Debug, Default)]
struct StoreState {
    tables: RecordTables,
    news: Vec<NewsItem>,
    live_prices: HashMap<String, LivePrice>,
    statuses: HashMap<ResourceKind, RefreshStatus>,
}

#[derive(Debug, Default)]
pub struct ResourceStore {
    state: RwLock<StoreState>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. An incoming record without history keeps the
    /// stored history for that id.
    pub fn upsert<V: RecordValue>(&self, mut record: ResourceRecord<V>) {
        let mut state = self.state.write();
        let table = V::table_mut(&mut state.tables);

        if record.history.is_none() {
            let existing = table.get_mut(&record.id).and_then(|r| r.history.take());
            record.history = Some(existing.unwrap_or_default());
        }

        tracing::trace!(kind = %V::KIND, id = %record.id, "Upserted record");
        table.insert(record.id.clone(), record);
    }

    /// Replace the history of `id` wholesale. Returns `false` if the id is unknown.
    pub fn append_history<V: RecordValue>(&self, id: &str, entries: Vec<HistoryPoint<V::Sample>>) -> bool {
        let mut state = self.state.write();
        match V::table_mut(&mut state.tables).get_mut(id) {
            Some(record) => {
                record.history = Some(entries);
                true
            }
            None => {
                tracing::debug!(kind = %V::KIND, id, "History for unknown record dropped");
                false
            }
        }
    }

    pub fn get<V: RecordValue>(&self, id: &str) -> Option<ResourceRecord<V>> {
        V::table(&self.state.read().tables).get(id).cloned()
    }

    /// Lookup by id, falling back to a case-insensitive display name match.
    pub fn find<V: RecordValue>(&self, id_or_name: &str) -> Option<ResourceRecord<V>> {
        let state = self.state.read();
        let table = V::table(&state.tables);
        table.get(id_or_name)
            .or_else(|| table.values().find(|r| r.display_name.eq_ignore_ascii_case(id_or_name)))
            .cloned()
    }

    /// All records of one kind, sorted by display name.
    pub fn records<V: RecordValue>(&self) -> Vec<ResourceRecord<V>> {
        let state = self.state.read();
        let mut records: Vec<_> = V::table(&state.tables).values().cloned().collect();
        records.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        records
    }

    pub fn record_count(&self, kind: ResourceKind) -> usize {
        let state = self.state.read();
        match kind {
            ResourceKind::Weather => state.tables.weather.len(),
            ResourceKind::Crypto => state.tables.crypto.len(),
            ResourceKind::News => state.news.len(),
        }
    }

    pub fn replace_news(&self, items: Vec<NewsItem>) {
        self.state.write().news = items;
    }

    pub fn news(&self) -> Vec<NewsItem> {
        self.state.read().news.clone()
    }

    /// Write a streamed price into the live slot and, if the asset has a
    /// record, into its current price.
    pub fn update_live_price(&self, tick: &PriceTick) {
        let mut state = self.state.write();
        state.live_prices.insert(tick.asset_id.clone(), LivePrice {
            price: tick.price,
            observed_at: tick.observed_at,
        });

        if let Some(record) = state.tables.crypto.get_mut(&tick.asset_id) {
            record.current.price = tick.price;
        }
    }

    pub fn live_price(&self, asset_id: &str) -> Option<LivePrice> {
        self.state.read().live_prices.get(asset_id).copied()
    }

    pub fn live_prices(&self) -> HashMap<String, LivePrice> {
        self.state.read().live_prices.clone()
    }

    pub fn set_loading(&self, kind: ResourceKind, loading: bool) {
        self.state.write().statuses.entry(kind).or_default().is_loading = loading;
    }

    pub fn set_error(&self, kind: ResourceKind, message: Option<String>) {
        self.state.write().statuses.entry(kind).or_default().last_error = message;
    }

    pub fn set_last_updated(&self, kind: ResourceKind, at: Timestamp) {
        self.state.write().statuses.entry(kind).or_default().last_success_at = Some(at);
    }

    /// Successful fetch: not loading, error cleared, success stamped.
    pub fn mark_success(&self, kind: ResourceKind, at: Timestamp) {
        let mut state = self.state.write();
        let status = state.statuses.entry(kind).or_default();
        status.is_loading = false;
        status.last_error = None;
        status.last_success_at = Some(at);
    }

    /// Failed fetch: not loading, error recorded, last success untouched.
    pub fn mark_failure(&self, kind: ResourceKind, message: impl Into<String>) {
        let mut state = self.state.write();
        let status = state.statuses.entry(kind).or_default();
        status.is_loading = false;
        status.last_error = Some(message.into());
    }

    /// The user closed the error banner.
    pub fn dismiss_error(&self, kind: ResourceKind) {
        self.set_error(kind, None);
    }

    pub fn status(&self, kind: ResourceKind) -> RefreshStatus {
        self.state.read().statuses.get(&kind).cloned().unwrap_or_default()
    }
}
