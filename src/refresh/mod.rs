//! Bulk Refresh Scheduler
//!
//! Fans out one fetch per watch-list entry and writes results into the
//! store. A failed fetch only marks its own kind; siblings in the same batch
//! carry on.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::Instrument;
use crate::config::{RefreshConfig, WatchListConfig};
use crate::error::{Error, Result};
use crate::observability::metrics::{REFRESH_FAILURES, REFRESH_LATENCY};
use crate::observability::tracing::trace_refresh;
use crate::providers::Providers;
use crate::store::{CryptoQuote, ResourceKind, ResourceStore, WeatherNow};
use crate::types::Timestamp;
use crate::utils::cancel::CancelToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshSummary {
    pub weather_at: Timestamp,
    pub crypto_at: Timestamp,
    pub news_at: Timestamp,
    pub completed_at: Timestamp,
}

pub struct RefreshScheduler {
    store: Arc<ResourceStore>,
    providers: Providers,
    watch_list: WatchListConfig,
    interval: Duration,
    history_days: u32,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<ResourceStore>,
        providers: Providers,
        watch_list: WatchListConfig,
        config: &RefreshConfig,
    ) -> Self {
        RefreshScheduler {
            store,
            providers,
            watch_list,
            interval: config.interval(),
            history_days: config.history_days,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn history_days(&self) -> u32 {
        self.history_days
    }

    /// Current conditions for every watched location.
    pub async fn refresh_weather(&self) -> Timestamp {
        let span = trace_refresh(ResourceKind::Weather, self.watch_list.locations.len());
        async {
            join_all(self.watch_list.locations.iter().map(|l| self.refresh_location(l))).await;
            Timestamp::now()
        }
        .instrument(span)
        .await
    }

    /// Quotes for every watched asset.
    pub async fn refresh_crypto(&self) -> Timestamp {
        let span = trace_refresh(ResourceKind::Crypto, self.watch_list.assets.len());
        async {
            join_all(self.watch_list.assets.iter().map(|a| self.refresh_asset(a))).await;
            Timestamp::now()
        }
        .instrument(span)
        .await
    }

    pub async fn refresh_news(&self) -> Timestamp {
        let span = trace_refresh(ResourceKind::News, self.watch_list.news_limit);
        async {
            self.store.set_loading(ResourceKind::News, true);
            let result = self.providers.news
                .headlines(&self.watch_list.news_query, self.watch_list.news_limit)
                .await;

            match result {
                Ok(items) => {
                    tracing::debug!(count = items.len(), "Headlines refreshed");
                    self.store.replace_news(items);
                    self.store.mark_success(ResourceKind::News, Timestamp::now());
                }
                Err(e) => self.record_failure(ResourceKind::News, &self.watch_list.news_query, &e),
            }
            Timestamp::now()
        }
        .instrument(span)
        .await
    }

    /// All three kinds concurrently.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let start = Instant::now();
        let (weather_at, crypto_at, news_at) = tokio::join!(
            self.refresh_weather(),
            self.refresh_crypto(),
            self.refresh_news(),
        );
        REFRESH_LATENCY.observe(start.elapsed().as_secs_f64());

        let summary = RefreshSummary {
            weather_at,
            crypto_at,
            news_at,
            completed_at: Timestamp::now(),
        };
        tracing::info!("Refresh completed at {}", summary.completed_at);
        summary
    }

    /// Replace the stored price history of `asset_id`. Returns the number of
    /// points stored.
    pub async fn load_crypto_history(&self, asset_id: &str, days: u32) -> Result<usize> {
        let points = match self.providers.crypto.history(asset_id, days).await {
            Ok(points) => points,
            Err(e) => {
                self.record_failure(ResourceKind::Crypto, asset_id, &e);
                return Err(e);
            }
        };

        let count = points.len();
        if !self.store.append_history::<CryptoQuote>(asset_id, points) {
            return Err(Error::RecordNotFound {
                kind: ResourceKind::Crypto,
                id: asset_id.to_string(),
            });
        }
        tracing::debug!(asset = asset_id, days, count, "Price history loaded");
        Ok(count)
    }

    /// Forecast for a location, attached to the record whose id or display
    /// name matches. Returns the number of points stored.
    pub async fn load_weather_forecast(&self, location: &str) -> Result<usize> {
        let Some(record) = self.store.find::<WeatherNow>(location) else {
            return Err(Error::RecordNotFound {
                kind: ResourceKind::Weather,
                id: location.to_string(),
            });
        };

        let points = match self.providers.weather.forecast(location).await {
            Ok(points) => points,
            Err(e) => {
                self.record_failure(ResourceKind::Weather, location, &e);
                return Err(e);
            }
        };

        let count = points.len();
        if !self.store.append_history::<WeatherNow>(&record.id, points) {
            // Record vanished while the forecast was in flight
            return Err(Error::RecordNotFound {
                kind: ResourceKind::Weather,
                id: record.id,
            });
        }
        tracing::debug!(location, count, "Forecast loaded");
        Ok(count)
    }

    /// Refresh immediately, then every interval until cancelled. Each run is
    /// its own task, so a slow run never holds up the timer.
    pub async fn run(self: Arc<Self>, cancel: CancelToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Refresh scheduler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let scheduler = self.clone();
                    tokio::spawn(async move {
                        scheduler.refresh_all().await;
                    });
                }
            }
        }
    }

    async fn refresh_location(&self, location: &str) {
        self.store.set_loading(ResourceKind::Weather, true);
        match self.providers.weather.current(location).await {
            Ok(record) => {
                self.store.upsert(record);
                self.store.mark_success(ResourceKind::Weather, Timestamp::now());
            }
            Err(e) => self.record_failure(ResourceKind::Weather, location, &e),
        }
    }

    async fn refresh_asset(&self, asset_id: &str) {
        self.store.set_loading(ResourceKind::Crypto, true);
        match self.providers.crypto.quote(asset_id).await {
            Ok(record) => {
                self.store.upsert(record);
                self.store.mark_success(ResourceKind::Crypto, Timestamp::now());
            }
            Err(e) => self.record_failure(ResourceKind::Crypto, asset_id, &e),
        }
    }

    fn record_failure(&self, kind: ResourceKind, id: &str, error: &Error) {
        REFRESH_FAILURES.with_label_values(&[kind.as_str()]).inc();
        if error.is_transport() {
            tracing::warn!(kind = %kind, id, "Fetch failed: {}", error);
        } else {
            tracing::error!(kind = %kind, id, "Unusable provider response: {}", error);
        }
        self.store.mark_failure(kind, error.to_string());
    }
}
