//! Wires the shared state, the refresh scheduler, the price stream and the
//! condition-alert generator into one object with a start/teardown cycle.

use std::sync::Arc;
use tokio::time::{timeout, Duration};
use crate::config::AppConfig;
use crate::error::Result;
use crate::notifications::NotificationLog;
use crate::preferences::{FavoriteKind, FileStore, KeyValueStore, PreferenceStore};
use crate::providers::Providers;
use crate::refresh::RefreshScheduler;
use crate::store::{CryptoQuote, CryptoRecord, ResourceStore, WeatherNow, WeatherRecord};
use crate::stream::{ConditionAlertGenerator, PriceFeed, PriceStreamHandler};
use crate::utils::cancel::CancelToken;
use crate::utils::task_supervisor::TaskSupervisor;

pub const REFRESH_TASK: &str = "bulk_refresh";
pub const STREAM_TASK: &str = "price_stream";
pub const CONDITION_ALERT_TASK: &str = "condition_alerts";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

pub struct Dashboard {
    config: AppConfig,
    store: Arc<ResourceStore>,
    notifications: Arc<NotificationLog>,
    preferences: Arc<PreferenceStore>,
    scheduler: Arc<RefreshScheduler>,
    stream: Arc<PriceStreamHandler>,
    generator: Arc<ConditionAlertGenerator>,
    cancel: CancelToken,
    supervisor: TaskSupervisor,
}

impl Dashboard {
    pub fn new(config: AppConfig, providers: Providers, storage: Arc<dyn KeyValueStore>) -> Self {
        let cancel = CancelToken::new();
        let store = Arc::new(ResourceStore::new());
        let notifications = Arc::new(NotificationLog::with_capacity(config.notifications.capacity));
        let preferences = Arc::new(PreferenceStore::load(storage, config.preferences.key.clone()));

        let scheduler = Arc::new(RefreshScheduler::new(
            store.clone(),
            providers,
            config.watch_list.clone(),
            &config.refresh,
        ));
        let stream = Arc::new(PriceStreamHandler::new(
            store.clone(),
            notifications.clone(),
            &config.stream,
            cancel.clone(),
        ));
        let generator = Arc::new(ConditionAlertGenerator::new(
            notifications.clone(),
            config.synthetic_alerts.clone(),
            cancel.clone(),
        ));

        Dashboard {
            config,
            store,
            notifications,
            preferences,
            scheduler,
            stream,
            generator,
            cancel,
            supervisor: TaskSupervisor::new(),
        }
    }

    /// HTTP providers and file-backed preferences from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let providers = Providers::from_config(&config.providers)?;
        let storage = Arc::new(FileStore::new(&config.preferences.storage_dir));
        Ok(Self::new(config, providers, storage))
    }

    /// Spawn the background tasks. The feed is only used when the stream is
    /// enabled.
    pub fn start<F: PriceFeed + 'static>(&mut self, feed: F) {
        let scheduler = self.scheduler.clone();
        let cancel = self.cancel.clone();
        self.supervisor.spawn(REFRESH_TASK, async move {
            scheduler.run(cancel).await;
        });

        if self.config.stream.enabled {
            let stream = self.stream.clone();
            self.supervisor.spawn(STREAM_TASK, async move {
                let exit = stream.run(feed).await;
                tracing::info!("Price stream ended: {:?}", exit);
            });
        } else {
            tracing::info!("Price stream disabled");
        }

        if self.config.synthetic_alerts.enabled {
            let generator = self.generator.clone();
            self.supervisor.spawn(CONDITION_ALERT_TASK, async move {
                generator.run().await;
            });
        }
    }

    /// Cancel every task, give each a moment to wind down, then abort
    /// whatever is left.
    pub async fn teardown(&mut self) {
        self.stream.close();
        self.cancel.cancel();

        for name in [STREAM_TASK, REFRESH_TASK, CONDITION_ALERT_TASK] {
            if !self.supervisor.is_running(name) {
                continue;
            }
            match timeout(SHUTDOWN_GRACE, self.supervisor.wait_for_task(name)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("{}", e),
                Err(_) => tracing::warn!("Task {} did not stop within {:?}", name, SHUTDOWN_GRACE),
            }
        }
        self.supervisor.shutdown_all();
    }

    pub fn check_health(&mut self) -> Result<()> {
        self.supervisor.check_health()
    }

    pub fn is_running(&self, task: &str) -> bool {
        self.supervisor.is_running(task)
    }

    pub fn toggle_favorite(&self, kind: FavoriteKind, id: &str) -> bool {
        self.preferences.toggle(kind, id)
    }

    /// Weather records for favorite locations, matched by id or name.
    pub fn favorite_weather(&self) -> Vec<WeatherRecord> {
        let favorites = self.preferences.favorites(FavoriteKind::Location);
        self.store.records::<WeatherNow>()
            .into_iter()
            .filter(|r| favorites.iter().any(|f| f == &r.id || f.eq_ignore_ascii_case(&r.display_name)))
            .collect()
    }

    pub fn favorite_crypto(&self) -> Vec<CryptoRecord> {
        let favorites = self.preferences.favorites(FavoriteKind::Asset);
        self.store.records::<CryptoQuote>()
            .into_iter()
            .filter(|r| favorites.contains(&r.id))
            .collect()
    }

    /// Load the price history of an asset over the configured window.
    pub async fn load_crypto_history(&self, asset_id: &str) -> Result<usize> {
        self.scheduler.load_crypto_history(asset_id, self.scheduler.history_days()).await
    }

    pub async fn load_weather_forecast(&self, location: &str) -> Result<usize> {
        self.scheduler.load_weather_forecast(location).await
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    pub fn notifications(&self) -> &Arc<NotificationLog> {
        &self.notifications
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.preferences
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.scheduler
    }

    pub fn stream(&self) -> &Arc<PriceStreamHandler> {
        &self.stream
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}
