use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use crate::config::SyntheticAlertConfig;
use crate::notifications::{AlertEvent, AlertKind, NewAlert, NotificationLog};
use crate::utils::cancel::CancelToken;

/// Emits a weather condition notice at a random interval, independent of
/// the price stream.
pub struct ConditionAlertGenerator {
    log: Arc<NotificationLog>,
    config: SyntheticAlertConfig,
    rng: Mutex<StdRng>,
    cancel: CancelToken,
}

impl ConditionAlertGenerator {
    pub fn new(log: Arc<NotificationLog>, config: SyntheticAlertConfig, cancel: CancelToken) -> Self {
        Self::with_seed(log, config, cancel, rand::rng().random())
    }

    /// Deterministic draws, for tests.
    pub fn with_seed(
        log: Arc<NotificationLog>,
        config: SyntheticAlertConfig,
        cancel: CancelToken,
        seed: u64,
    ) -> Self {
        ConditionAlertGenerator {
            log,
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            cancel,
        }
    }

    /// Uniform in `[min, max]` seconds, re-drawn every period.
    pub fn next_delay(&self) -> Duration {
        let min = self.config.min_interval_secs;
        let max = self.config.max_interval_secs.max(min);
        Duration::from_secs(self.rng.lock().random_range(min..=max))
    }

    pub fn next_alert(&self) -> Option<NewAlert> {
        let mut rng = self.rng.lock();
        let city = self.config.locations.choose(&mut *rng)?;
        let message = self.config.messages.choose(&mut *rng)?;
        Some(NewAlert::new(
            AlertKind::ConditionAlert,
            format!("Weather Alert for {}", city),
            message.clone(),
        ))
    }

    pub fn emit(&self) -> Option<AlertEvent> {
        let alert = self.next_alert()?;
        Some(self.log.append(alert))
    }

    pub async fn run(&self) {
        if !self.config.enabled {
            tracing::info!("Condition alerts disabled");
            return;
        }

        loop {
            let delay = self.next_delay();
            tracing::debug!("Next condition alert in {:?}", delay);

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if self.cancel.is_cancelled() {
                return;
            }

            self.emit();
        }
    }
}
