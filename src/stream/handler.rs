use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;
use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::notifications::NotificationLog;
use crate::observability::metrics::{MALFORMED_FRAMES, RECONNECT_ATTEMPTS, TICKS_PROCESSED};
use crate::observability::tracing::trace_stream;
use crate::store::{PriceTick, ResourceStore};
use crate::stream::detector::RateAlertDetector;
use crate::stream::feed::{FeedFrame, PriceFeed};
use crate::stream::reconnect::ReconnectPolicy;
use crate::utils::cancel::CancelToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
    Reconnecting { attempt: u32 },
}

/// Why [`PriceStreamHandler::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamExit {
    /// The server closed the connection cleanly.
    Clean,
    /// `close()` was called.
    Cancelled,
    /// The reconnect budget ran out.
    Exhausted,
}

enum Disconnect {
    Clean,
    Unclean,
    Cancelled,
}

pub struct PriceStreamHandler {
    store: Arc<ResourceStore>,
    log: Arc<NotificationLog>,
    detector: Mutex<RateAlertDetector>,
    policy: Mutex<ReconnectPolicy>,
    state: watch::Sender<ConnectionState>,
    cancel: CancelToken,
}

impl PriceStreamHandler {
    pub fn new(
        store: Arc<ResourceStore>,
        log: Arc<NotificationLog>,
        config: &StreamConfig,
        cancel: CancelToken,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Closed);
        PriceStreamHandler {
            store,
            log,
            detector: Mutex::new(RateAlertDetector::new(config.alert_threshold_percent)),
            policy: Mutex::new(ReconnectPolicy::new(
                config.max_reconnect_attempts,
                config.reconnect_delay(),
            )),
            state,
            cancel,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.policy.lock().attempts()
    }

    /// Stop the stream. The active read is abandoned and a pending reconnect
    /// timer will not reconnect when it fires.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    /// Drive `feed` until a clean close, cancellation or the reconnect
    /// budget is spent. The feed is closed before returning.
    pub async fn run<F: PriceFeed>(&self, mut feed: F) -> StreamExit {
        let span = trace_stream(feed.source_id());
        let exit = self.drive(&mut feed).instrument(span).await;
        feed.close().await;
        self.set_state(ConnectionState::Closed);
        exit
    }

    async fn drive<F: PriceFeed>(&self, feed: &mut F) -> StreamExit {
        loop {
            if self.cancel.is_cancelled() {
                return StreamExit::Cancelled;
            }

            self.set_state(ConnectionState::Connecting);
            let disconnect = match feed.connect().await {
                Ok(()) => {
                    self.policy.lock().on_open();
                    self.set_state(ConnectionState::Open);
                    self.read_until_closed(feed).await
                }
                Err(e) => {
                    tracing::warn!("Price stream connect failed: {}", e);
                    Disconnect::Unclean
                }
            };

            match disconnect {
                Disconnect::Clean => {
                    tracing::info!("Price stream closed cleanly");
                    return StreamExit::Clean;
                }
                Disconnect::Cancelled => return StreamExit::Cancelled,
                Disconnect::Unclean => {}
            }

            let (delay, attempt) = {
                let mut policy = self.policy.lock();
                (policy.on_unclean_close(), policy.attempts())
            };
            let Some(delay) = delay else {
                let err = Error::MaxReconnectAttemptsExceeded(attempt);
                tracing::error!("Price stream stopped: {}", err);
                return StreamExit::Exhausted;
            };

            RECONNECT_ATTEMPTS.inc();
            self.set_state(ConnectionState::Reconnecting { attempt });
            tracing::info!(attempt, "Reconnecting price stream in {:?}", delay);

            tokio::time::sleep(delay).await;
            if self.cancel.is_cancelled() {
                tracing::debug!("Reconnect timer fired after close, not reconnecting");
                return StreamExit::Cancelled;
            }
        }
    }

    async fn read_until_closed<F: PriceFeed>(&self, feed: &mut F) -> Disconnect {
        loop {
            let frame = tokio::select! {
                _ = self.cancel.cancelled() => return Disconnect::Cancelled,
                frame = feed.next_frame() => frame,
            };

            match frame {
                Ok(FeedFrame::Text(text)) => {
                    self.apply_message(&text);
                }
                Ok(FeedFrame::Closed { clean: true }) => return Disconnect::Clean,
                Ok(FeedFrame::Closed { clean: false }) => {
                    tracing::warn!("Price stream closed unexpectedly");
                    return Disconnect::Unclean;
                }
                Err(e) => {
                    tracing::warn!("Price stream read failed: {}", e);
                    return Disconnect::Unclean;
                }
            }
        }
    }

    /// Apply one frame of `asset -> price` entries in receipt order. Bad
    /// frames and bad entries are logged and skipped. Returns how many ticks
    /// were applied.
    pub fn apply_message(&self, text: &str) -> usize {
        let entries = match parse_frame(text) {
            Ok(entries) => entries,
            Err(e) => {
                MALFORMED_FRAMES.inc();
                tracing::warn!("Skipping price frame: {}", e);
                return 0;
            }
        };

        let mut applied = 0;
        for (asset, raw) in entries {
            let price = match parse_price(&asset, &raw) {
                Ok(price) => price,
                Err(e) => {
                    MALFORMED_FRAMES.inc();
                    tracing::warn!("Skipping price entry: {}", e);
                    continue;
                }
            };

            let tick = PriceTick::new(asset, price);
            self.store.update_live_price(&tick);

            let price_move = self.detector.lock().observe(&tick);
            if let Some(price_move) = price_move {
                self.log.append(price_move.to_alert());
            }

            TICKS_PROCESSED.inc();
            applied += 1;
        }
        applied
    }
}

/// A frame is one JSON object; keys keep the order they arrived in.
pub(crate) fn parse_frame(text: &str) -> Result<Vec<(String, Value)>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::DeserializationError(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(Error::DeserializationError(format!("expected an object, got {}", other))),
    }
}

/// Prices arrive as decimal strings or plain numbers and must be positive.
pub(crate) fn parse_price(asset: &str, raw: &Value) -> Result<f64> {
    let price = match raw {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match price {
        Some(p) if p.is_finite() && p > 0.0 => Ok(p),
        _ => Err(Error::InvalidPrice {
            asset: asset.to_string(),
            raw: raw.to_string(),
        }),
    }
}
