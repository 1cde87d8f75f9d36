//! Live dashboard backend: periodic weather/crypto/news refresh, a live
//! price stream with threshold alerts, a bounded notification log and
//! persisted favorites.
//!
//! Shared state (`ResourceStore`, `NotificationLog`, `PreferenceStore`) is
//! handed around as `Arc`s. Each mutation is one short synchronous step
//! under a `parking_lot` lock that is never held across an await.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod notifications;
pub mod observability;
pub mod preferences;
pub mod providers;
pub mod refresh;
pub mod store;
pub mod stream;
pub mod types;
pub mod utils;

pub use dashboard::Dashboard;
pub use error::{Error, Result};

/// Config layer used when `LIVEDASH_ENV` is unset.
pub const DEFAULT_ENV: &str = "development";

/// Percentage move between consecutive ticks that raises a rate alert.
pub const RATE_ALERT_THRESHOLD_PERCENT: f64 = 5.0;
