//! Live Price Stream
//!
//! Consumes the price websocket, writes ticks into the store and raises
//! rate alerts. The synthetic condition-alert generator lives here as well
//! since it feeds the same notification log on its own timer.

pub mod detector;
pub mod feed;
pub mod handler;
pub mod reconnect;
pub mod synthetic;

pub use detector::{Direction, PriceMove, RateAlertDetector};
pub use feed::{CoinCapFeed, FeedFrame, PriceFeed};
pub use handler::{ConnectionState, PriceStreamHandler, StreamExit};
pub use reconnect::ReconnectPolicy;
pub use synthetic::ConditionAlertGenerator;
