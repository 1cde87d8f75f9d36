use std::collections::HashMap;
use crate::notifications::{AlertKind, NewAlert};
use crate::store::PriceTick;
use crate::utils::helper::{capitalize, percent_change};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

/// A tick that moved at least the threshold away from its predecessor.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceMove {
    pub asset_id: String,
    pub previous: f64,
    pub current: f64,
    pub percent_change: f64,
}

impl PriceMove {
    pub fn direction(&self) -> Direction {
        if self.percent_change > 0.0 {
            Direction::Increased
        } else {
            Direction::Decreased
        }
    }

    pub fn to_alert(&self) -> NewAlert {
        NewAlert::new(
            AlertKind::RateAlert,
            format!("{} Price Alert", capitalize(&self.asset_id)),
            format!(
                "Price has {} by {:.2}% to ${:.2}",
                self.direction().as_str(),
                self.percent_change.abs(),
                self.current
            ),
        )
    }
}

/// Compares each tick with the last known price of the same asset.
pub struct RateAlertDetector {
    threshold_percent: f64,
    last_known: HashMap<String, f64>,
}

impl RateAlertDetector {
    pub fn new(threshold_percent: f64) -> Self {
        RateAlertDetector {
            threshold_percent,
            last_known: HashMap::new(),
        }
    }

    /// Returns the move if `|pct| >= threshold`. The tick's price becomes the
    /// new baseline whether or not it fired.
    pub fn observe(&mut self, tick: &PriceTick) -> Option<PriceMove> {
        let previous = self.last_known.insert(tick.asset_id.clone(), tick.price)?;
        let pct = percent_change(previous, tick.price)?;

        if pct.abs() >= self.threshold_percent {
            Some(PriceMove {
                asset_id: tick.asset_id.clone(),
                previous,
                current: tick.price,
                percent_change: pct,
            })
        } else {
            None
        }
    }

    pub fn last_known(&self, asset_id: &str) -> Option<f64> {
        self.last_known.get(asset_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tick(asset: &str, price: f64) -> PriceTick {
        PriceTick::new(asset, price)
    }

    #[test]
    fn first_tick_never_fires() {
        let mut detector = RateAlertDetector::new(5.0);
        assert_eq!(detector.observe(&tick("bitcoin", 100.0)), None);
        assert_eq!(detector.last_known("bitcoin"), Some(100.0));
    }

    #[test]
    fn walk_through_100_94_104_105() {
        let mut detector = RateAlertDetector::new(5.0);
        detector.observe(&tick("bitcoin", 100.0));

        let down = detector.observe(&tick("bitcoin", 94.0)).expect("6% drop fires");
        assert_eq!(down.direction(), Direction::Decreased);
        let alert = down.to_alert();
        assert_eq!(alert.kind, AlertKind::RateAlert);
        assert_eq!(alert.title, "Bitcoin Price Alert");
        assert_eq!(alert.message, "Price has decreased by 6.00% to $94.00");

        let up = detector.observe(&tick("bitcoin", 104.0)).expect("10.64% rise fires");
        assert_eq!(up.direction(), Direction::Increased);
        assert_eq!(up.to_alert().message, "Price has increased by 10.64% to $104.00");

        assert_eq!(detector.observe(&tick("bitcoin", 105.0)), None);
        assert_eq!(detector.last_known("bitcoin"), Some(105.0));
    }

    #[test]
    fn exactly_threshold_fires() {
        let mut detector = RateAlertDetector::new(5.0);
        detector.observe(&tick("ethereum", 100.0));
        assert!(detector.observe(&tick("ethereum", 105.0)).is_some());
        assert!(detector.observe(&tick("ethereum", 109.0)).is_none());
    }

    #[test]
    fn assets_are_tracked_independently() {
        let mut detector = RateAlertDetector::new(5.0);
        detector.observe(&tick("bitcoin", 100.0));
        assert_eq!(detector.observe(&tick("solana", 10.0)), None);
        assert!(detector.observe(&tick("solana", 20.0)).is_some());
        assert_eq!(detector.observe(&tick("bitcoin", 101.0)), None);
    }

    proptest! {
        #[test]
        fn fires_iff_change_meets_threshold(prices in prop::collection::vec(1.0f64..10_000.0, 1..40)) {
            let mut detector = RateAlertDetector::new(5.0);
            let mut previous: Option<f64> = None;

            for price in prices {
                let fired = detector.observe(&tick("bitcoin", price));
                match previous {
                    None => prop_assert!(fired.is_none()),
                    Some(prev) => {
                        let pct = (price - prev) / prev * 100.0;
                        prop_assert_eq!(fired.is_some(), pct.abs() >= 5.0);
                    }
                }
                prop_assert_eq!(detector.last_known("bitcoin"), Some(price));
                previous = Some(price);
            }
        }
    }
}
