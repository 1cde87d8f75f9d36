//! Notification Log
//!
//! Bounded, newest-first log of alert events shared by the price stream and
//! the synthetic condition-alert generator.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use crate::observability::metrics::ALERTS_EMITTED;
use crate::types::{AlertId, Timestamp};

pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Consecutive price ticks moved by at least the threshold.
    RateAlert,
    /// Weather condition notice.
    ConditionAlert,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::RateAlert => "rate_alert",
            AlertKind::ConditionAlert => "condition_alert",
        }
    }
}

/// An alert before the log has stamped it.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl NewAlert {
    pub fn new(kind: AlertKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        NewAlert {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: AlertId,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub created_at: Timestamp,
    pub is_read: bool,
}

#[derive(Debug)]
struct LogState {
    entries: VecDeque<AlertEvent>,
    unread: usize,
}

#[derive(Debug)]
pub struct NotificationLog {
    capacity: usize,
    state: Mutex<LogState>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        NotificationLog {
            capacity,
            state: Mutex::new(LogState {
                entries: VecDeque::new(),
                unread: 0,
            }),
        }
    }

    /// Stamp, prepend and trim to capacity. Returns the stored event.
    pub fn append(&self, alert: NewAlert) -> AlertEvent {
        let event = AlertEvent {
            id: AlertId::new(),
            kind: alert.kind,
            title: alert.title,
            message: alert.message,
            created_at: Timestamp::now(),
            is_read: false,
        };

        let mut state = self.state.lock();
        state.entries.push_front(event.clone());
        state.unread += 1;

        while state.entries.len() > self.capacity {
            if let Some(evicted) = state.entries.pop_back() {
                if !evicted.is_read {
                    state.unread = state.unread.saturating_sub(1);
                }
            }
        }
        drop(state);

        ALERTS_EMITTED.with_label_values(&[event.kind.as_str()]).inc();
        tracing::info!(kind = event.kind.as_str(), title = %event.title, "{}", event.message);
        event
    }

    /// Mark one entry read. Returns `true` if it was unread.
    pub fn mark_read(&self, id: AlertId) -> bool {
        let mut state = self.state.lock();
        let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if entry.is_read {
            return false;
        }
        entry.is_read = true;
        state.unread = state.unread.saturating_sub(1);
        true
    }

    pub fn mark_all_read(&self) {
        let mut state = self.state.lock();
        state.entries.iter_mut().for_each(|e| e.is_read = true);
        state.unread = 0;
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.unread = 0;
    }

    /// Newest first.
    pub fn entries(&self) -> Vec<AlertEvent> {
        self.state.lock().entries.iter().cloned().collect()
    }

    pub fn unread_count(&self) -> usize {
        self.state.lock().unread
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alert(n: usize) -> NewAlert {
        NewAlert::new(AlertKind::ConditionAlert, format!("Alert {}", n), "msg")
    }

    #[test]
    fn append_prepends_and_stamps() {
        let log = NotificationLog::new();
        let first = log.append(alert(1));
        let second = log.append(alert(2));

        assert_ne!(first.id, second.id);
        assert!(!second.is_read);
        let entries = log.entries();
        assert_eq!(entries[0].title, "Alert 2");
        assert_eq!(entries[1].title, "Alert 1");
        assert_eq!(log.unread_count(), 2);
    }

    #[test]
    fn twenty_first_append_evicts_oldest() {
        let log = NotificationLog::new();
        for n in 1..=21 {
            log.append(alert(n));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 20);
        assert_eq!(entries.first().unwrap().title, "Alert 21");
        assert_eq!(entries.last().unwrap().title, "Alert 2");
        assert_eq!(log.unread_count(), 20);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let log = NotificationLog::new();
        let event = log.append(alert(1));
        log.append(alert(2));

        assert!(log.mark_read(event.id));
        assert!(!log.mark_read(event.id));
        assert_eq!(log.unread_count(), 1);
        assert!(!log.mark_read(AlertId::new()));
        assert_eq!(log.unread_count(), 1);
    }

    #[test]
    fn capacity_is_clamped_without_overflow() {
        let unbounded = NotificationLog::with_capacity(usize::MAX);
        assert_eq!(unbounded.capacity(), usize::MAX);
        unbounded.append(alert(1));
        assert_eq!(unbounded.len(), 1);

        let zero = NotificationLog::with_capacity(0);
        assert_eq!(zero.capacity(), 1);
        zero.append(alert(1));
        zero.append(alert(2));
        assert_eq!(zero.entries()[0].title, "Alert 2");
        assert_eq!(zero.len(), 1);
    }

    #[test]
    fn clear_empties_and_zeroes() {
        let log = NotificationLog::new();
        log.append(alert(1));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.unread_count(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append,
        MarkRead(usize),
        MarkAll,
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => Just(Op::Append),
            3 => (0usize..25).prop_map(Op::MarkRead),
            1 => Just(Op::MarkAll),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn log_stays_bounded_and_counter_matches(ops in prop::collection::vec(op(), 0..80)) {
            let log = NotificationLog::new();
            for (n, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Append => { log.append(alert(n)); }
                    Op::MarkRead(i) => {
                        if let Some(e) = log.entries().get(i) {
                            log.mark_read(e.id);
                        }
                    }
                    Op::MarkAll => log.mark_all_read(),
                    Op::Clear => log.clear(),
                }
                prop_assert!(log.len() <= 20);
                let unread = log.entries().iter().filter(|e| !e.is_read).count();
                prop_assert_eq!(log.unread_count(), unread);
            }

            log.mark_all_read();
            prop_assert_eq!(log.unread_count(), 0);
            prop_assert!(log.entries().iter().all(|e| e.is_read));
        }
    }
}
