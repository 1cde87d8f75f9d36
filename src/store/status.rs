use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Weather,
    Crypto,
    News,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Weather, ResourceKind::Crypto, ResourceKind::News];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Weather => "weather",
            ResourceKind::Crypto => "crypto",
            ResourceKind::News => "news",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loading/error bookkeeping for one resource kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshStatus {
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub last_success_at: Option<Timestamp>,
}

impl RefreshStatus {
    pub fn is_idle(&self) -> bool {
        !self.is_loading
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }
}
