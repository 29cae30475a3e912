//! Common data types for persistence

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A visited content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Content item id
    pub id: String,
    /// Item title at the time of the visit
    pub title: String,
    /// Title of the section the item belongs to
    pub section: String,
    /// Visit time (Unix milliseconds)
    pub timestamp: u64,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn new(id: impl Into<String>, title: impl Into<String>, section: impl Into<String>) -> Self {
        Self::at(id, title, section, now_millis())
    }

    /// Create an entry with an explicit timestamp
    pub fn at(
        id: impl Into<String>,
        title: impl Into<String>,
        section: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            section: section.into(),
            timestamp,
        }
    }
}
