//! Bounded activity log shown on the dashboard.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries the log retains.
pub const LOG_CAPACITY: usize = 10;

/// A single dashboard activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

/// Bounded, newest-first record of user- and system-generated events.
///
/// Producers only append; when the log is full the oldest entry is evicted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry timestamped now, evicting the oldest entry when the
    /// log is at capacity.
    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(message, Utc::now());
    }

    /// Appends an entry with an explicit timestamp.
    pub fn push_at(&mut self, message: impl Into<String>, recorded_at: DateTime<Utc>) {
        self.entries.push_front(ActivityEntry {
            message: message.into(),
            recorded_at,
        });
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Entries in display order, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// The most recent entry, if any.
    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
