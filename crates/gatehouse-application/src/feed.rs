//! Shared handle over the dashboard activity log.

use std::sync::{Arc, Mutex};

use gatehouse_core::activity::{ActivityEntry, ActivityLog};

/// Cloneable handle to the activity log shared by every producer (gate
/// service, ambient simulator, console).
///
/// All mutation happens behind one mutex; producers only append and the
/// log itself enforces its capacity.
#[derive(Clone, Default)]
pub struct ActivityFeed {
    inner: Arc<Mutex<ActivityLog>>,
}

impl ActivityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry timestamped now.
    pub fn push(&self, message: impl Into<String>) {
        self.inner.lock().unwrap().push(message);
    }

    /// A display-ordered copy of the current entries, newest first.
    pub fn snapshot(&self) -> Vec<ActivityEntry> {
        self.inner.lock().unwrap().entries().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}
