//! Gate event repository trait.

use async_trait::async_trait;

use crate::error::Result;

use super::model::GateEvent;

/// A read-only repository over the `events` table.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Lists the most recently recorded events, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<GateEvent>>;
}
