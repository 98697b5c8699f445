//! Property repository trait.

use async_trait::async_trait;

use crate::error::Result;

use super::model::Property;

/// A read-only repository over the `properties` table.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Lists all property rows.
    async fn list_all(&self) -> Result<Vec<Property>>;
}
