//! Profile repository trait.

use async_trait::async_trait;

use crate::error::Result;

use super::model::{NewProfile, Profile};

/// An abstract repository over the `profiles` table.
///
/// Implementations are expected to be stale-tolerant: reads return whatever
/// snapshot the backend currently serves, with no transactional guarantees
/// against concurrent writers.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Inserts a new profile row.
    async fn insert(&self, profile: &NewProfile) -> Result<()>;

    /// Finds a profile by its id (= auth user id).
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Profile))`: profile found
    /// - `Ok(None)`: no row for this id
    /// - `Err(_)`: error during retrieval
    async fn find_by_id(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Lists the most recently created profiles, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Profile>>;
}
