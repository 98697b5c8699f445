//! Subscription repository trait.

use async_trait::async_trait;

use crate::error::Result;

use super::model::{NewSubscription, Plan, Subscription, SubscriptionStatus};

/// An abstract repository over the `subscriptions` table.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Inserts a new subscription row.
    async fn insert(&self, subscription: &NewSubscription) -> Result<()>;

    /// Returns the current subscription for a user: the most recently
    /// created row, or `None` when the user has none.
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<Subscription>>;

    /// Updates every subscription row belonging to `user_id` to the given
    /// plan and status.
    async fn update_plan(
        &self,
        user_id: &str,
        plan: Plan,
        status: SubscriptionStatus,
    ) -> Result<()>;

    /// Lists all subscription rows.
    async fn list_all(&self) -> Result<Vec<Subscription>>;
}
