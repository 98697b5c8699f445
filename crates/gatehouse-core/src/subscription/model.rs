//! Subscription domain model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Length of the trial granted at registration.
pub const TRIAL_PERIOD_DAYS: i64 = 30;

/// Service tier of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Plan {
    Core,
    Signature,
    Elite,
}

impl Plan {
    /// All known plans, in ascending tier order.
    pub const ALL: [Plan; 3] = [Plan::Core, Plan::Signature, Plan::Elite];

    /// Display label for the console (e.g. "SIGNATURE").
    pub fn label(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Billing status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    Trial,
    Active,
}

/// A subscription row from the `subscriptions` table.
///
/// A user may accumulate several rows over time; readers take the most
/// recently created one as current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    /// Row creation timestamp, assigned by the backend
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new subscription row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub user_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
}

impl NewSubscription {
    /// The default subscription granted at registration: a core-plan trial
    /// expiring [`TRIAL_PERIOD_DAYS`] days from `now`.
    pub fn trial(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            plan: Plan::Core,
            status: SubscriptionStatus::Trial,
            expires_at: now + Duration::days(TRIAL_PERIOD_DAYS),
        }
    }
}
