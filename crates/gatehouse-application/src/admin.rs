//! Admin overview assembly.
//!
//! Aggregates the community tables into the numbers the admin view shows.
//! Every input is an eventually-consistent snapshot; nothing here is
//! transactional.

use chrono::NaiveDate;

use gatehouse_core::account::Profile;
use gatehouse_core::event::GateEvent;
use gatehouse_core::property::Property;
use gatehouse_core::subscription::{Plan, Subscription, SubscriptionStatus};

/// How many recent profiles the overview lists.
pub const PROFILE_LIMIT: usize = 10;
/// How many recent events are fetched for the today count.
pub const EVENT_FETCH_LIMIT: usize = 20;
/// How many of the fetched events the overview lists.
pub const EVENT_DISPLAY_LIMIT: usize = 10;

/// Subscription tally per plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanCounts {
    pub core: usize,
    pub signature: usize,
    pub elite: usize,
}

impl PlanCounts {
    pub fn count(&self, plan: Plan) -> usize {
        match plan {
            Plan::Core => self.core,
            Plan::Signature => self.signature,
            Plan::Elite => self.elite,
        }
    }
}

/// Snapshot shown on the admin view.
#[derive(Debug, Clone, Default)]
pub struct AdminOverview {
    /// Number of recently registered users (capped at [`PROFILE_LIMIT`]).
    pub total_users: usize,
    pub recent_profiles: Vec<Profile>,
    pub total_properties: usize,
    /// Events recorded on the current calendar day, among the fetched ones.
    pub events_today: usize,
    pub recent_events: Vec<GateEvent>,
    pub active_subscriptions: usize,
    pub plan_counts: PlanCounts,
}

impl AdminOverview {
    /// Assembles the overview from raw table snapshots.
    ///
    /// `profiles` and `events` are expected newest-first, as the
    /// repositories return them.
    pub fn assemble(
        profiles: Vec<Profile>,
        properties: Vec<Property>,
        mut events: Vec<GateEvent>,
        subscriptions: Vec<Subscription>,
        today: NaiveDate,
    ) -> Self {
        let events_today = events.iter().filter(|e| e.occurred_on(today)).count();
        events.truncate(EVENT_DISPLAY_LIMIT);

        let active_subscriptions = subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .count();

        let mut plan_counts = PlanCounts::default();
        for subscription in &subscriptions {
            match subscription.plan {
                Plan::Core => plan_counts.core += 1,
                Plan::Signature => plan_counts.signature += 1,
                Plan::Elite => plan_counts.elite += 1,
            }
        }

        Self {
            total_users: profiles.len(),
            total_properties: properties.len(),
            events_today,
            recent_events: events,
            active_subscriptions,
            plan_counts,
            recent_profiles: profiles,
        }
    }
}
