//! Subscription domain module.
//!
//! - `model`: Plan, status, and subscription models backed by the
//!   `subscriptions` table
//! - `repository`: Repository trait for subscription persistence

mod model;
mod repository;

pub use model::{NewSubscription, Plan, Subscription, SubscriptionStatus, TRIAL_PERIOD_DAYS};
pub use repository::SubscriptionRepository;
