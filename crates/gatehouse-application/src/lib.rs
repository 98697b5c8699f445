//! Use-case layer for the Gatehouse access console.
//!
//! Orchestrates the domain over the infrastructure ports: session
//! lifecycle and auth-state fan-out, the simulated gate actuator, ambient
//! dashboard activity, and the admin overview.

pub mod admin;
pub mod ambient;
pub mod feed;
pub mod gate_service;
pub mod session_controller;
pub mod view_state;

#[cfg(test)]
mod session_controller_test;

pub use admin::{AdminOverview, PlanCounts};
pub use ambient::{AmbientSimulator, SensorPulse};
pub use feed::ActivityFeed;
pub use gate_service::GateService;
pub use session_controller::{AuthSubscription, SessionController};
pub use view_state::ViewState;
