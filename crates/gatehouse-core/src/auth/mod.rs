//! Authentication domain module.
//!
//! This module contains the identity models, the auth-state change events
//! pushed by the backend client, local input validation, and the gateway
//! trait the infrastructure layer implements.
//!
//! # Module Structure
//!
//! - `model`: Identity and request models (`AuthUser`, `SignUpRequest`, ...)
//! - `event`: Auth-state change events (`AuthChange`)
//! - `validate`: Local input validation performed before any network call
//! - `gateway`: Gateway trait for the hosted auth service

mod event;
mod gateway;
mod model;
mod validate;

// Re-export public API
pub use event::AuthChange;
pub use gateway::AuthGateway;
pub use model::{AuthUser, SignInRequest, SignUpRequest};
pub use validate::{MIN_PASSWORD_LEN, normalize_email, validate_sign_in, validate_sign_up};
