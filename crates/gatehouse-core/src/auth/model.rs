//! Identity and credential request models.

use serde::{Deserialize, Serialize};

/// The authenticated identity as reported by the hosted auth service.
///
/// The id is an opaque identifier owned by the service; Gatehouse never
/// generates or interprets it beyond equality and use as a foreign key
/// into the `profiles` and `subscriptions` tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Opaque user identifier (UUID format)
    pub id: String,
    /// Email address the account was registered with
    pub email: String,
}

/// Credentials and profile details submitted at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

/// Credentials submitted at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}
