//! Session domain model.
//!
//! A session is the authenticated identity plus the cached profile and
//! subscription rows belonging to it. It is owned exclusively by the
//! session controller: created on sign-in, cleared on sign-out, with the
//! cached rows refetched on demand.

use serde::{Deserialize, Serialize};

use crate::account::Profile;
use crate::auth::AuthUser;
use crate::subscription::Subscription;

/// The authenticated user's session snapshot.
///
/// Profile and subscription are cached best-effort: either may be absent
/// when the corresponding fetch failed or the rows were never provisioned,
/// in which case the dashboard simply shows less.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: AuthUser,
    pub profile: Option<Profile>,
    pub subscription: Option<Subscription>,
}

impl Session {
    /// Creates a session for a freshly authenticated user with no cached
    /// rows yet.
    pub fn new(user: AuthUser) -> Self {
        Self {
            user,
            profile: None,
            subscription: None,
        }
    }

    /// Whether the session's profile grants admin access.
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(Profile::is_admin)
    }

    /// Name shown in the console header: the profile's full name when
    /// available, otherwise the account email.
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.full_name.as_str())
            .unwrap_or(self.user.email.as_str())
    }

    /// Plan label for the console header, e.g. "CORE".
    pub fn plan_label(&self) -> Option<String> {
        self.subscription.as_ref().map(|s| s.plan.label())
    }
}
