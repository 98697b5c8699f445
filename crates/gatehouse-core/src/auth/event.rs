use serde::{Deserialize, Serialize};

use super::model::AuthUser;

/// Auth-state changes pushed by the backend client.
///
/// The hosted client library fires these when an auth action completes
/// locally: the initial session resolution at startup, sign-in, sign-out,
/// and access-token refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthChange {
    /// First resolution after startup; may carry an already-valid user.
    InitialSession { user: Option<AuthUser> },
    /// A sign-in completed successfully.
    SignedIn { user: AuthUser },
    /// The session ended (explicit sign-out or invalidation).
    SignedOut,
    /// The access token was refreshed for a still-valid session.
    TokenRefreshed { user: AuthUser },
}

impl AuthChange {
    /// The user carried by this event, if the event leaves one signed in.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::InitialSession { user } => user.as_ref(),
            Self::SignedIn { user } | Self::TokenRefreshed { user } => Some(user),
            Self::SignedOut => None,
        }
    }

    /// Short tag for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitialSession { .. } => "initial_session",
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed { .. } => "token_refreshed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            id: "5b3f0a9e-2c1d-4a8f-9d2e-000000000001".to_string(),
            email: "resident@example.com".to_string(),
        }
    }

    #[test]
    fn test_user_accessor() {
        assert!(AuthChange::SignedOut.user().is_none());
        assert!(AuthChange::InitialSession { user: None }.user().is_none());
        assert_eq!(
            AuthChange::SignedIn { user: user() }.user().map(|u| u.id.as_str()),
            Some("5b3f0a9e-2c1d-4a8f-9d2e-000000000001")
        );
        assert!(AuthChange::TokenRefreshed { user: user() }.user().is_some());
    }

    #[test]
    fn test_serializes_with_snake_case_tag() {
        let json = serde_json::to_string(&AuthChange::SignedOut).expect("serialize");
        assert!(json.contains("\"signed_out\""));
    }
}
