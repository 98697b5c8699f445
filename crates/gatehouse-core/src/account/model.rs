//! Resident profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Access role attached to a profile.
///
/// Admins additionally see the community-wide overview; everyone else is a
/// viewer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Viewer,
    Admin,
}

/// A resident profile row from the `profiles` table.
///
/// The id equals the auth user id; the row is created best-effort right
/// after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile id, equal to the owning auth user id
    pub id: String,
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    /// Row creation timestamp, assigned by the backend
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Whether this profile grants access to the admin overview.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Insert payload for a new profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub role: Role,
}

impl NewProfile {
    /// The default profile created at registration: a viewer.
    pub fn viewer(id: impl Into<String>, full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            phone: phone.into(),
            role: Role::Viewer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("admin".parse::<Role>().expect("parse"), Role::Admin);
        assert_eq!("Viewer".parse::<Role>().expect("parse"), Role::Viewer);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Admin).expect("serialize");
        assert_eq!(json, "\"admin\"");
    }

    #[test]
    fn test_new_profile_defaults_to_viewer() {
        let profile = NewProfile::viewer("u-1", "Dana Levi", "050-1234567");
        assert_eq!(profile.role, Role::Viewer);
    }
}
