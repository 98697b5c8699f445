//! Console view state.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Which console view is currently in front.
///
/// Ambient simulation is gated on the dashboard being the active view;
/// the admin view additionally requires the admin role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActiveView {
    #[default]
    Dashboard,
    Cameras,
    Pricing,
    Admin,
}
