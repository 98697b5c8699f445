//! Property domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed property row from the `properties` table.
///
/// Gatehouse only counts these for the admin overview; rows are provisioned
/// out of band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub created_at: DateTime<Utc>,
}
