//! Recorded gate event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded event row from the `events` table.
///
/// These are written by the on-site controllers; Gatehouse reads them for
/// the admin overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateEvent {
    pub id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl GateEvent {
    /// Whether the event was recorded on the given calendar day (UTC).
    pub fn occurred_on(&self, day: chrono::NaiveDate) -> bool {
        self.created_at.date_naive() == day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_occurred_on_compares_calendar_days() {
        let event = GateEvent {
            id: "e-1".to_string(),
            message: "main gate opened successfully".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 7, 14, 23, 59, 0).unwrap(),
        };

        assert!(event.occurred_on(Utc.with_ymd_and_hms(2025, 7, 14, 0, 0, 0).unwrap().date_naive()));
        assert!(!event.occurred_on(Utc.with_ymd_and_hms(2025, 7, 15, 0, 0, 0).unwrap().date_naive()));
    }
}
