use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::event::Event;

/// One event as stored in an aggregate's change history.
///
/// `sequence_number` is the aggregate version the event produced, so the
/// entries of one aggregate sort into the order they were applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub sequence_number: u64,
    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,
    pub payload: JsonValue,
}

impl HistoryEntry {
    pub fn from_event<E>(
        aggregate_type: impl Into<String>,
        aggregate_id: impl core::fmt::Display,
        sequence_number: u64,
        event: &E,
    ) -> Result<Self, serde_json::Error>
    where
        E: Event + Serialize,
    {
        Ok(Self {
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.to_string(),
            sequence_number,
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload: serde_json::to_value(event)?,
        })
    }

    /// Store key; zero-padded so keys sort by sequence within an aggregate.
    pub fn key(&self) -> String {
        format!("{}-{:08}", self.aggregate_id, self.sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, Serialize)]
    struct Renamed {
        name: String,
        at: DateTime<Utc>,
    }

    impl Event for Renamed {
        fn event_type(&self) -> &'static str {
            "parties.party.updated"
        }

        fn version(&self) -> u32 {
            2
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    #[test]
    fn captures_event_metadata_and_payload() {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 10, 30, 0).unwrap();
        let event = Renamed {
            name: "Asha Traders".to_string(),
            at,
        };

        let entry = HistoryEntry::from_event("party", "p-1", 3, &event).unwrap();
        assert_eq!(entry.event_type, "parties.party.updated");
        assert_eq!(entry.event_version, 2);
        assert_eq!(entry.occurred_at, at);
        assert_eq!(entry.payload["name"], "Asha Traders");
        assert_eq!(entry.key(), "p-1-00000003");
    }

    #[test]
    fn keys_sort_by_sequence() {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let event = Renamed {
            name: String::new(),
            at,
        };
        let k9 = HistoryEntry::from_event("party", "p", 9, &event).unwrap().key();
        let k10 = HistoryEntry::from_event("party", "p", 10, &event).unwrap().key();
        assert!(k9 < k10);
    }
}
