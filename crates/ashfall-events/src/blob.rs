//! Wire schema for schedule persistence.
//!
//! The telemetry backend stores a schedule as one JSON object per session:
//! round numbers map to lists of plain key/value records. The same shape is
//! sent on `emit` and received on `restore`, so a session can be replayed
//! from the backend instead of re-rolled locally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::event::{SicknessEvent, StatusChange};

/// One event as it appears on the wire.
///
/// The round number is carried by the enclosing map key, not the record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub npc_id: u32,
    pub timestamp: f32,
    pub change_type: StatusChange,
}

impl EventRecord {
    /// Rebuilds the full event given the round the record was filed under.
    pub fn into_event(self, round_no: u32) -> SicknessEvent {
        SicknessEvent {
            npc_id: self.npc_id,
            round_no,
            timestamp: self.timestamp,
            change: self.change_type,
        }
    }
}

impl From<SicknessEvent> for EventRecord {
    fn from(event: SicknessEvent) -> Self {
        Self {
            npc_id: event.npc_id,
            timestamp: event.timestamp,
            change_type: event.change,
        }
    }
}

/// Per-round event lists, keyed by round number.
///
/// JSON object keys are strings; serde parses them back into integers, so a
/// non-numeric round key fails deserialization instead of producing an
/// empty schedule.
pub type ScheduleData = BTreeMap<u32, Vec<EventRecord>>;

/// The restore payload.
///
/// `data` is null when the backend has no schedule for this session yet; it
/// is never simply absent, and a payload missing the key is malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBlob {
    #[serde(deserialize_with = "Option::deserialize")]
    pub data: Option<ScheduleData>,
}

impl ScheduleBlob {
    /// Wraps per-round data into a blob.
    pub fn new(data: ScheduleData) -> Self {
        Self { data: Some(data) }
    }

    /// A blob the backend sends when no schedule has been stored yet.
    pub fn empty() -> Self {
        Self { data: None }
    }

    /// Parses a blob from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the blob to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Returns all events in (round, timestamp) file order.
    pub fn events(&self) -> Vec<SicknessEvent> {
        let mut events = Vec::new();
        if let Some(data) = &self.data {
            for (&round_no, records) in data {
                events.extend(records.iter().map(|r| r.into_event(round_no)));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip_through_round_key() {
        let event = SicknessEvent::new(17, 8, 135.5, StatusChange::GoToBathhouse);
        let record = EventRecord::from(event);
        assert_eq!(record.into_event(8), event);
    }

    #[test]
    fn test_blob_json_shape() {
        let mut data = ScheduleData::new();
        data.insert(
            7,
            vec![EventRecord {
                npc_id: 3,
                timestamp: 360.0,
                change_type: StatusChange::Die,
            }],
        );
        let json = ScheduleBlob::new(data).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"data":{"7":[{"npc_id":3,"timestamp":360.0,"change_type":2}]}}"#
        );
    }

    #[test]
    fn test_blob_parses_string_round_keys() {
        let json = r#"{"data":{"7":[{"npc_id":0,"timestamp":300.0,"change_type":0}]}}"#;
        let blob = ScheduleBlob::from_json(json).unwrap();
        let events = blob.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].round_no, 7);
        assert_eq!(events[0].change, StatusChange::Sickness);
    }

    #[test]
    fn test_blob_null_data() {
        let blob = ScheduleBlob::from_json(r#"{"data":null}"#).unwrap();
        assert_eq!(blob, ScheduleBlob::empty());
        assert!(blob.events().is_empty());
    }

    #[test]
    fn test_blob_missing_data_key_is_malformed() {
        assert!(ScheduleBlob::from_json(r#"{}"#).is_err());
    }

    #[test]
    fn test_blob_non_numeric_round_key_is_malformed() {
        let json = r#"{"data":{"lobby":[{"npc_id":0,"timestamp":1.0,"change_type":0}]}}"#;
        assert!(ScheduleBlob::from_json(json).is_err());
    }

    #[test]
    fn test_blob_roundtrip() {
        let mut data = ScheduleData::new();
        data.insert(
            9,
            vec![
                EventRecord {
                    npc_id: 5,
                    timestamp: 300.0,
                    change_type: StatusChange::Sickness,
                },
                EventRecord {
                    npc_id: 5,
                    timestamp: 412.7,
                    change_type: StatusChange::Die,
                },
            ],
        );
        data.insert(
            10,
            vec![EventRecord {
                npc_id: 19,
                timestamp: 88.0,
                change_type: StatusChange::GoToBathhouse,
            }],
        );
        let blob = ScheduleBlob::new(data);
        let parsed = ScheduleBlob::from_json(&blob.to_json().unwrap()).unwrap();
        assert_eq!(parsed, blob);
    }
}
