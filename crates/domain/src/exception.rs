use chrono::prelude::*;
use serde::{Deserialize, Serialize};

/// Cancels the weekly occurrence of `event_id` that starts exactly at `occurrence_start`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceException {
    pub event_id: i64,
    pub occurrence_start: DateTime<Utc>,
}

impl OccurrenceException {
    pub fn new(event_id: i64, occurrence_start: DateTime<Utc>) -> Self {
        Self {
            event_id,
            occurrence_start,
        }
    }
}
