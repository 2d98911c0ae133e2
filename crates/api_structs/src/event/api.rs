use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studio_booking_domain::{
    DeleteScope, KeepOccurrence, MutationScope, Occurrence, OccurrenceId, ScopeChoice,
};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceResponse {
    pub occurrence: Occurrence,
}

impl OccurrenceResponse {
    pub fn new(occurrence: Occurrence) -> Self {
        Self { occurrence }
    }
}

/// Result of an update. `occurrence` is what the client should show in place
/// of the edited occurrence.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub scope: MutationScope,
    pub occurrence: Occurrence,
}

#[derive(Deserialize)]
pub struct EventPathParams {
    pub definition_id: i64,
}

pub mod create_event {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: String,
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
        #[serde(default)]
        pub members: String,
        #[serde(default)]
        pub repeat_weekly: bool,
    }

    pub type APIResponse = OccurrenceResponse;
}

pub mod update_event {
    use super::*;

    pub type PathParams = EventPathParams;

    #[derive(Serialize, Deserialize, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// The occurrence that was edited, required for single occurrence edits
        #[serde(default)]
        pub occurrence_id: Option<OccurrenceId>,
        pub scope: ScopeChoice,
        #[serde(default)]
        pub stop_recurring: Option<KeepOccurrence>,
        pub title: String,
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
        #[serde(default)]
        pub members: String,
        #[serde(default)]
        pub repeat_weekly: bool,
    }

    pub type APIResponse = MutationResponse;
}

pub mod stop_recurring {
    use super::*;

    pub type PathParams = EventPathParams;

    #[derive(Serialize, Deserialize, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub occurrence_id: Option<OccurrenceId>,
        pub keep: KeepOccurrence,
        pub title: String,
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
        #[serde(default)]
        pub members: String,
    }

    pub type APIResponse = MutationResponse;
}

pub mod delete_event {
    use super::*;

    pub type PathParams = EventPathParams;

    #[derive(Serialize, Deserialize, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        #[serde(default)]
        pub occurrence_id: Option<OccurrenceId>,
        pub scope: ScopeChoice,
    }

    #[derive(Deserialize, Serialize, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub scope: DeleteScope,
    }
}
