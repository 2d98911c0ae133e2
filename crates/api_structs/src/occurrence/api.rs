use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studio_booking_domain::Occurrence;

pub mod get_occurrences {
    use super::*;

    #[derive(Serialize, Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
    }

    #[derive(Deserialize, Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub occurrences: Vec<Occurrence>,
    }
}
