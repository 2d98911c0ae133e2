use crate::{occurrence::Occurrence, timespan::TimeSpan};
use chrono::{prelude::*, Duration, SubsecRound};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A booking can never last longer than a day
pub const MAX_EVENT_DURATION_MILLIS: i64 = 1000 * 60 * 60 * 24;

/// The stored row for a booking.
///
/// When `repeat_weekly` is set, `start` and `end` describe the anchor occurrence,
/// the first one of an infinite weekly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub members: String,
    pub repeat_weekly: bool,
}

/// The mutable fields of an `EventDefinition`, i.e. everything but the identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinitionData {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub members: String,
    pub repeat_weekly: bool,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidWindow {
    #[error("The event must end after it starts")]
    EndBeforeStart,
    #[error("An event can not last longer than 24 hours")]
    TooLong,
    #[error("The event is outside of the supported time range")]
    OutOfRange,
}

/// Checks that `end > start` and that the booking lasts at most 24 hours
pub fn validate_window(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<(), InvalidWindow> {
    if end <= start {
        return Err(InvalidWindow::EndBeforeStart);
    }
    if (*end - *start).num_milliseconds() > MAX_EVENT_DURATION_MILLIS {
        return Err(InvalidWindow::TooLong);
    }
    Ok(())
}

impl EventDefinitionData {
    pub fn validate(&self) -> Result<(), InvalidWindow> {
        validate_window(&self.start, &self.end)
    }

    /// Occurrence ids carry millisecond precision, so stored times must not carry more
    pub fn truncate_to_millis(&mut self) {
        self.start = self.start.trunc_subsecs(3);
        self.end = self.end.trunc_subsecs(3);
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn into_definition(self, id: i64) -> EventDefinition {
        EventDefinition {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            members: self.members,
            repeat_weekly: self.repeat_weekly,
        }
    }
}

impl EventDefinition {
    pub fn data(&self) -> EventDefinitionData {
        EventDefinitionData {
            title: self.title.clone(),
            start: self.start,
            end: self.end,
            members: self.members.clone(),
            repeat_weekly: self.repeat_weekly,
        }
    }

    /// Replaces every mutable field, the id is kept
    pub fn replace(&mut self, data: EventDefinitionData) {
        self.title = data.title;
        self.start = data.start;
        self.end = data.end;
        self.members = data.members;
        self.repeat_weekly = data.repeat_weekly;
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.end)
    }

    /// Whether a series generated from this definition has an occurrence starting exactly at `ts`.
    /// For a non recurring definition this is only true for its own start.
    pub fn has_occurrence_at(&self, ts: &DateTime<Utc>) -> bool {
        if !self.repeat_weekly {
            return *ts == self.start;
        }
        let offset = *ts - self.start;
        offset >= Duration::zero() && offset == Duration::weeks(offset.num_weeks())
    }

    /// The occurrence of this definition starting at `start`, keeping the anchor duration
    pub fn occurrence_at(&self, start: DateTime<Utc>) -> Occurrence {
        Occurrence::new(self, start, start + (self.end - self.start))
    }

    pub fn anchor_occurrence(&self) -> Occurrence {
        Occurrence::new(self, self.start, self.end)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn definition(start: &str, end: &str, repeat_weekly: bool) -> EventDefinition {
        EventDefinition {
            id: 1,
            title: "Rehearsal".into(),
            start: ts(start),
            end: ts(end),
            members: "The band".into(),
            repeat_weekly,
        }
    }

    #[test]
    fn accepts_valid_windows() {
        assert!(validate_window(&ts("2024-06-03T18:00:00Z"), &ts("2024-06-03T20:00:00Z")).is_ok());
        // Exactly 24 hours is still allowed
        assert!(validate_window(&ts("2024-06-03T18:00:00Z"), &ts("2024-06-04T18:00:00Z")).is_ok());
    }

    #[test]
    fn rejects_invalid_windows() {
        assert_eq!(
            validate_window(&ts("2024-06-03T18:00:00Z"), &ts("2024-06-03T18:00:00Z")),
            Err(InvalidWindow::EndBeforeStart)
        );
        assert_eq!(
            validate_window(&ts("2024-06-03T18:00:00Z"), &ts("2024-06-03T17:00:00Z")),
            Err(InvalidWindow::EndBeforeStart)
        );
        assert_eq!(
            validate_window(&ts("2024-06-03T18:00:00Z"), &ts("2024-06-04T19:00:00Z")),
            Err(InvalidWindow::TooLong)
        );
        assert_eq!(
            validate_window(&ts("2024-06-03T18:00:00Z"), &ts("2024-06-04T18:00:00.001Z")),
            Err(InvalidWindow::TooLong)
        );
    }

    #[test]
    fn finds_occurrences_on_the_weekly_grid() {
        let series = definition("2024-06-03T18:00:00Z", "2024-06-03T20:00:00Z", true);
        assert!(series.has_occurrence_at(&ts("2024-06-03T18:00:00Z")));
        assert!(series.has_occurrence_at(&ts("2024-06-17T18:00:00Z")));
        assert!(!series.has_occurrence_at(&ts("2024-06-17T19:00:00Z")));
        assert!(!series.has_occurrence_at(&ts("2024-06-04T18:00:00Z")));
        // Before the anchor there is nothing
        assert!(!series.has_occurrence_at(&ts("2024-05-27T18:00:00Z")));

        let single = definition("2024-06-03T18:00:00Z", "2024-06-03T20:00:00Z", false);
        assert!(single.has_occurrence_at(&ts("2024-06-03T18:00:00Z")));
        assert!(!single.has_occurrence_at(&ts("2024-06-10T18:00:00Z")));
    }

    #[test]
    fn truncates_to_milliseconds() {
        let mut data =
            definition("2024-06-03T18:00:00.000500Z", "2024-06-03T20:00:00.999999Z", true).data();
        data.truncate_to_millis();
        assert_eq!(data.start, ts("2024-06-03T18:00:00Z"));
        assert_eq!(data.end, ts("2024-06-03T20:00:00.999Z"));

        // Shorter than a millisecond ends up empty
        let mut data =
            definition("2024-06-03T18:00:00.000100Z", "2024-06-03T18:00:00.000900Z", false).data();
        data.truncate_to_millis();
        assert_eq!(data.validate(), Err(InvalidWindow::EndBeforeStart));
    }

    #[test]
    fn replace_keeps_identity() {
        let mut e = definition("2024-06-03T18:00:00Z", "2024-06-03T20:00:00Z", true);
        let mut data = e.data();
        data.title = "Mixing".into();
        data.repeat_weekly = false;
        e.replace(data);
        assert_eq!(e.id, 1);
        assert_eq!(e.title, "Mixing");
        assert!(!e.repeat_weekly);
    }
}
