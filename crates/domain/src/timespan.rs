use chrono::{prelude::*, Duration};
use serde::{Deserialize, Serialize};

/// A half open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// An empty or inverted span can not be queried
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn greater_than(&self, duration_millis: i64) -> bool {
        self.duration().num_milliseconds() > duration_millis
    }

    /// `start < other.end AND end > other.start`. Touching intervals do not overlap.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && self.end > other.start
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn span(start: &str, end: &str) -> TimeSpan {
        TimeSpan::new(start.parse().unwrap(), end.parse().unwrap())
    }

    #[test]
    fn overlap_is_half_open() {
        let window = span("2024-06-01T00:00:00Z", "2024-06-02T00:00:00Z");
        assert!(window.overlaps(&span("2024-05-31T23:00:00Z", "2024-06-01T01:00:00Z")));
        assert!(window.overlaps(&span("2024-06-01T23:00:00Z", "2024-06-02T01:00:00Z")));
        assert!(!window.overlaps(&span("2024-06-02T00:00:00Z", "2024-06-02T01:00:00Z")));
        assert!(!window.overlaps(&span("2024-05-31T23:00:00Z", "2024-06-01T00:00:00Z")));
    }

    #[test]
    fn duration_limits() {
        let window = span("2024-06-01T00:00:00Z", "2024-06-02T00:00:00Z");
        assert!(!window.greater_than(1000 * 60 * 60 * 24));
        assert!(window.greater_than(1000 * 60 * 60 * 24 - 1));
        assert!(!window.is_empty());
        assert!(span("2024-06-01T00:00:00Z", "2024-06-01T00:00:00Z").is_empty());
    }
}
