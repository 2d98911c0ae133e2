use crate::definition::EventDefinition;
use chrono::{prelude::*, SecondsFormat};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Formats a timestamp the way browsers do with `Date.prototype.toISOString`,
/// e.g. `2024-06-10T18:00:00.000Z`
pub fn format_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Identifies one displayed instance of a definition.
///
/// The wire format is `<definitionId>R<occurrenceStartISO8601>` and clients rely on it
/// being reproduced exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceId {
    pub definition_id: i64,
    pub start: DateTime<Utc>,
}

impl OccurrenceId {
    pub fn new(definition_id: i64, start: DateTime<Utc>) -> Self {
        Self {
            definition_id,
            start,
        }
    }
}

impl Display for OccurrenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}R{}", self.definition_id, format_iso(&self.start))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidOccurrenceId {
    #[error("Occurrence id: {0} is malformed")]
    Malformed(String),
}

impl FromStr for OccurrenceId {
    type Err = InvalidOccurrenceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidOccurrenceId::Malformed(s.to_string());
        let (id, start) = s.split_once('R').ok_or_else(malformed)?;
        let definition_id = id.parse::<i64>().map_err(|_| malformed())?;
        let start = DateTime::parse_from_rfc3339(start)
            .map_err(|_| malformed())?
            .with_timezone(&Utc);
        Ok(Self::new(definition_id, start))
    }
}

impl Serialize for OccurrenceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OccurrenceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct OccurrenceIdVisitor;

        impl<'de> Visitor<'de> for OccurrenceIdVisitor {
            type Value = OccurrenceId;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A valid occurrence id representation")
            }

            fn visit_str<E>(self, value: &str) -> Result<OccurrenceId, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<OccurrenceId>()
                    .map_err(|_| E::custom(format!("Malformed occurrence id: {}", value)))
            }
        }

        deserializer.deserialize_str(OccurrenceIdVisitor)
    }
}

/// One concrete calendar instance of an `EventDefinition`. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub members: String,
    pub repeat_weekly: bool,
    pub definition_id: i64,
}

impl Occurrence {
    pub fn new(definition: &EventDefinition, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: OccurrenceId::new(definition.id, start),
            title: definition.title.clone(),
            start,
            end,
            members: definition.members.clone(),
            repeat_weekly: definition.repeat_weekly,
            definition_id: definition.id,
        }
    }
}
