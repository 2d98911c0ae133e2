mod inmemory;
mod postgres;

pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;
use studio_booking_domain::{EventDefinition, EventDefinitionData, OccurrenceException, TimeSpan};

/// Storage of `EventDefinition`s and their `OccurrenceException`s.
///
/// Exceptions belong to their definition: deleting a definition removes its
/// exceptions in the same atomic operation. Every write failure surfaces as an error
/// and nothing is retried.
#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    /// Assigns a new identity and returns the stored definition
    async fn insert_definition(&self, data: &EventDefinitionData)
        -> anyhow::Result<EventDefinition>;
    /// Full replace of the mutable fields
    async fn update_definition(&self, e: &EventDefinition) -> anyhow::Result<()>;
    async fn find_definition(&self, id: i64) -> anyhow::Result<Option<EventDefinition>>;
    /// Removes the definition together with all of its exceptions
    async fn delete_definition(&self, id: i64) -> anyhow::Result<Option<EventDefinition>>;
    /// Definitions where `(start < span.end AND end > span.start) OR repeat_weekly`.
    /// Recurring definitions are always returned, their anchor can be arbitrarily old.
    async fn find_definitions_overlapping(
        &self,
        span: &TimeSpan,
    ) -> anyhow::Result<Vec<EventDefinition>>;
    /// Idempotent, inserting an existing key is a no-op
    async fn insert_exception(&self, exception: &OccurrenceException) -> anyhow::Result<()>;
    /// Returns the number of removed exceptions
    async fn delete_exceptions_for_event(&self, event_id: i64) -> anyhow::Result<u64>;
    async fn find_exceptions_for_events(
        &self,
        event_ids: &[i64],
    ) -> anyhow::Result<Vec<OccurrenceException>>;
    /// Cancels one occurrence of a series and stores its replacement as a new definition
    async fn replace_occurrence(
        &self,
        exception: &OccurrenceException,
        replacement: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition>;
    /// Full replace of a series, optionally clearing all of its exceptions in the same write
    async fn update_series(&self, e: &EventDefinition, clear_exceptions: bool)
        -> anyhow::Result<()>;
    /// Stores `single` as a new definition and deletes the whole series `series_id`
    async fn convert_to_single(
        &self,
        series_id: i64,
        single: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition>;
}
