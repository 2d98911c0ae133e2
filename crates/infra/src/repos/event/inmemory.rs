use super::IEventRepo;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use studio_booking_domain::{EventDefinition, EventDefinitionData, OccurrenceException, TimeSpan};

#[derive(Default)]
struct Tables {
    definitions: BTreeMap<i64, EventDefinition>,
    exceptions: BTreeSet<(i64, chrono::DateTime<chrono::Utc>)>,
    next_id: i64,
}

impl Tables {
    fn insert_definition(&mut self, data: &EventDefinitionData) -> EventDefinition {
        self.next_id += 1;
        let e = data.clone().into_definition(self.next_id);
        self.definitions.insert(e.id, e.clone());
        e
    }

    fn update_definition(&mut self, e: &EventDefinition) -> anyhow::Result<()> {
        match self.definitions.get_mut(&e.id) {
            Some(stored) => {
                *stored = e.clone();
                Ok(())
            }
            None => anyhow::bail!("Calendar event with id: {} was not found", e.id),
        }
    }

    fn delete_exceptions_for_event(&mut self, event_id: i64) -> u64 {
        let before = self.exceptions.len();
        self.exceptions.retain(|(id, _)| *id != event_id);
        (before - self.exceptions.len()) as u64
    }

    fn delete_definition(&mut self, id: i64) -> Option<EventDefinition> {
        let e = self.definitions.remove(&id)?;
        self.delete_exceptions_for_event(id);
        Some(e)
    }

    fn insert_exception(&mut self, exception: &OccurrenceException) -> anyhow::Result<()> {
        if !self.definitions.contains_key(&exception.event_id) {
            anyhow::bail!(
                "Calendar event with id: {} was not found",
                exception.event_id
            );
        }
        self.exceptions
            .insert((exception.event_id, exception.occurrence_start));
        Ok(())
    }
}

/// Every operation takes the single table lock, which makes the composite
/// writes atomic just like a database transaction.
#[derive(Default)]
pub struct InMemoryEventRepo {
    tables: Mutex<Tables>,
}

impl InMemoryEventRepo {
    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("In memory event tables are poisoned"))
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert_definition(
        &self,
        data: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition> {
        Ok(self.lock()?.insert_definition(data))
    }

    async fn update_definition(&self, e: &EventDefinition) -> anyhow::Result<()> {
        self.lock()?.update_definition(e)
    }

    async fn find_definition(&self, id: i64) -> anyhow::Result<Option<EventDefinition>> {
        Ok(self.lock()?.definitions.get(&id).cloned())
    }

    async fn delete_definition(&self, id: i64) -> anyhow::Result<Option<EventDefinition>> {
        Ok(self.lock()?.delete_definition(id))
    }

    async fn find_definitions_overlapping(
        &self,
        span: &TimeSpan,
    ) -> anyhow::Result<Vec<EventDefinition>> {
        let tables = self.lock()?;
        Ok(tables
            .definitions
            .values()
            .filter(|e| e.repeat_weekly || (e.start < span.end() && e.end > span.start()))
            .cloned()
            .collect())
    }

    async fn insert_exception(&self, exception: &OccurrenceException) -> anyhow::Result<()> {
        self.lock()?.insert_exception(exception)
    }

    async fn delete_exceptions_for_event(&self, event_id: i64) -> anyhow::Result<u64> {
        Ok(self.lock()?.delete_exceptions_for_event(event_id))
    }

    async fn find_exceptions_for_events(
        &self,
        event_ids: &[i64],
    ) -> anyhow::Result<Vec<OccurrenceException>> {
        let tables = self.lock()?;
        Ok(tables
            .exceptions
            .iter()
            .filter(|(id, _)| event_ids.contains(id))
            .map(|(id, start)| OccurrenceException::new(*id, *start))
            .collect())
    }

    async fn replace_occurrence(
        &self,
        exception: &OccurrenceException,
        replacement: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition> {
        let mut tables = self.lock()?;
        tables.insert_exception(exception)?;
        Ok(tables.insert_definition(replacement))
    }

    async fn update_series(
        &self,
        e: &EventDefinition,
        clear_exceptions: bool,
    ) -> anyhow::Result<()> {
        let mut tables = self.lock()?;
        tables.update_definition(e)?;
        if clear_exceptions {
            tables.delete_exceptions_for_event(e.id);
        }
        Ok(())
    }

    async fn convert_to_single(
        &self,
        series_id: i64,
        single: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition> {
        let mut tables = self.lock()?;
        if !tables.definitions.contains_key(&series_id) {
            anyhow::bail!("Calendar event with id: {} was not found", series_id);
        }
        let e = tables.insert_definition(single);
        tables.delete_definition(series_id);
        Ok(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn default_repo_starts_empty() {
        let repo = InMemoryEventRepo::default();
        let start = "2024-06-03T18:00:00Z".parse().unwrap();
        let span = TimeSpan::new(start, "2024-06-10T18:00:00Z".parse().unwrap());
        assert!(repo.find_definitions_overlapping(&span).await.unwrap().is_empty());

        let e = repo
            .insert_definition(&EventDefinitionData {
                title: "Tracking".into(),
                start,
                end: "2024-06-03T19:00:00Z".parse().unwrap(),
                members: "".into(),
                repeat_weekly: false,
            })
            .await
            .unwrap();
        assert_eq!(e.id, 1);
        assert_eq!(repo.find_definition(1).await.unwrap(), Some(e));
    }
}
