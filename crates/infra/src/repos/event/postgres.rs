use super::IEventRepo;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use studio_booking_domain::{EventDefinition, EventDefinitionData, OccurrenceException, TimeSpan};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    id: i64,
    title: String,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    members: String,
    repeat_weekly: bool,
}

impl From<EventRaw> for EventDefinition {
    fn from(e: EventRaw) -> Self {
        Self {
            id: e.id,
            title: e.title,
            start: e.start_ts,
            end: e.end_ts,
            members: e.members,
            repeat_weekly: e.repeat_weekly,
        }
    }
}

#[derive(Debug, FromRow)]
struct ExceptionRaw {
    event_id: i64,
    occurrence_start: DateTime<Utc>,
}

impl From<ExceptionRaw> for OccurrenceException {
    fn from(e: ExceptionRaw) -> Self {
        Self::new(e.event_id, e.occurrence_start)
    }
}

const EVENT_COLUMNS: &str = "id, title, start_ts, end_ts, members, repeat_weekly";

async fn insert_definition_tx(
    tx: &mut Transaction<'_, Postgres>,
    data: &EventDefinitionData,
) -> anyhow::Result<EventDefinition> {
    let e: EventRaw = sqlx::query_as(&format!(
        r#"
        INSERT INTO calendar_events(title, start_ts, end_ts, members, repeat_weekly)
        VALUES($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        EVENT_COLUMNS
    ))
    .bind(&data.title)
    .bind(data.start)
    .bind(data.end)
    .bind(&data.members)
    .bind(data.repeat_weekly)
    .fetch_one(&mut **tx)
    .await?;
    Ok(e.into())
}

async fn update_definition_tx(
    tx: &mut Transaction<'_, Postgres>,
    e: &EventDefinition,
) -> anyhow::Result<()> {
    let res = sqlx::query(
        r#"
        UPDATE calendar_events
        SET title = $2, start_ts = $3, end_ts = $4, members = $5, repeat_weekly = $6
        WHERE id = $1
        "#,
    )
    .bind(e.id)
    .bind(&e.title)
    .bind(e.start)
    .bind(e.end)
    .bind(&e.members)
    .bind(e.repeat_weekly)
    .execute(&mut **tx)
    .await?;
    if res.rows_affected() == 0 {
        anyhow::bail!("Calendar event with id: {} was not found", e.id);
    }
    Ok(())
}

async fn delete_definition_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> anyhow::Result<Option<EventDefinition>> {
    let e: Option<EventRaw> = sqlx::query_as(&format!(
        "DELETE FROM calendar_events WHERE id = $1 RETURNING {}",
        EVENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(e.map(|e| e.into()))
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert_definition(
        &self,
        data: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition> {
        let mut tx = self.pool.begin().await?;
        let e = insert_definition_tx(&mut tx, data).await?;
        tx.commit().await?;
        Ok(e)
    }

    async fn update_definition(&self, e: &EventDefinition) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        update_definition_tx(&mut tx, e).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_definition(&self, id: i64) -> anyhow::Result<Option<EventDefinition>> {
        let e: Option<EventRaw> = sqlx::query_as(&format!(
            "SELECT {} FROM calendar_events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(e.map(|e| e.into()))
    }

    async fn delete_definition(&self, id: i64) -> anyhow::Result<Option<EventDefinition>> {
        let mut tx = self.pool.begin().await?;
        let e = delete_definition_tx(&mut tx, id).await?;
        tx.commit().await?;
        Ok(e)
    }

    async fn find_definitions_overlapping(
        &self,
        span: &TimeSpan,
    ) -> anyhow::Result<Vec<EventDefinition>> {
        let events: Vec<EventRaw> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM calendar_events
            WHERE (start_ts < $2 AND end_ts > $1) OR repeat_weekly
            "#,
            EVENT_COLUMNS
        ))
        .bind(span.start())
        .bind(span.end())
        .fetch_all(&self.pool)
        .await?;
        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    async fn insert_exception(&self, exception: &OccurrenceException) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_event_exceptions(event_id, occurrence_start)
            VALUES($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(exception.event_id)
        .bind(exception.occurrence_start)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_exceptions_for_event(&self, event_id: i64) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM calendar_event_exceptions WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn find_exceptions_for_events(
        &self,
        event_ids: &[i64],
    ) -> anyhow::Result<Vec<OccurrenceException>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let exceptions: Vec<ExceptionRaw> = sqlx::query_as(
            r#"
            SELECT event_id, occurrence_start FROM calendar_event_exceptions
            WHERE event_id = ANY($1)
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(exceptions.into_iter().map(|e| e.into()).collect())
    }

    async fn replace_occurrence(
        &self,
        exception: &OccurrenceException,
        replacement: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO calendar_event_exceptions(event_id, occurrence_start)
            VALUES($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(exception.event_id)
        .bind(exception.occurrence_start)
        .execute(&mut *tx)
        .await?;
        let e = insert_definition_tx(&mut tx, replacement).await?;
        tx.commit().await?;
        Ok(e)
    }

    async fn update_series(
        &self,
        e: &EventDefinition,
        clear_exceptions: bool,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        update_definition_tx(&mut tx, e).await?;
        if clear_exceptions {
            sqlx::query("DELETE FROM calendar_event_exceptions WHERE event_id = $1")
                .bind(e.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn convert_to_single(
        &self,
        series_id: i64,
        single: &EventDefinitionData,
    ) -> anyhow::Result<EventDefinition> {
        let mut tx = self.pool.begin().await?;
        let e = insert_definition_tx(&mut tx, single).await?;
        if delete_definition_tx(&mut tx, series_id).await?.is_none() {
            anyhow::bail!("Calendar event with id: {} was not found", series_id);
        }
        tx.commit().await?;
        Ok(e)
    }
}
