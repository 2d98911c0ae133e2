use crate::sync::{react_to, FetchSequencer, MutationTracker, SseDecoder, SyncAction};
use crate::{APIResponse, BaseClient};
use chrono::{DateTime, Utc};
use futures::{future, stream, Stream, StreamExt};
use reqwest::StatusCode;
use std::sync::Arc;
use studio_booking_api_structs::*;
use studio_booking_domain::{KeepOccurrence, OccurrenceId, ScopeChoice, SyncFrame};
use tracing::debug;

#[derive(Clone)]
pub struct CalendarClient {
    base: Arc<BaseClient>,
    fetches: Arc<FetchSequencer>,
    mutations: Arc<MutationTracker>,
}

pub struct GetOccurrencesInput {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct CreateEventInput {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub members: String,
    pub repeat_weekly: bool,
}

pub struct UpdateEventInput {
    pub definition_id: i64,
    pub occurrence_id: Option<OccurrenceId>,
    pub scope: ScopeChoice,
    pub stop_recurring: Option<KeepOccurrence>,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub members: String,
    pub repeat_weekly: bool,
}

pub struct StopRecurringInput {
    pub definition_id: i64,
    pub occurrence_id: Option<OccurrenceId>,
    pub keep: KeepOccurrence,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub members: String,
}

pub struct DeleteEventInput {
    pub definition_id: i64,
    pub occurrence_id: Option<OccurrenceId>,
    pub scope: ScopeChoice,
}

impl CalendarClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self {
            base,
            fetches: Arc::new(FetchSequencer::new()),
            mutations: Arc::new(MutationTracker::new()),
        }
    }

    pub async fn get_occurrences(
        &self,
        input: GetOccurrencesInput,
    ) -> APIResponse<get_occurrences::APIResponse> {
        let query = get_occurrences::QueryParams {
            start: input.start,
            end: input.end,
        };
        self.base.get("occurrences", &query, StatusCode::OK).await
    }

    /// Fetches the visible window. Resolves to `None` when another fetch was
    /// started before this one finished, its result would be outdated.
    pub async fn fetch_visible_window(
        &self,
        input: GetOccurrencesInput,
    ) -> APIResponse<Option<get_occurrences::APIResponse>> {
        let ticket = self.fetches.begin();
        let res = self.get_occurrences(input).await?;
        Ok(self.fetches.accept(ticket, res))
    }

    pub async fn create(&self, input: CreateEventInput) -> APIResponse<create_event::APIResponse> {
        let body = create_event::RequestBody {
            title: input.title,
            start: input.start,
            end: input.end,
            members: input.members,
            repeat_weekly: input.repeat_weekly,
        };
        self.base.post(body, "events", StatusCode::CREATED).await
    }

    /// Resolves to `None` when a newer mutation of the same booking was started meanwhile
    pub async fn update(
        &self,
        input: UpdateEventInput,
    ) -> APIResponse<Option<update_event::APIResponse>> {
        let ticket = self.mutations.begin(input.definition_id);
        let body = update_event::RequestBody {
            occurrence_id: input.occurrence_id,
            scope: input.scope,
            stop_recurring: input.stop_recurring,
            title: input.title,
            start: input.start,
            end: input.end,
            members: input.members,
            repeat_weekly: input.repeat_weekly,
        };
        let res = self
            .base
            .put(
                body,
                &format!("events/{}", input.definition_id),
                StatusCode::OK,
            )
            .await?;
        Ok(self.mutations.accept(ticket, res))
    }

    /// Resolves to `None` when a newer mutation of the same booking was started meanwhile
    pub async fn stop_recurring(
        &self,
        input: StopRecurringInput,
    ) -> APIResponse<Option<stop_recurring::APIResponse>> {
        let ticket = self.mutations.begin(input.definition_id);
        let body = stop_recurring::RequestBody {
            occurrence_id: input.occurrence_id,
            keep: input.keep,
            title: input.title,
            start: input.start,
            end: input.end,
            members: input.members,
        };
        let res = self
            .base
            .post(
                body,
                &format!("events/{}/stop-recurring", input.definition_id),
                StatusCode::OK,
            )
            .await?;
        Ok(self.mutations.accept(ticket, res))
    }

    /// Resolves to `None` when a newer mutation of the same booking was started meanwhile
    pub async fn delete(
        &self,
        input: DeleteEventInput,
    ) -> APIResponse<Option<delete_event::APIResponse>> {
        let ticket = self.mutations.begin(input.definition_id);
        let query = delete_event::QueryParams {
            occurrence_id: input.occurrence_id,
            scope: input.scope,
        };
        let res = self
            .base
            .delete(
                &format!("events/{}", input.definition_id),
                &query,
                StatusCode::OK,
            )
            .await?;
        Ok(self.mutations.accept(ticket, res))
    }

    /// Raw frames of the live sync stream. The stream ends when the connection breaks.
    pub async fn frames(&self) -> APIResponse<impl Stream<Item = SyncFrame>> {
        let res = self.base.open_stream("events/stream").await?;
        let mut decoder = SseDecoder::new();
        let frames = res
            .bytes_stream()
            .take_while(|chunk| {
                if let Err(e) = chunk {
                    debug!("Live sync stream closed: {:?}", e);
                }
                future::ready(chunk.is_ok())
            })
            .filter_map(|chunk| future::ready(chunk.ok()))
            .flat_map(move |chunk| stream::iter(decoder.push(&chunk)));
        Ok(frames)
    }

    /// What this client should do about each live sync message.
    /// Heartbeats and the client's own updates are left out.
    pub async fn listen(&self) -> APIResponse<impl Stream<Item = SyncAction>> {
        let own = self.base.connection_id().clone();
        let actions = self.frames().await?.filter_map(move |frame| {
            let action = match frame {
                SyncFrame::Message(message) => react_to(&message, &own),
                SyncFrame::Heartbeat => SyncAction::Ignore,
            };
            future::ready(match action {
                SyncAction::Ignore => None,
                action => Some(action),
            })
        });
        Ok(actions)
    }
}
