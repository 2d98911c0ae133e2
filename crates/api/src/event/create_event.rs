use crate::{
    error::BookingError,
    event::subscribers::{BroadcastCalendarChanged, CalendarMutation},
    shared::{
        connection::origin_connection_id,
        usecase::{execute, Subscriber, UseCase},
        validation::{validate_booking, InvalidBooking},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use studio_booking_api_structs::create_event::*;
use studio_booking_domain::{EventDefinitionData, Occurrence};
use studio_booking_infra::BookingContext;

fn handle_error(e: UseCaseErrors) -> BookingError {
    match e {
        UseCaseErrors::InvalidBooking(e) => e.into(),
        UseCaseErrors::StorageError => BookingError::InternalError,
    }
}

pub async fn create_event_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let body = body.0;
    let usecase = CreateEventUseCase {
        data: EventDefinitionData {
            title: body.title,
            start: body.start,
            end: body.end,
            members: body.members,
            repeat_weekly: body.repeat_weekly,
        },
        origin: origin_connection_id(&http_req),
    };

    execute(usecase, &ctx)
        .await
        .map(|occurrence| HttpResponse::Created().json(APIResponse::new(occurrence)))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub data: EventDefinitionData,
    pub origin: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidBooking(InvalidBooking),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = Occurrence;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Errors> {
        validate_booking(&mut self.data).map_err(UseCaseErrors::InvalidBooking)?;

        let e = ctx
            .repos
            .events
            .insert_definition(&self.data)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        Ok(e.anchor_occurrence())
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(BroadcastCalendarChanged)]
    }
}

impl CalendarMutation for CreateEventUseCase {
    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use studio_booking_domain::{
        EventDefinition, InvalidWindow, OccurrenceException, SyncFrame, TimeSpan,
    };
    use studio_booking_infra::{Config, IEventRepo, LiveSync, Repos};

    /// Fails every call and counts how often it was called
    struct CountingEventRepo {
        calls: AtomicUsize,
    }

    impl CountingEventRepo {
        fn hit<T>(&self) -> anyhow::Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("Not available in tests"))
        }
    }

    #[async_trait::async_trait]
    impl IEventRepo for CountingEventRepo {
        async fn insert_definition(
            &self,
            _data: &EventDefinitionData,
        ) -> anyhow::Result<EventDefinition> {
            self.hit()
        }
        async fn update_definition(&self, _e: &EventDefinition) -> anyhow::Result<()> {
            self.hit()
        }
        async fn find_definition(&self, _id: i64) -> anyhow::Result<Option<EventDefinition>> {
            self.hit()
        }
        async fn delete_definition(&self, _id: i64) -> anyhow::Result<Option<EventDefinition>> {
            self.hit()
        }
        async fn find_definitions_overlapping(
            &self,
            _span: &TimeSpan,
        ) -> anyhow::Result<Vec<EventDefinition>> {
            self.hit()
        }
        async fn insert_exception(&self, _exception: &OccurrenceException) -> anyhow::Result<()> {
            self.hit()
        }
        async fn delete_exceptions_for_event(&self, _event_id: i64) -> anyhow::Result<u64> {
            self.hit()
        }
        async fn find_exceptions_for_events(
            &self,
            _event_ids: &[i64],
        ) -> anyhow::Result<Vec<OccurrenceException>> {
            self.hit()
        }
        async fn replace_occurrence(
            &self,
            _exception: &OccurrenceException,
            _replacement: &EventDefinitionData,
        ) -> anyhow::Result<EventDefinition> {
            self.hit()
        }
        async fn update_series(
            &self,
            _e: &EventDefinition,
            _clear_exceptions: bool,
        ) -> anyhow::Result<()> {
            self.hit()
        }
        async fn convert_to_single(
            &self,
            _series_id: i64,
            _single: &EventDefinitionData,
        ) -> anyhow::Result<EventDefinition> {
            self.hit()
        }
    }

    fn data(start: &str, end: &str) -> EventDefinitionData {
        EventDefinitionData {
            title: "Recording session".into(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            members: "Drums, bass".into(),
            repeat_weekly: false,
        }
    }

    #[actix_web::main]
    #[test]
    async fn too_long_window_is_rejected_before_any_store_call() {
        let repo = Arc::new(CountingEventRepo {
            calls: AtomicUsize::new(0),
        });
        let ctx = BookingContext {
            repos: Repos {
                events: repo.clone(),
            },
            config: Config::new(),
            live_sync: Arc::new(LiveSync::new()),
        };
        let mut viewer = ctx.live_sync.subscribe();

        let usecase = CreateEventUseCase {
            data: data("2024-06-03T10:00:00Z", "2024-06-04T11:00:00Z"),
            origin: None,
        };
        let res = execute(usecase, &ctx).await;
        assert!(matches!(
            res,
            Err(UseCaseErrors::InvalidBooking(InvalidBooking::Window(
                InvalidWindow::TooLong
            )))
        ));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);

        // Only the frames from subscribing, no update was broadcast
        assert!(matches!(viewer.next_frame().await, Some(SyncFrame::Message(_))));
        assert!(matches!(viewer.next_frame().await, Some(SyncFrame::Message(_))));
        ctx.live_sync.heartbeat();
        assert_eq!(viewer.next_frame().await, Some(SyncFrame::Heartbeat));
    }

    #[actix_web::main]
    #[test]
    async fn rejects_invalid_bookings() {
        let ctx = BookingContext::create_inmemory();

        let mut usecase = CreateEventUseCase {
            data: data("2024-06-03T10:00:00Z", "2024-06-03T10:00:00Z"),
            origin: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidBooking(InvalidBooking::Window(
                InvalidWindow::EndBeforeStart
            )))
        ));

        let mut untitled = data("2024-06-03T10:00:00Z", "2024-06-03T11:00:00Z");
        untitled.title = "  ".into();
        let mut usecase = CreateEventUseCase {
            data: untitled,
            origin: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidBooking(InvalidBooking::EmptyTitle))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn creates_exactly_24_hour_booking() {
        let ctx = BookingContext::create_inmemory();
        let mut usecase = CreateEventUseCase {
            data: data("2024-06-03T10:00:00Z", "2024-06-04T10:00:00Z"),
            origin: Some("abc".into()),
        };
        let occurrence = usecase.execute(&ctx).await.unwrap();
        assert_eq!(occurrence.title, "Recording session");
        assert_eq!(
            occurrence.id.to_string(),
            format!("{}R2024-06-03T10:00:00.000Z", occurrence.definition_id)
        );
        assert!(ctx
            .repos
            .events
            .find_definition(occurrence.definition_id)
            .await
            .unwrap()
            .is_some());
    }
}
