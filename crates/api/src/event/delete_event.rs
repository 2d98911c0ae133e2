use super::update_event::{check_on_series, find_definition, handle_error, UseCaseErrors};
use crate::{
    error::BookingError,
    event::subscribers::{BroadcastCalendarChanged, CalendarMutation},
    shared::{
        connection::origin_connection_id,
        usecase::{execute, Subscriber, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use studio_booking_api_structs::delete_event::*;
use studio_booking_domain::{
    resolve_delete_scope, DeleteScope, OccurrenceException, OccurrenceId, ScopeChoice,
};
use studio_booking_infra::BookingContext;

pub async fn delete_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let query = query_params.0;
    let usecase = DeleteEventUseCase {
        definition_id: path_params.definition_id,
        occurrence_id: query.occurrence_id,
        scope: query.scope,
        origin: origin_connection_id(&http_req),
    };

    execute(usecase, &ctx)
        .await
        .map(|scope| HttpResponse::Ok().json(APIResponse { scope }))
        .map_err(handle_error)
}

#[derive(Debug)]
pub struct DeleteEventUseCase {
    pub definition_id: i64,
    pub occurrence_id: Option<OccurrenceId>,
    pub scope: ScopeChoice,
    pub origin: Option<String>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventUseCase {
    type Response = DeleteScope;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "DeleteEvent";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Errors> {
        let e = find_definition(self.definition_id, ctx).await?;

        let scope = resolve_delete_scope(&e, self.scope);
        match scope {
            DeleteScope::SingleOccurrence => {
                let occurrence_id = self
                    .occurrence_id
                    .as_ref()
                    .ok_or(UseCaseErrors::MissingOccurrence)?;
                check_on_series(&e, occurrence_id)?;
                ctx.repos
                    .events
                    .insert_exception(&OccurrenceException::new(e.id, occurrence_id.start))
                    .await
                    .map_err(|_| UseCaseErrors::StorageError)?;
            }
            DeleteScope::WholeDefinition => {
                ctx.repos
                    .events
                    .delete_definition(e.id)
                    .await
                    .map_err(|_| UseCaseErrors::StorageError)?
                    .ok_or(UseCaseErrors::NotFound(e.id))?;
            }
        }

        Ok(scope)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(BroadcastCalendarChanged)]
    }
}

impl CalendarMutation for DeleteEventUseCase {
    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::prelude::*;
    use studio_booking_domain::{EventDefinition, EventDefinitionData};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    async fn insert_series(ctx: &BookingContext, repeat_weekly: bool) -> EventDefinition {
        ctx.repos
            .events
            .insert_definition(&EventDefinitionData {
                title: "Choir".into(),
                start: ts("2024-06-03T18:00:00Z"),
                end: ts("2024-06-03T20:00:00Z"),
                members: "".into(),
                repeat_weekly,
            })
            .await
            .unwrap()
    }

    #[actix_web::main]
    #[test]
    async fn delete_single_occurrence_twice() {
        let ctx = BookingContext::create_inmemory();
        let series = insert_series(&ctx, true).await;

        for _ in 0..2 {
            let mut usecase = DeleteEventUseCase {
                definition_id: series.id,
                occurrence_id: Some(OccurrenceId::new(series.id, ts("2024-06-10T18:00:00Z"))),
                scope: ScopeChoice::ThisOccurrence,
                origin: None,
            };
            assert_eq!(
                usecase.execute(&ctx).await.unwrap(),
                DeleteScope::SingleOccurrence
            );
        }

        let exceptions = ctx
            .repos
            .events
            .find_exceptions_for_events(&[series.id])
            .await
            .unwrap();
        assert_eq!(exceptions.len(), 1);
        assert!(ctx.repos.events.find_definition(series.id).await.unwrap().is_some());
    }

    #[actix_web::main]
    #[test]
    async fn delete_occurrence_of_series_created_with_microseconds() {
        let ctx = BookingContext::create_inmemory();
        let mut create = super::super::create_event::CreateEventUseCase {
            data: EventDefinitionData {
                title: "Choir".into(),
                start: ts("2024-06-03T18:00:00.000500Z"),
                end: ts("2024-06-03T20:00:00.000500Z"),
                members: "".into(),
                repeat_weekly: true,
            },
            origin: None,
        };
        let anchor = create.execute(&ctx).await.unwrap();
        assert_eq!(anchor.start, ts("2024-06-03T18:00:00Z"));

        // The id a client gets back for the second week
        let occurrence_id = format!("{}R2024-06-10T18:00:00.000Z", anchor.definition_id)
            .parse::<OccurrenceId>()
            .unwrap();
        let mut usecase = DeleteEventUseCase {
            definition_id: anchor.definition_id,
            occurrence_id: Some(occurrence_id),
            scope: ScopeChoice::ThisOccurrence,
            origin: None,
        };
        assert_eq!(
            usecase.execute(&ctx).await.unwrap(),
            DeleteScope::SingleOccurrence
        );
        let exceptions = ctx
            .repos
            .events
            .find_exceptions_for_events(&[anchor.definition_id])
            .await
            .unwrap();
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].occurrence_start, ts("2024-06-10T18:00:00Z"));
    }

    #[actix_web::main]
    #[test]
    async fn delete_all_occurrences_cascades() {
        let ctx = BookingContext::create_inmemory();
        let series = insert_series(&ctx, true).await;
        ctx.repos
            .events
            .insert_exception(&OccurrenceException::new(series.id, ts("2024-06-10T18:00:00Z")))
            .await
            .unwrap();

        let mut usecase = DeleteEventUseCase {
            definition_id: series.id,
            occurrence_id: Some(OccurrenceId::new(series.id, ts("2024-06-17T18:00:00Z"))),
            scope: ScopeChoice::AllOccurrences,
            origin: None,
        };
        assert_eq!(
            usecase.execute(&ctx).await.unwrap(),
            DeleteScope::WholeDefinition
        );
        assert!(ctx.repos.events.find_definition(series.id).await.unwrap().is_none());
        assert!(ctx
            .repos
            .events
            .find_exceptions_for_events(&[series.id])
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn delete_this_on_non_recurring_removes_it() {
        let ctx = BookingContext::create_inmemory();
        let single = insert_series(&ctx, false).await;

        let mut usecase = DeleteEventUseCase {
            definition_id: single.id,
            occurrence_id: None,
            scope: ScopeChoice::ThisOccurrence,
            origin: None,
        };
        assert_eq!(
            usecase.execute(&ctx).await.unwrap(),
            DeleteScope::WholeDefinition
        );
        assert!(ctx.repos.events.find_definition(single.id).await.unwrap().is_none());
    }

    #[actix_web::main]
    #[test]
    async fn delete_nonexisting_event() {
        let ctx = BookingContext::create_inmemory();
        let mut usecase = DeleteEventUseCase {
            definition_id: 7,
            occurrence_id: None,
            scope: ScopeChoice::AllOccurrences,
            origin: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::NotFound(7))
        ));
    }
}
