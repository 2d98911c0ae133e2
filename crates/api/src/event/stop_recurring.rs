use super::update_event::{
    check_owner, convert_to_single, find_definition, handle_error, UseCaseErrors,
    UseCaseResponse,
};
use crate::{
    error::BookingError,
    event::subscribers::{BroadcastCalendarChanged, CalendarMutation},
    shared::{
        connection::origin_connection_id,
        usecase::{execute, Subscriber, UseCase},
        validation::validate_booking,
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use studio_booking_api_structs::stop_recurring::*;
use studio_booking_domain::{
    resolve_mutation_scope, EventDefinitionData, KeepOccurrence, OccurrenceId, ScopeChoice,
};
use studio_booking_infra::BookingContext;

pub async fn stop_recurring_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    path_params: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let body = body.0;
    let usecase = StopRecurringUseCase {
        definition_id: path_params.definition_id,
        occurrence_id: body.occurrence_id,
        keep: body.keep,
        data: EventDefinitionData {
            title: body.title,
            start: body.start,
            end: body.end,
            members: body.members,
            repeat_weekly: false,
        },
        origin: origin_connection_id(&http_req),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::from(res)))
        .map_err(handle_error)
}

/// Replaces a recurring booking by one single booking
#[derive(Debug)]
pub struct StopRecurringUseCase {
    pub definition_id: i64,
    pub occurrence_id: Option<OccurrenceId>,
    pub keep: KeepOccurrence,
    pub data: EventDefinitionData,
    pub origin: Option<String>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for StopRecurringUseCase {
    type Response = UseCaseResponse;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "StopRecurring";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Errors> {
        validate_booking(&mut self.data).map_err(UseCaseErrors::InvalidBooking)?;

        let e = find_definition(self.definition_id, ctx).await?;
        if !e.repeat_weekly {
            return Err(UseCaseErrors::NotRecurring(e.id));
        }
        if let Some(occurrence_id) = &self.occurrence_id {
            check_owner(&e, occurrence_id)?;
        }

        let scope = resolve_mutation_scope(Some(&e), ScopeChoice::AllOccurrences, Some(self.keep));
        let occurrence = convert_to_single(&e, self.keep, &self.data, ctx).await?;
        Ok(UseCaseResponse { scope, occurrence })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(BroadcastCalendarChanged)]
    }
}

impl CalendarMutation for StopRecurringUseCase {
    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use studio_booking_domain::MutationScope;

    fn data(start: &str, end: &str, repeat_weekly: bool) -> EventDefinitionData {
        EventDefinitionData {
            title: "Piano lesson".into(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            members: "Clara".into(),
            repeat_weekly,
        }
    }

    #[actix_web::main]
    #[test]
    async fn keeps_the_anchor() {
        let ctx = BookingContext::create_inmemory();
        let series = ctx
            .repos
            .events
            .insert_definition(&data("2024-06-03T16:00:00Z", "2024-06-03T17:00:00Z", true))
            .await
            .unwrap();

        let mut usecase = StopRecurringUseCase {
            definition_id: series.id,
            occurrence_id: Some(OccurrenceId::new(series.id, "2024-07-01T16:00:00Z".parse().unwrap())),
            keep: KeepOccurrence::AnchorOccurrence,
            data: data("2024-07-01T16:00:00Z", "2024-07-01T17:30:00Z", false),
            origin: None,
        };
        let res = usecase.execute(&ctx).await.unwrap();

        assert_eq!(
            res.scope,
            MutationScope::ConvertToSingle(KeepOccurrence::AnchorOccurrence)
        );
        assert_eq!(res.occurrence.start, series.start);
        assert_eq!(
            res.occurrence.end,
            "2024-06-03T17:30:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap()
        );
        assert!(ctx.repos.events.find_definition(series.id).await.unwrap().is_none());
    }

    #[actix_web::main]
    #[test]
    async fn rejects_non_recurring_bookings() {
        let ctx = BookingContext::create_inmemory();
        let single = ctx
            .repos
            .events
            .insert_definition(&data("2024-06-03T16:00:00Z", "2024-06-03T17:00:00Z", false))
            .await
            .unwrap();

        let mut usecase = StopRecurringUseCase {
            definition_id: single.id,
            occurrence_id: None,
            keep: KeepOccurrence::ThisOccurrence,
            data: data("2024-06-03T16:00:00Z", "2024-06-03T17:00:00Z", false),
            origin: None,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::NotRecurring(_))
        ));
        assert!(ctx.repos.events.find_definition(single.id).await.unwrap().is_some());
    }
}
