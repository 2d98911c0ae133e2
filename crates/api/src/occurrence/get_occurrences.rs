use crate::{
    error::BookingError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use studio_booking_api_structs::get_occurrences::*;
use studio_booking_domain::{expand, Occurrence, TimeSpan};
use studio_booking_infra::BookingContext;

fn handle_error(e: UseCaseErrors) -> BookingError {
    match e {
        UseCaseErrors::InvalidTimespan => {
            BookingError::BadClientData("The provided start and end is invalid".into())
        }
        UseCaseErrors::StorageError => BookingError::InternalError,
    }
}

pub async fn get_occurrences_controller(
    query_params: web::Query<QueryParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let usecase = GetOccurrencesUseCase {
        timespan: TimeSpan::new(query_params.start, query_params.end),
    };

    execute(usecase, &ctx)
        .await
        .map(|occurrences| HttpResponse::Ok().json(APIResponse { occurrences }))
        .map_err(handle_error)
}

/// Every occurrence overlapping `timespan`, sorted by start
#[derive(Debug)]
pub struct GetOccurrencesUseCase {
    pub timespan: TimeSpan,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidTimespan,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetOccurrencesUseCase {
    type Response = Vec<Occurrence>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetOccurrences";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Errors> {
        if self.timespan.is_empty()
            || self
                .timespan
                .greater_than(ctx.config.occurrences_query_duration_limit)
        {
            return Err(UseCaseErrors::InvalidTimespan);
        }

        let definitions = ctx
            .repos
            .events
            .find_definitions_overlapping(&self.timespan)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        let series_ids = definitions
            .iter()
            .filter(|e| e.repeat_weekly)
            .map(|e| e.id)
            .collect::<Vec<_>>();
        let exceptions = ctx
            .repos
            .events
            .find_exceptions_for_events(&series_ids)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        let mut occurrences = expand(&definitions, &exceptions, &self.timespan);
        occurrences.sort_by(|o1, o2| {
            o1.start
                .cmp(&o2.start)
                .then(o1.definition_id.cmp(&o2.definition_id))
        });
        Ok(occurrences)
    }
}
