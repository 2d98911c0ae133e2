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
use studio_booking_api_structs::update_event::*;
use studio_booking_api_structs::MutationResponse;
use studio_booking_domain::{
    resolve_mutation_scope, EventDefinition, EventDefinitionData, InvalidWindow, KeepOccurrence,
    MutationScope, Occurrence, OccurrenceException, OccurrenceId, ScopeChoice,
};
use studio_booking_infra::BookingContext;
use tracing::info;

pub(crate) fn handle_error(e: UseCaseErrors) -> BookingError {
    match e {
        UseCaseErrors::InvalidBooking(e) => e.into(),
        UseCaseErrors::NotFound(definition_id) => BookingError::NotFound(format!(
            "The booking with id: {}, was not found.",
            definition_id
        )),
        UseCaseErrors::MissingOccurrence => BookingError::BadClientData(
            "An occurrenceId is required to change a single occurrence".into(),
        ),
        UseCaseErrors::ForeignOccurrence(id) => BookingError::BadClientData(format!(
            "The occurrence: {}, does not belong to the given booking",
            id
        )),
        UseCaseErrors::NotRecurring(definition_id) => BookingError::Conflict(format!(
            "The booking with id: {}, does not repeat weekly",
            definition_id
        )),
        UseCaseErrors::OccurrenceMoved(id) => BookingError::Conflict(format!(
            "The occurrence: {}, is no longer part of its series. Refetch and try again.",
            id
        )),
        UseCaseErrors::StorageError => BookingError::InternalError,
    }
}

pub async fn update_event_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    path_params: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let body = body.0;
    let usecase = UpdateEventUseCase {
        definition_id: path_params.definition_id,
        occurrence_id: body.occurrence_id,
        scope: body.scope,
        stop_recurring: body.stop_recurring,
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
        .map(|res| HttpResponse::Ok().json(APIResponse::from(res)))
        .map_err(handle_error)
}

/// Updates the booking `definition_id`. `occurrence_id` addresses the edited
/// occurrence of a recurring booking and `data` holds its new values.
#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub definition_id: i64,
    pub occurrence_id: Option<OccurrenceId>,
    pub scope: ScopeChoice,
    pub stop_recurring: Option<KeepOccurrence>,
    pub data: EventDefinitionData,
    pub origin: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidBooking(InvalidBooking),
    NotFound(i64),
    MissingOccurrence,
    ForeignOccurrence(OccurrenceId),
    NotRecurring(i64),
    OccurrenceMoved(OccurrenceId),
    StorageError,
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub scope: MutationScope,
    pub occurrence: Occurrence,
}

impl From<UseCaseResponse> for MutationResponse {
    fn from(res: UseCaseResponse) -> Self {
        Self {
            scope: res.scope,
            occurrence: res.occurrence,
        }
    }
}

pub(crate) async fn find_definition(
    definition_id: i64,
    ctx: &BookingContext,
) -> Result<EventDefinition, UseCaseErrors> {
    match ctx.repos.events.find_definition(definition_id).await {
        Ok(Some(e)) => Ok(e),
        Ok(None) => Err(UseCaseErrors::NotFound(definition_id)),
        Err(_) => Err(UseCaseErrors::StorageError),
    }
}

fn out_of_range() -> UseCaseErrors {
    UseCaseErrors::InvalidBooking(InvalidBooking::Window(InvalidWindow::OutOfRange))
}

/// The addressed occurrence must belong to `e`
pub(crate) fn check_owner(
    e: &EventDefinition,
    occurrence_id: &OccurrenceId,
) -> Result<(), UseCaseErrors> {
    if occurrence_id.definition_id != e.id {
        return Err(UseCaseErrors::ForeignOccurrence(occurrence_id.clone()));
    }
    Ok(())
}

/// The addressed occurrence must be generated by the series as it is stored now.
/// Otherwise the series was moved in the meantime and an exception for it would
/// match nothing.
pub(crate) fn check_on_series(
    e: &EventDefinition,
    occurrence_id: &OccurrenceId,
) -> Result<(), UseCaseErrors> {
    check_owner(e, occurrence_id)?;
    if !e.has_occurrence_at(&occurrence_id.start) {
        return Err(UseCaseErrors::OccurrenceMoved(occurrence_id.clone()));
    }
    Ok(())
}

/// Turns the series `e` into the single booking chosen by `keep`.
/// `data` holds the values of the edited occurrence, its duration is kept either way.
pub(crate) async fn convert_to_single(
    e: &EventDefinition,
    keep: KeepOccurrence,
    data: &EventDefinitionData,
    ctx: &BookingContext,
) -> Result<Occurrence, UseCaseErrors> {
    let mut single = data.clone();
    single.repeat_weekly = false;
    if keep == KeepOccurrence::AnchorOccurrence {
        single.start = e.start;
        single.end = e
            .start
            .checked_add_signed(data.duration())
            .ok_or_else(out_of_range)?;
    }

    let single = ctx
        .repos
        .events
        .convert_to_single(e.id, &single)
        .await
        .map_err(|_| UseCaseErrors::StorageError)?;
    info!("Series {} was replaced by booking {}", e.id, single.id);
    Ok(single.anchor_occurrence())
}

impl UpdateEventUseCase {
    async fn update_non_recurring(
        &self,
        mut e: EventDefinition,
        ctx: &BookingContext,
    ) -> Result<Occurrence, UseCaseErrors> {
        e.replace(self.data.clone());
        ctx.repos
            .events
            .update_definition(&e)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        Ok(e.anchor_occurrence())
    }

    async fn update_single_occurrence(
        &self,
        e: EventDefinition,
        ctx: &BookingContext,
    ) -> Result<Occurrence, UseCaseErrors> {
        let occurrence_id = self
            .occurrence_id
            .as_ref()
            .ok_or(UseCaseErrors::MissingOccurrence)?;
        check_on_series(&e, occurrence_id)?;

        let mut replacement = self.data.clone();
        replacement.repeat_weekly = false;
        let exception = OccurrenceException::new(e.id, occurrence_id.start);
        let replacement = ctx
            .repos
            .events
            .replace_occurrence(&exception, &replacement)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        Ok(replacement.anchor_occurrence())
    }

    /// The edited occurrence moves by some delta and the whole series moves with it
    async fn update_all_occurrences(
        &self,
        mut e: EventDefinition,
        ctx: &BookingContext,
    ) -> Result<Occurrence, UseCaseErrors> {
        let (start, end, edited_start) = match &self.occurrence_id {
            Some(occurrence_id) => {
                check_on_series(&e, occurrence_id)?;
                let start_delta = self.data.start - occurrence_id.start;
                let end_delta = start_delta + (self.data.duration() - (e.end - e.start));
                let shifted = e
                    .start
                    .checked_add_signed(start_delta)
                    .zip(e.end.checked_add_signed(end_delta))
                    .ok_or_else(out_of_range)?;
                (shifted.0, shifted.1, self.data.start)
            }
            None => (self.data.start, self.data.end, self.data.start),
        };

        let clear_exceptions = start != e.start || end != e.end || !self.data.repeat_weekly;
        e.replace(EventDefinitionData {
            start,
            end,
            ..self.data.clone()
        });
        ctx.repos
            .events
            .update_series(&e, clear_exceptions)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        if clear_exceptions {
            info!("Cleared the exceptions of series {}", e.id);
        }

        if e.repeat_weekly {
            Ok(e.occurrence_at(edited_start))
        } else {
            Ok(e.anchor_occurrence())
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = UseCaseResponse;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "UpdateEvent";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Errors> {
        validate_booking(&mut self.data).map_err(UseCaseErrors::InvalidBooking)?;

        let e = find_definition(self.definition_id, ctx).await?;
        let scope = resolve_mutation_scope(Some(&e), self.scope, self.stop_recurring);

        let occurrence = match scope {
            // A target exists, so creating is never resolved here
            MutationScope::Create | MutationScope::UpdateNonRecurring => {
                self.update_non_recurring(e, ctx).await?
            }
            MutationScope::UpdateSingleOccurrence => self.update_single_occurrence(e, ctx).await?,
            MutationScope::UpdateAllOccurrences => self.update_all_occurrences(e, ctx).await?,
            MutationScope::ConvertToSingle(keep) => {
                if let Some(occurrence_id) = &self.occurrence_id {
                    check_owner(&e, occurrence_id)?;
                }
                convert_to_single(&e, keep, &self.data, ctx).await?
            }
        };

        Ok(UseCaseResponse { scope, occurrence })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(BroadcastCalendarChanged)]
    }
}

impl CalendarMutation for UpdateEventUseCase {
    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }
}
