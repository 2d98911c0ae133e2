use crate::shared::usecase::{Subscriber, UseCase};
use studio_booking_domain::SyncMessage;
use studio_booking_infra::BookingContext;

/// A `UseCase` that changes the calendar on behalf of a client
pub trait CalendarMutation: UseCase {
    /// Connection id of the client that sent the mutation
    fn origin(&self) -> Option<String>;
}

/// Tells every live viewer that the calendar changed.
/// The origin is included so that its own client can skip the refetch.
pub struct BroadcastCalendarChanged;

#[async_trait::async_trait(?Send)]
impl<U: CalendarMutation> Subscriber<U> for BroadcastCalendarChanged {
    async fn notify(&self, usecase: &U, _res: &U::Response, ctx: &BookingContext) {
        ctx.live_sync.broadcast(SyncMessage::update(usecase.origin()));
    }
}
