mod base;
mod event;
mod status;
mod sync;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use event::CalendarClient;
pub use event::{
    CreateEventInput, DeleteEventInput, GetOccurrencesInput, StopRecurringInput,
    UpdateEventInput,
};
use status::StatusClient;
use std::sync::Arc;
pub use studio_booking_api_structs::*;
pub use studio_booking_domain::{
    DeleteScope, KeepOccurrence, MutationScope, Occurrence, OccurrenceId, ScopeChoice, SyncFrame,
    SyncMessage,
};
pub use sync::{
    react_to, ConnectionId, FetchSequencer, FetchTicket, MutationTicket, MutationTracker,
    SseDecoder, SyncAction,
};

/// Studio Booking SDK
///
/// The SDK contains methods for interacting with the studio booking server
/// API. Every SDK instance is one viewer with its own connection id.
#[derive(Clone)]
pub struct BookingSDK {
    pub calendar: CalendarClient,
    pub status: StatusClient,
    connection_id: ConnectionId,
}

impl BookingSDK {
    pub fn new(address: String) -> Self {
        Self::with_connection_id(address, ConnectionId::new())
    }

    pub fn with_connection_id(address: String, connection_id: ConnectionId) -> Self {
        let base = Arc::new(BaseClient::new(address, connection_id.clone()));
        let calendar = CalendarClient::new(base.clone());
        let status = StatusClient::new(base);

        Self {
            calendar,
            status,
            connection_id,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }
}
