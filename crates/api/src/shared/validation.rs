use crate::error::BookingError;
use studio_booking_domain::{EventDefinitionData, InvalidWindow};

#[derive(Debug, PartialEq)]
pub enum InvalidBooking {
    Window(InvalidWindow),
    EmptyTitle,
}

impl From<InvalidBooking> for BookingError {
    fn from(e: InvalidBooking) -> Self {
        match e {
            InvalidBooking::Window(e) => BookingError::BadClientData(e.to_string()),
            InvalidBooking::EmptyTitle => {
                BookingError::BadClientData("The title of a booking can not be empty".into())
            }
        }
    }
}

/// Checks a booking before anything is read or written. Times are cut down to
/// millisecond precision first.
pub fn validate_booking(data: &mut EventDefinitionData) -> Result<(), InvalidBooking> {
    data.truncate_to_millis();
    if data.title.trim().is_empty() {
        return Err(InvalidBooking::EmptyTitle);
    }
    data.validate().map_err(InvalidBooking::Window)
}
