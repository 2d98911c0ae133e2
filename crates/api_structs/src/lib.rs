mod event;
mod occurrence;
mod status;

pub use crate::event::api::*;
pub use crate::occurrence::api::*;
pub use crate::status::api::*;

/// Header carrying the connection id of the client that sent a mutation
pub const CONNECTION_ID_HEADER: &str = "x-connection-id";
