use actix_web::HttpRequest;
use studio_booking_api_structs::CONNECTION_ID_HEADER;

/// The connection id the client attached to its mutation, if any
pub fn origin_connection_id(http_req: &HttpRequest) -> Option<String> {
    http_req
        .headers()
        .get(CONNECTION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
