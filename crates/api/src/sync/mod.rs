use actix_web::{http::header, web, HttpResponse};
use futures::{stream, StreamExt};
use std::convert::Infallible;
use studio_booking_infra::BookingContext;
use tracing::error;

/// Opens a server sent event stream for one viewer. The viewer is unsubscribed
/// when the stream ends or the connection is dropped.
async fn live_sync_stream_controller(ctx: web::Data<BookingContext>) -> HttpResponse {
    let subscription = ctx.live_sync.subscribe();

    let frames = stream::unfold(subscription, |mut subscription| async move {
        let frame = subscription.next_frame().await?;
        Some((frame, subscription))
    })
    .filter_map(|frame| async move {
        match frame.encode() {
            Ok(frame) => Some(Ok::<_, Infallible>(web::Bytes::from(frame))),
            Err(e) => {
                error!("Unable to encode live sync frame: {:?}", e);
                None
            }
        }
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache, no-transform"))
        // Compression would buffer the frames
        .insert_header((header::CONTENT_ENCODING, "identity"))
        .streaming(frames)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events/stream", web::get().to(live_sync_stream_controller));
}
