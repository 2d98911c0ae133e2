use actix_web::rt::time::interval;
use std::time::Duration;
use studio_booking_infra::BookingContext;
use tracing::{debug, info_span};
use tracing_futures::Instrument;

/// Writes a keep-alive comment to every live viewer each interval.
/// Viewers whose connection is gone are dropped on the way.
pub fn start_heartbeat_job(ctx: BookingContext) {
    let job = async move {
        let mut interval = interval(Duration::from_secs(ctx.config.heartbeat_interval_secs));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            debug!("Heartbeat to {} viewers", ctx.live_sync.viewer_count());
            ctx.live_sync.heartbeat();
        }
    };
    actix_web::rt::spawn(job.instrument(info_span!("heartbeat_job")));
}
