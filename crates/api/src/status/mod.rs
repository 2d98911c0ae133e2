use actix_web::{web, HttpResponse};
use studio_booking_api_structs::get_service_health::*;
use studio_booking_infra::BookingContext;

async fn status(ctx: web::Data<BookingContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Yo! We are up!\r\n".into(),
        viewers: ctx.live_sync.viewer_count(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
