mod create_event;
mod delete_event;
mod stop_recurring;
mod subscribers;
mod update_event;

use actix_web::web;
use create_event::create_event_controller;
use delete_event::delete_event_controller;
use stop_recurring::stop_recurring_controller;
use update_event::update_event_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(create_event_controller));
    cfg.route(
        "/events/{definition_id}",
        web::put().to(update_event_controller),
    );
    cfg.route(
        "/events/{definition_id}",
        web::delete().to(delete_event_controller),
    );
    cfg.route(
        "/events/{definition_id}/stop-recurring",
        web::post().to(stop_recurring_controller),
    );
}
