mod get_occurrences;

use actix_web::web;
use get_occurrences::get_occurrences_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/occurrences", web::get().to(get_occurrences_controller));
}
