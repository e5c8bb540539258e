mod confirm_prescription;
pub mod expand_reminders;

use actix_web::web;
use confirm_prescription::confirm_prescription_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/prescriptions/confirm",
        web::post().to(confirm_prescription_controller),
    );
}
