pub mod delete_old_reminders;
mod dismiss_reminder;
pub mod generate_reminders;
mod get_parent_reminders;
mod get_reminder;
mod get_today_reminders;
pub mod process_due_reminders;

use actix_web::web;
use dismiss_reminder::dismiss_reminder_controller;
use get_parent_reminders::get_parent_reminders_controller;
use get_reminder::get_reminder_controller;
use get_today_reminders::get_today_reminders_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/babies/{baby_id}/reminders/today",
        web::get().to(get_today_reminders_controller),
    );
    cfg.route(
        "/parents/{parent_id}/reminders",
        web::get().to(get_parent_reminders_controller),
    );

    cfg.route(
        "/reminders/{reminder_id}",
        web::get().to(get_reminder_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}/dismiss",
        web::post().to(dismiss_reminder_controller),
    );
}
