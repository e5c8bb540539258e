use crate::error::DosewatchError;
use crate::job_schedulers::ReminderScheduler;
use crate::shared::auth::protect_route;
use actix_web::{web, HttpRequest, HttpResponse};
use dosewatch_api_structs::get_scheduler_status::APIResponse;
use dosewatch_infra::DosewatchContext;

async fn get_scheduler_status_controller(
    http_req: HttpRequest,
    ctx: web::Data<DosewatchContext>,
    scheduler: web::Data<ReminderScheduler>,
) -> Result<HttpResponse, DosewatchError> {
    protect_route(&http_req, &ctx)?;

    let status: APIResponse = scheduler.status();
    Ok(HttpResponse::Ok().json(status))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/scheduler/status",
        web::get().to(get_scheduler_status_controller),
    );
}
