use crate::error::DosewatchError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use dosewatch_api_structs::get_reminder::*;
use dosewatch_domain::{Reminder, ID};
use dosewatch_infra::DosewatchContext;

fn handle_error(e: UseCaseErrors) -> DosewatchError {
    match e {
        UseCaseErrors::NotFound(reminder_id) => DosewatchError::NotFound(format!(
            "The reminder with id: {}, was not found.",
            reminder_id
        )),
        UseCaseErrors::StorageError => DosewatchError::StoreUnavailable,
    }
}

pub async fn get_reminder_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DosewatchContext>,
) -> Result<HttpResponse, DosewatchError> {
    protect_route(&http_req, &ctx)?;

    let usecase = GetReminderUseCase {
        reminder_id: path.reminder_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(handle_error)
}

#[derive(Debug)]
struct GetReminderUseCase {
    pub reminder_id: ID,
}

#[derive(Debug, PartialEq)]
enum UseCaseErrors {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetReminderUseCase {
    type Response = Reminder;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetReminder";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        match ctx.repos.reminders.find(&self.reminder_id).await {
            Ok(Some(reminder)) => Ok(reminder),
            Ok(None) => Err(UseCaseErrors::NotFound(self.reminder_id.clone())),
            Err(_) => Err(UseCaseErrors::StorageError),
        }
    }
}
