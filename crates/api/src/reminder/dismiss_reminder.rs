use crate::error::DosewatchError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use dosewatch_api_structs::dismiss_reminder::*;
use dosewatch_domain::{LifecycleError, Reminder, ReminderStatus, ID};
use dosewatch_infra::DosewatchContext;
use tracing::info;

fn handle_error(e: UseCaseErrors) -> DosewatchError {
    match e {
        UseCaseErrors::NotFound(reminder_id) => DosewatchError::NotFound(format!(
            "The reminder with id: {}, was not found.",
            reminder_id
        )),
        UseCaseErrors::InvalidTransition(e) => DosewatchError::InvalidTransition(e),
        UseCaseErrors::StorageError => DosewatchError::StoreUnavailable,
    }
}

pub async fn dismiss_reminder_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DosewatchContext>,
) -> Result<HttpResponse, DosewatchError> {
    protect_route(&http_req, &ctx)?;

    let usecase = DismissReminderUseCase {
        reminder_id: path.reminder_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminder| HttpResponse::Ok().json(APIResponse::new(reminder)))
        .map_err(handle_error)
}

/// Dismisses a reminder in any state. Independent of the scheduler: a
/// dispatch result arriving after the dismiss is discarded by the store.
#[derive(Debug)]
pub struct DismissReminderUseCase {
    pub reminder_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    NotFound(ID),
    InvalidTransition(LifecycleError),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DismissReminderUseCase {
    type Response = Reminder;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "DismissReminder";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let reminder = match ctx.repos.reminders.dismiss(&self.reminder_id, now).await {
            Ok(Some(reminder)) => reminder,
            Ok(None) => return Err(UseCaseErrors::NotFound(self.reminder_id.clone())),
            Err(_) => return Err(UseCaseErrors::StorageError),
        };

        if reminder.status != ReminderStatus::Dismissed {
            return Err(UseCaseErrors::InvalidTransition(
                LifecycleError::InvalidTransition {
                    from: reminder.status,
                    to: ReminderStatus::Dismissed,
                },
            ));
        }

        info!("Reminder: {} was dismissed", reminder.id);
        Ok(reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup, NOW};
    use dosewatch_domain::{DoseTime, MedicineDescriptor, NotificationChannel};

    fn reminder_factory(status: ReminderStatus) -> Reminder {
        let medicine = MedicineDescriptor {
            name: "Amoxicillin".into(),
            dosage: "5ml".into(),
            frequency: "3 times a day".into(),
            dose_schedule: vec![],
        };
        let mut reminder = Reminder::new(
            ID::new(),
            ID::new(),
            &medicine,
            DoseTime::new(8, 0).unwrap(),
            NOW - 1000,
            vec![NotificationChannel::Push],
            NOW - 1000,
        );
        reminder.status = status;
        reminder
    }

    #[actix_web::test]
    async fn dismisses_sent_reminder() {
        let ctx = setup().ctx;
        let mut reminder = reminder_factory(ReminderStatus::Sent);
        reminder.attempt_count = 1;
        ctx.repos.reminders.insert_many(&[reminder.clone()]).await.unwrap();

        let mut usecase = DismissReminderUseCase {
            reminder_id: reminder.id.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.status, ReminderStatus::Dismissed);
        assert_eq!(res.attempt_count, 1);
        assert_eq!(res.updated, NOW);

        // Dismissing twice is a no-op success
        let again = usecase.execute(&ctx).await.unwrap();
        assert_eq!(again, res);
    }

    #[actix_web::test]
    async fn dismisses_pending_and_failed_reminders() {
        let ctx = setup().ctx;
        for status in &[ReminderStatus::Pending, ReminderStatus::Failed] {
            let reminder = reminder_factory(*status);
            ctx.repos.reminders.insert_many(&[reminder.clone()]).await.unwrap();

            let mut usecase = DismissReminderUseCase {
                reminder_id: reminder.id.clone(),
            };
            let res = usecase.execute(&ctx).await.unwrap();
            assert_eq!(res.status, ReminderStatus::Dismissed);
        }
    }

    #[actix_web::test]
    async fn rejects_unknown_reminder() {
        let ctx = setup().ctx;
        let mut usecase = DismissReminderUseCase {
            reminder_id: ID::new(),
        };
        let res = usecase.execute(&ctx).await;
        assert_eq!(res, Err(UseCaseErrors::NotFound(usecase.reminder_id.clone())));
    }
}
