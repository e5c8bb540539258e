use crate::error::DosewatchError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use dosewatch_api_structs::get_parent_reminders::*;
use dosewatch_domain::{date, Reminder, ReminderFilters, ReminderStatus, ID};
use dosewatch_infra::DosewatchContext;

fn handle_error(e: UseCaseErrors) -> DosewatchError {
    match e {
        UseCaseErrors::InvalidStatus(status) => DosewatchError::BadClientData(format!(
            "Invalid status: {}. Expected one of pending, sent, failed or dismissed.",
            status
        )),
        UseCaseErrors::InvalidDate(msg) => DosewatchError::BadClientData(format!(
            "{}. It should be of the format YYYY-MM-DD.",
            msg
        )),
        UseCaseErrors::InvalidDateRange => DosewatchError::BadClientData(
            "The startDate can not be after the endDate".into(),
        ),
        UseCaseErrors::StorageError => DosewatchError::StoreUnavailable,
    }
}

pub async fn get_parent_reminders_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    query: web::Query<QueryParams>,
    ctx: web::Data<DosewatchContext>,
) -> Result<HttpResponse, DosewatchError> {
    protect_route(&http_req, &ctx)?;

    let query = query.into_inner();
    let usecase = GetParentRemindersUseCase {
        parent_id: path.parent_id.clone(),
        status: query.status,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(handle_error)
}

/// Every reminder of a parent, optionally filtered by status and by an
/// inclusive range of UTC calendar days
#[derive(Debug)]
pub struct GetParentRemindersUseCase {
    pub parent_id: ID,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    InvalidStatus(String),
    InvalidDate(String),
    InvalidDateRange,
    StorageError,
}

impl GetParentRemindersUseCase {
    fn filters(&self) -> Result<ReminderFilters, UseCaseErrors> {
        let status = match &self.status {
            Some(status) => Some(
                status
                    .parse::<ReminderStatus>()
                    .map_err(|_| UseCaseErrors::InvalidStatus(status.clone()))?,
            ),
            None => None,
        };

        let parse_date = |datestr: &String| {
            date::is_valid_date(datestr).map_err(|e| UseCaseErrors::InvalidDate(e.to_string()))
        };
        let start = self.start_date.as_ref().map(parse_date).transpose()?;
        let end = self.end_date.as_ref().map(parse_date).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(UseCaseErrors::InvalidDateRange);
            }
        }

        let tz = chrono_tz::UTC;
        let start_ts = start
            .and_then(|start| date::days_span(start, start, &tz))
            .map(|span| span.start_ts);
        let end_ts = end
            .and_then(|end| date::days_span(end, end, &tz))
            .map(|span| span.end_ts);

        Ok(ReminderFilters {
            status,
            start_ts,
            end_ts,
        })
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetParentRemindersUseCase {
    type Response = Vec<Reminder>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetParentReminders";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let filters = self.filters()?;

        ctx.repos
            .reminders
            .find_by_parent(&self.parent_id, &filters, ctx.config.query_limit)
            .await
            .map_err(|_| UseCaseErrors::StorageError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup, NOW};
    use dosewatch_domain::{DoseTime, MedicineDescriptor, NotificationChannel};

    const DAY: i64 = 1000 * 60 * 60 * 24;

    fn reminder_factory(parent_id: &ID, scheduled_for: i64, status: ReminderStatus) -> Reminder {
        let medicine = MedicineDescriptor {
            name: "Amoxicillin".into(),
            dosage: "5ml".into(),
            frequency: "3 times a day".into(),
            dose_schedule: vec![],
        };
        let mut reminder = Reminder::new(
            ID::new(),
            parent_id.clone(),
            &medicine,
            DoseTime::new(9, 0).unwrap(),
            scheduled_for,
            vec![NotificationChannel::Push],
            NOW,
        );
        reminder.status = status;
        reminder
    }

    fn usecase(
        parent_id: &ID,
        status: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> GetParentRemindersUseCase {
        GetParentRemindersUseCase {
            parent_id: parent_id.clone(),
            status: status.map(String::from),
            start_date: start_date.map(String::from),
            end_date: end_date.map(String::from),
        }
    }

    #[actix_web::test]
    async fn filters_by_status_and_dates() {
        let ctx = setup().ctx;
        let parent_id = ID::new();
        // NOW is 2026-10-16 09:00 UTC
        let reminders = vec![
            reminder_factory(&parent_id, NOW - DAY, ReminderStatus::Sent),
            reminder_factory(&parent_id, NOW, ReminderStatus::Pending),
            reminder_factory(&parent_id, NOW + DAY, ReminderStatus::Pending),
            reminder_factory(&parent_id, NOW + 2 * DAY, ReminderStatus::Pending),
            reminder_factory(&ID::new(), NOW, ReminderStatus::Pending),
        ];
        ctx.repos.reminders.insert_many(&reminders).await.unwrap();

        let all = usecase(&parent_id, None, None, None)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(all.len(), 4);

        let pending = usecase(&parent_id, Some("pending"), None, None)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(pending.len(), 3);

        let in_range = usecase(&parent_id, None, Some("2026-10-15"), Some("2026-10-17"))
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(
            in_range.iter().map(|r| r.scheduled_for).collect::<Vec<_>>(),
            vec![NOW - DAY, NOW, NOW + DAY]
        );

        let pending_from_today = usecase(&parent_id, Some("pending"), Some("2026-10-16"), None)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(pending_from_today.len(), 3);
    }

    #[actix_web::test]
    async fn rejects_invalid_filters() {
        let ctx = setup().ctx;
        let parent_id = ID::new();

        assert_eq!(
            usecase(&parent_id, Some("snoozed"), None, None)
                .execute(&ctx)
                .await,
            Err(UseCaseErrors::InvalidStatus("snoozed".into()))
        );
        assert!(matches!(
            usecase(&parent_id, None, Some("2026-13-01"), None)
                .execute(&ctx)
                .await,
            Err(UseCaseErrors::InvalidDate(_))
        ));
        assert_eq!(
            usecase(&parent_id, None, Some("2026-10-17"), Some("2026-10-16"))
                .execute(&ctx)
                .await,
            Err(UseCaseErrors::InvalidDateRange)
        );
    }
}
