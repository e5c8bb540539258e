use crate::error::DosewatchError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono_tz::Tz;
use dosewatch_api_structs::get_today_reminders::*;
use dosewatch_domain::{date, Reminder, ReminderFilters, ID};
use dosewatch_infra::DosewatchContext;

fn handle_error(e: UseCaseErrors) -> DosewatchError {
    match e {
        UseCaseErrors::InvalidTimezone(tz) => DosewatchError::BadClientData(format!(
            "Invalid timezone: {}. It should be a valid IANA TimeZone.",
            tz
        )),
        UseCaseErrors::StorageError => DosewatchError::StoreUnavailable,
    }
}

pub async fn get_today_reminders_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    query: web::Query<QueryParams>,
    ctx: web::Data<DosewatchContext>,
) -> Result<HttpResponse, DosewatchError> {
    protect_route(&http_req, &ctx)?;

    let query = query.into_inner();
    let usecase = GetTodayRemindersUseCase {
        baby_id: path.baby_id.clone(),
        timezone: query.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(handle_error)
}

/// The reminders of a baby scheduled during the current calendar day
#[derive(Debug)]
pub struct GetTodayRemindersUseCase {
    pub baby_id: ID,
    /// Falls back to the configured default timezone
    pub timezone: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    InvalidTimezone(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetTodayRemindersUseCase {
    type Response = Vec<Reminder>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetTodayReminders";

    async fn execute(&mut self, ctx: &DosewatchContext) -> Result<Self::Response, Self::Errors> {
        let tz = match &self.timezone {
            Some(timezone) => timezone
                .parse::<Tz>()
                .map_err(|_| UseCaseErrors::InvalidTimezone(timezone.clone()))?,
            None => ctx.config.default_timezone,
        };

        let today = date::day_span(ctx.sys.get_timestamp_millis(), &tz);
        let reminders = ctx
            .repos
            .reminders
            .find_by_baby_in_range(&self.baby_id, today, ctx.config.query_limit)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        Ok(ReminderFilters::default().apply(reminders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup, NOW};
    use dosewatch_domain::{DoseTime, MedicineDescriptor, NotificationChannel};

    const HOUR: i64 = 1000 * 60 * 60;

    fn reminder_factory(baby_id: &ID, scheduled_for: i64) -> Reminder {
        let medicine = MedicineDescriptor {
            name: "Paracetamol".into(),
            dosage: "2.5ml".into(),
            frequency: "Every 6 hours".into(),
            dose_schedule: vec![],
        };
        Reminder::new(
            baby_id.clone(),
            ID::new(),
            &medicine,
            DoseTime::new(0, 0).unwrap(),
            scheduled_for,
            vec![NotificationChannel::Push],
            NOW,
        )
    }

    #[actix_web::test]
    async fn returns_the_reminders_of_today_sorted() {
        let ctx = setup().ctx;
        let baby_id = ID::new();
        // NOW is 09:00 UTC, so today is [NOW - 9h, NOW + 15h)
        let reminders = vec![
            reminder_factory(&baby_id, NOW + 5 * HOUR),
            reminder_factory(&baby_id, NOW - 9 * HOUR),
            reminder_factory(&baby_id, NOW - 10 * HOUR),
            reminder_factory(&baby_id, NOW + 15 * HOUR),
            reminder_factory(&ID::new(), NOW),
        ];
        ctx.repos.reminders.insert_many(&reminders).await.unwrap();

        let mut usecase = GetTodayRemindersUseCase {
            baby_id: baby_id.clone(),
            timezone: None,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(
            res.iter().map(|r| r.scheduled_for).collect::<Vec<_>>(),
            vec![NOW - 9 * HOUR, NOW + 5 * HOUR]
        );
    }

    #[actix_web::test]
    async fn today_depends_on_the_timezone() {
        let ctx = setup().ctx;
        let baby_id = ID::new();
        // 23:30 UTC the day before is 01:30 in Oslo (CEST)
        let reminders = vec![reminder_factory(&baby_id, NOW - 9 * HOUR - HOUR / 2)];
        ctx.repos.reminders.insert_many(&reminders).await.unwrap();

        let mut usecase = GetTodayRemindersUseCase {
            baby_id: baby_id.clone(),
            timezone: None,
        };
        assert!(usecase.execute(&ctx).await.unwrap().is_empty());

        let mut usecase = GetTodayRemindersUseCase {
            baby_id,
            timezone: Some("Europe/Oslo".into()),
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn rejects_invalid_timezone() {
        let ctx = setup().ctx;
        let mut usecase = GetTodayRemindersUseCase {
            baby_id: ID::new(),
            timezone: Some("Mars/Olympus".into()),
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseErrors::InvalidTimezone("Mars/Olympus".into()))
        );
    }
}
