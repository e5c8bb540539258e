use crate::{APIResponse, BaseClient};
use dosewatch_api_structs::*;
use dosewatch_domain::{ReminderStatus, ID};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

pub struct GetParentRemindersInput {
    pub parent_id: ID,
    pub status: Option<ReminderStatus>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
}

impl GetParentRemindersInput {
    pub(crate) fn to_query_string(&self) -> String {
        let mut query = Vec::new();
        if let Some(status) = &self.status {
            query.push(format!("status={}", status));
        }
        if let Some(start_date) = &self.start_date {
            query.push(format!("startDate={}", start_date));
        }
        if let Some(end_date) = &self.end_date {
            query.push(format!("endDate={}", end_date));
        }
        query.join("&")
    }
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn get(&self, reminder_id: ID) -> APIResponse<get_reminder::APIResponse> {
        self.base
            .get(format!("reminders/{}", reminder_id), StatusCode::OK)
            .await
    }

    pub async fn dismiss(&self, reminder_id: ID) -> APIResponse<dismiss_reminder::APIResponse> {
        self.base
            .post(
                (),
                format!("reminders/{}/dismiss", reminder_id),
                StatusCode::OK,
            )
            .await
    }

    /// `timezone` decides which calendar day is today
    pub async fn get_today(
        &self,
        baby_id: ID,
        timezone: Option<String>,
    ) -> APIResponse<get_today_reminders::APIResponse> {
        let query = timezone
            .map(|tz| format!("?timezone={}", tz))
            .unwrap_or_default();
        self.base
            .get(
                format!("babies/{}/reminders/today{}", baby_id, query),
                StatusCode::OK,
            )
            .await
    }

    pub async fn get_for_parent(
        &self,
        input: GetParentRemindersInput,
    ) -> APIResponse<get_parent_reminders::APIResponse> {
        self.base
            .get(
                format!(
                    "parents/{}/reminders?{}",
                    input.parent_id,
                    input.to_query_string()
                ),
                StatusCode::OK,
            )
            .await
    }
}
