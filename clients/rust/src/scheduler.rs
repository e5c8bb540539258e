use crate::{APIResponse, BaseClient};
use dosewatch_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct SchedulerClient {
    base: Arc<BaseClient>,
}

impl SchedulerClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn status(&self) -> APIResponse<get_scheduler_status::APIResponse> {
        self.base
            .get("scheduler/status".into(), StatusCode::OK)
            .await
    }
}
