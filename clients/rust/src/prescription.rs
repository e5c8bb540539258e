use crate::{APIResponse, BaseClient};
use dosewatch_api_structs::*;
use dosewatch_domain::{NotificationChannel, ID};
use reqwest::StatusCode;
use std::sync::Arc;

pub use confirm_prescription::MedicineBody as ConfirmMedicineInput;

#[derive(Clone)]
pub struct PrescriptionClient {
    base: Arc<BaseClient>,
}

pub struct ConfirmPrescriptionInput {
    pub baby_id: Option<ID>,
    pub parent_id: Option<ID>,
    pub channels: Option<Vec<NotificationChannel>>,
    pub timezone: Option<String>,
    pub medicines: Vec<ConfirmMedicineInput>,
}

impl PrescriptionClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn confirm(
        &self,
        input: ConfirmPrescriptionInput,
    ) -> APIResponse<confirm_prescription::APIResponse> {
        let body = confirm_prescription::RequestBody {
            baby_id: input.baby_id,
            parent_id: input.parent_id,
            channels: input.channels,
            timezone: input.timezone,
            medicines: input.medicines,
        };
        self.base
            .post(body, "prescriptions/confirm".into(), StatusCode::OK)
            .await
    }
}
