mod base;
mod prescription;
mod reminder;
mod scheduler;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
use prescription::PrescriptionClient;
pub use prescription::{ConfirmMedicineInput, ConfirmPrescriptionInput};
use reminder::ReminderClient;
pub use reminder::GetParentRemindersInput;
use scheduler::SchedulerClient;
use status::StatusClient;
use std::sync::Arc;

pub use dosewatch_api_structs::dtos::*;
pub use dosewatch_domain::{NotificationChannel, ReminderStatus, ReminderSummary, Tz, ID};

// Domain
pub use dosewatch_api_structs::dtos::MedicationPlanDTO as MedicationPlan;
pub use dosewatch_api_structs::dtos::ReminderDTO as Reminder;
pub use dosewatch_api_structs::dtos::SchedulerStatusDTO as SchedulerStatus;

/// Dosewatch Server SDK
///
/// The SDK contains methods for interacting with the Dosewatch server
/// API.
#[derive(Clone)]
pub struct DosewatchSDK {
    pub prescription: PrescriptionClient,
    pub reminder: ReminderClient,
    pub scheduler: SchedulerClient,
    pub status: StatusClient,
}

impl DosewatchSDK {
    pub fn new<T: Into<String>>(address: String, api_key: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_api_key(api_key.into());
        let base = Arc::new(base);
        let prescription = PrescriptionClient::new(base.clone());
        let reminder = ReminderClient::new(base.clone());
        let scheduler = SchedulerClient::new(base.clone());
        let status = StatusClient::new(base);

        Self {
            prescription,
            reminder,
            scheduler,
            status,
        }
    }
}
