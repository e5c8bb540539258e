use crate::dtos::MedicationPlanDTO;
use dosewatch_domain::{MedicationPlan, NotificationChannel, ID};
use serde::{Deserialize, Serialize};

pub mod confirm_prescription {
    use super::*;

    /// One medicine of a confirmed prescription. Dose times are kept as
    /// strings so that a bad one only produces a warning.
    #[derive(Deserialize, Serialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct MedicineBody {
        pub medicine_name: String,
        #[serde(default)]
        pub dosage: String,
        #[serde(default)]
        pub frequency: String,
        #[serde(default)]
        pub dose_schedule: Vec<String>,
        #[serde(default)]
        pub duration_days: Option<i64>,
    }

    #[derive(Deserialize, Serialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub baby_id: Option<ID>,
        #[serde(default)]
        pub parent_id: Option<ID>,
        /// Defaults to every channel
        #[serde(default)]
        pub channels: Option<Vec<NotificationChannel>>,
        /// IANA timezone the dose times are given in
        #[serde(default)]
        pub timezone: Option<String>,
        pub medicines: Vec<MedicineBody>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub plans: Vec<MedicationPlanDTO>,
        pub reminders_created: usize,
        pub warnings: Vec<String>,
    }

    impl APIResponse {
        pub fn new(plans: Vec<MedicationPlan>, reminders_created: usize, warnings: Vec<String>) -> Self {
            Self {
                plans: plans.into_iter().map(MedicationPlanDTO::new).collect(),
                reminders_created,
                warnings,
            }
        }
    }
}
