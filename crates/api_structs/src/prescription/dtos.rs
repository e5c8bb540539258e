use dosewatch_domain::{DoseTime, MedicationPlan, NotificationChannel, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationPlanDTO {
    pub id: ID,
    pub baby_id: ID,
    pub parent_id: ID,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub dose_schedule: Vec<DoseTime>,
    pub channels: Vec<NotificationChannel>,
    pub timezone: String,
    pub active_until: Option<i64>,
}

impl MedicationPlanDTO {
    pub fn new(plan: MedicationPlan) -> Self {
        Self {
            id: plan.id,
            baby_id: plan.baby_id,
            parent_id: plan.parent_id,
            medicine_name: plan.medicine_name,
            dosage: plan.dosage,
            frequency: plan.frequency,
            dose_schedule: plan.dose_schedule,
            channels: plan.channels,
            timezone: plan.timezone.to_string(),
            active_until: plan.active_until,
        }
    }
}
