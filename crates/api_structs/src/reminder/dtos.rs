use dosewatch_domain::{DoseTime, NotificationChannel, Reminder, ReminderStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: ID,
    pub baby_id: ID,
    pub parent_id: ID,
    pub plan_id: Option<ID>,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub dose_time: DoseTime,
    pub scheduled_for: i64,
    pub channels: Vec<NotificationChannel>,
    pub status: ReminderStatus,
    pub attempt_count: i64,
    pub last_attempt_at: Option<i64>,
    pub error_message: Option<String>,
    pub next_attempt_at: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

impl ReminderDTO {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            id: reminder.id,
            baby_id: reminder.baby_id,
            parent_id: reminder.parent_id,
            plan_id: reminder.plan_id,
            medicine_name: reminder.medicine_name,
            dosage: reminder.dosage,
            frequency: reminder.frequency,
            dose_time: reminder.dose_time,
            scheduled_for: reminder.scheduled_for,
            channels: reminder.channels,
            status: reminder.status,
            attempt_count: reminder.attempt_count,
            last_attempt_at: reminder.last_attempt_at,
            error_message: reminder.error_message,
            next_attempt_at: reminder.next_attempt_at,
            created: reminder.created,
            updated: reminder.updated,
        }
    }
}
