use crate::dtos::ReminderDTO;
use dosewatch_domain::{Reminder, ReminderSummary, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub reminder: ReminderDTO,
}

impl ReminderResponse {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            reminder: ReminderDTO::new(reminder),
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindersResponse {
    pub reminders: Vec<ReminderDTO>,
}

impl RemindersResponse {
    pub fn new(reminders: Vec<Reminder>) -> Self {
        Self {
            reminders: reminders.into_iter().map(ReminderDTO::new).collect(),
        }
    }
}

pub mod get_reminder {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod dismiss_reminder {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod get_today_reminders {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub baby_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        /// IANA timezone that decides what "today" is. Defaults to the
        /// configured default timezone.
        #[serde(default)]
        pub timezone: Option<String>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<ReminderDTO>,
        pub summary: ReminderSummary,
    }

    impl APIResponse {
        pub fn new(reminders: Vec<Reminder>) -> Self {
            let summary = ReminderSummary::from_reminders(&reminders);
            Self {
                reminders: reminders.into_iter().map(ReminderDTO::new).collect(),
                summary,
            }
        }
    }
}

pub mod get_parent_reminders {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub parent_id: ID,
    }

    #[derive(Deserialize, Serialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        #[serde(default)]
        pub status: Option<String>,
        /// `YYYY-MM-DD`, inclusive
        #[serde(default)]
        pub start_date: Option<String>,
        /// `YYYY-MM-DD`, inclusive
        #[serde(default)]
        pub end_date: Option<String>,
    }

    pub type APIResponse = RemindersResponse;
}
