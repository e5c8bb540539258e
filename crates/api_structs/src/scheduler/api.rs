use crate::dtos::SchedulerStatusDTO;

pub mod get_scheduler_status {
    use super::*;

    pub type APIResponse = SchedulerStatusDTO;
}
