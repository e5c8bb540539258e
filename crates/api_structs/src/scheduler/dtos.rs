use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// A processing pass is executing
    Running,
    /// Started and waiting for the next tick
    Idle,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatusDTO {
    pub state: SchedulerState,
    pub last_run_at: Option<i64>,
    pub last_batch_size: Option<usize>,
    pub last_cleanup_at: Option<i64>,
    pub last_cleanup_deleted: Option<i64>,
    pub last_expansion_at: Option<i64>,
    pub last_expansion_created: Option<usize>,
}
