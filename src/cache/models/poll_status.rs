use chrono::{DateTime, Utc};
use serde::Serialize;

/// 轮询状态统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollStatus {
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub total_cycles: u64,
    pub skipped_ticks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Nightscout 上传统计，未启用时保持为空
    pub last_upload_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_upload_error: Option<String>,
}
