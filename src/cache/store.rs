use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use super::models::{CachedSession, GlucoseReading, PollStatus};

/// 轮询任务与 HTTP 接口共享的状态
///
/// 读数以 `Arc` 整体替换，读者只会看到旧值或新值。
#[derive(Debug, Default)]
pub struct GlucoseStore {
    reading: RwLock<Option<Arc<GlucoseReading>>>,
    session: RwLock<Option<CachedSession>>,
    status: RwLock<PollStatus>,
    in_flight: Mutex<()>,
}

impl GlucoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取最近一次成功的读数
    pub async fn latest(&self) -> Option<Arc<GlucoseReading>> {
        self.reading.read().await.clone()
    }

    /// 发布新读数，覆盖旧值
    pub async fn publish(&self, reading: GlucoseReading) -> Arc<GlucoseReading> {
        let reading = Arc::new(reading);
        *self.reading.write().await = Some(reading.clone());
        reading
    }

    pub async fn session(&self) -> Option<CachedSession> {
        self.session.read().await.clone()
    }

    pub async fn set_session(&self, session: CachedSession) {
        *self.session.write().await = Some(session);
    }

    pub async fn clear_session(&self) {
        *self.session.write().await = None;
    }

    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn status(&self) -> PollStatus {
        self.status.read().await.clone()
    }

    /// 尝试占用本轮轮询，已有轮询在执行时返回 None
    pub fn try_begin_cycle(&self) -> Option<MutexGuard<'_, ()>> {
        self.in_flight.try_lock().ok()
    }

    pub async fn record_success(&self) {
        let now = Utc::now();
        let mut status = self.status.write().await;
        status.last_attempt_at = Some(now);
        status.last_success_at = Some(now);
        status.consecutive_failures = 0;
        status.total_cycles += 1;
        status.last_error = None;
    }

    pub async fn record_failure(&self, error: String) {
        let mut status = self.status.write().await;
        status.last_attempt_at = Some(Utc::now());
        status.consecutive_failures += 1;
        status.total_cycles += 1;
        status.last_error = Some(error);
    }

    pub async fn record_skip(&self) {
        self.status.write().await.skipped_ticks += 1;
    }

    /// 只更新上传统计，读数槽位不受影响
    pub async fn record_upload(&self, error: Option<String>) {
        let mut status = self.status.write().await;
        if error.is_none() {
            status.last_upload_at = Some(Utc::now());
        }
        status.last_upload_error = error;
    }
}
