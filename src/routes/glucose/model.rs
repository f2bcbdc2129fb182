use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::GlucoseReading;
use crate::config::DisplayConfig;

/// `/glucose` 返回的数据
#[derive(Debug, Serialize)]
pub struct GlucoseView {
    pub reading: GlucoseReading,
    /// 按区间偏移规则调整后的值
    pub display_value: f64,
    /// 距离拉取时间的秒数
    pub age_secs: i64,
    pub settings: DisplayConfig,
}

impl GlucoseView {
    pub fn new(reading: &GlucoseReading, display: &DisplayConfig, now: DateTime<Utc>) -> Self {
        Self {
            display_value: display.adjust(reading.value),
            age_secs: reading.age_secs(now),
            reading: reading.clone(),
            settings: display.clone(),
        }
    }
}
