use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 血糖读数缓存数据模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseReading {
    /// 厂商给出的数值，单位见 `units`
    pub value: f64,
    /// 厂商时间戳（本地时间）
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_mg_dl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    pub is_high: bool,
    pub is_low: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<GlucoseUnits>,
    pub patient_id: String,
    pub fetched_at: DateTime<Utc>,
}

/// 趋势箭头，命名沿用 Nightscout 的 direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    SingleDown,
    FortyFiveDown,
    Flat,
    FortyFiveUp,
    SingleUp,
}

impl Trend {
    pub fn from_arrow(arrow: u8) -> Option<Self> {
        match arrow {
            1 => Some(Self::SingleDown),
            2 => Some(Self::FortyFiveDown),
            3 => Some(Self::Flat),
            4 => Some(Self::FortyFiveUp),
            5 => Some(Self::SingleUp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseUnits {
    MmolPerL,
    MgPerDl,
}

impl GlucoseUnits {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::MmolPerL),
            1 => Some(Self::MgPerDl),
            _ => None,
        }
    }
}

impl GlucoseReading {
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.fetched_at).num_seconds().max(0)
    }
}
