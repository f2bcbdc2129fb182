use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::cache::{GlucoseReading, GlucoseUnits, Trend};

/// 厂商时间戳格式，如 `11/18/2024 5:40:12 PM`
const VENDOR_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";
const MMOL_TO_MG_DL: f64 = 18.0;

/// `/api/v1/entries` 接受的单条记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NightscoutEntry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// 毫秒时间戳
    pub date: i64,
    #[serde(rename = "dateString")]
    pub date_string: String,
    pub sgv: i64,
    pub direction: &'static str,
    pub device: &'static str,
}

impl NightscoutEntry {
    pub fn from_reading(reading: &GlucoseReading) -> Self {
        let measured_at = measured_at(reading);
        Self {
            kind: "sgv",
            date: measured_at.timestamp_millis(),
            date_string: measured_at.to_rfc3339(),
            sgv: sgv(reading),
            direction: direction(reading.trend),
            device: "glucose-relay",
        }
    }
}

/// FactoryTimestamp 是 UTC，缺失或无法解析时退回抓取时间
fn measured_at(reading: &GlucoseReading) -> DateTime<Utc> {
    reading
        .factory_timestamp
        .as_deref()
        .and_then(|ts| NaiveDateTime::parse_from_str(ts.trim(), VENDOR_TIMESTAMP_FORMAT).ok())
        .map(|naive| naive.and_utc())
        .unwrap_or(reading.fetched_at)
}

fn sgv(reading: &GlucoseReading) -> i64 {
    let mg_dl = match (reading.value_mg_dl, reading.units) {
        (Some(value), _) => value,
        (None, Some(GlucoseUnits::MmolPerL)) => reading.value * MMOL_TO_MG_DL,
        (None, _) => reading.value,
    };
    mg_dl.round() as i64
}

fn direction(trend: Option<Trend>) -> &'static str {
    match trend {
        Some(Trend::SingleDown) => "SingleDown",
        Some(Trend::FortyFiveDown) => "FortyFiveDown",
        Some(Trend::Flat) => "Flat",
        Some(Trend::FortyFiveUp) => "FortyFiveUp",
        Some(Trend::SingleUp) => "SingleUp",
        None => "NONE",
    }
}
