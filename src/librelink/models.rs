// LibreLinkUp 接口的数据结构，只解析用得到的字段

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{GlucoseReading, GlucoseUnits, Trend};
use crate::error::FetchError;

/// 所有接口共用的外层结构
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// 缺省时视为 0（成功）
    #[serde(default)]
    pub status: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<VendorError>,
}

#[derive(Debug, Deserialize)]
pub struct VendorError {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub redirect: bool,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub auth_ticket: Option<AuthTicket>,
    #[serde(default)]
    pub user: Option<VendorUser>,
    #[serde(default)]
    pub step: Option<serde_json::Value>,
    #[serde(default)]
    pub minimum_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthTicket {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VendorUser {
    pub id: String,
}

/// 关注的患者
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub patient_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub glucose_measurement: Option<Measurement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    #[serde(default)]
    pub connection: Option<Connection>,
}

/// 单次测量，字段名为厂商的 PascalCase
#[derive(Debug, Clone, Deserialize)]
pub struct Measurement {
    #[serde(rename = "Value", default)]
    pub value: Option<f64>,
    #[serde(rename = "ValueInMgPerDl", default)]
    pub value_in_mg_per_dl: Option<f64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "FactoryTimestamp", default)]
    pub factory_timestamp: Option<String>,
    #[serde(rename = "TrendArrow", default)]
    pub trend_arrow: Option<u8>,
    #[serde(rename = "GlucoseUnits", default)]
    pub glucose_units: Option<u8>,
    #[serde(rename = "isHigh", default)]
    pub is_high: bool,
    #[serde(rename = "isLow", default)]
    pub is_low: bool,
}

impl Measurement {
    /// 只做存在性检查：数值和时间戳必须至少有一个来源
    pub fn into_reading(
        self,
        patient_id: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<GlucoseReading, FetchError> {
        let value = self
            .value
            .or(self.value_in_mg_per_dl)
            .ok_or(FetchError::MissingField("glucoseMeasurement.Value"))?;
        let timestamp = self
            .timestamp
            .or_else(|| self.factory_timestamp.clone())
            .ok_or(FetchError::MissingField("glucoseMeasurement.Timestamp"))?;

        Ok(GlucoseReading {
            value,
            timestamp,
            factory_timestamp: self.factory_timestamp,
            value_mg_dl: self.value_in_mg_per_dl,
            trend: self.trend_arrow.and_then(Trend::from_arrow),
            is_high: self.is_high,
            is_low: self.is_low,
            units: self.glucose_units.and_then(GlucoseUnits::from_code),
            patient_id: patient_id.to_string(),
            fetched_at,
        })
    }
}
