use serde::Serialize;

use super::{ConfigError, parse_value};

/// 区间偏移规则：`min <= value < max` 时加上 `offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetRule {
    pub min: f64,
    pub max: f64,
    pub offset: f64,
}

/// 展示相关配置，原样透传给客户端
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayConfig {
    #[serde(skip)]
    pub offsets: Vec<OffsetRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_high: Option<f64>,
}

impl DisplayConfig {
    pub(crate) fn from_lookup<G>(get: &G) -> Result<Self, ConfigError>
    where
        G: Fn(&str) -> Option<String>,
    {
        let offsets = match get("GLUCOSE_OFFSETS") {
            Some(raw) => parse_offsets(&raw)?,
            None => Vec::new(),
        };
        let target_low = get("TARGET_LOW")
            .map(|v| parse_value("TARGET_LOW", &v))
            .transpose()?;
        let target_high = get("TARGET_HIGH")
            .map(|v| parse_value("TARGET_HIGH", &v))
            .transpose()?;

        Ok(Self {
            offsets,
            units: get("DISPLAY_UNITS"),
            target_low,
            target_high,
        })
    }

    /// 第一条命中的规则生效，没有命中则原样返回
    pub fn adjust(&self, value: f64) -> f64 {
        self.offsets
            .iter()
            .find(|rule| value >= rule.min && value < rule.max)
            .map(|rule| value + rule.offset)
            .unwrap_or(value)
    }
}

/// 格式：`0-70:+5,250-400:-10`
pub fn parse_offsets(raw: &str) -> Result<Vec<OffsetRule>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "GLUCOSE_OFFSETS",
        value: raw.to_string(),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (range, offset) = part.split_once(':').ok_or_else(invalid)?;
            let (min, max) = split_range(range.trim()).ok_or_else(invalid)?;
            let rule = OffsetRule {
                min: min.trim().parse().map_err(|_| invalid())?,
                max: max.trim().parse().map_err(|_| invalid())?,
                offset: offset.trim().parse().map_err(|_| invalid())?,
            };
            if rule.min >= rule.max {
                return Err(invalid());
            }
            Ok(rule)
        })
        .collect()
}

/// 下限可以带负号，所以从第二个字符开始找分隔符
fn split_range(range: &str) -> Option<(&str, &str)> {
    let at = range.get(1..)?.find('-')? + 1;
    Some((&range[..at], &range[at + 1..]))
}
