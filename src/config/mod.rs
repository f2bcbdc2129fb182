use std::env;
use std::time::Duration;

mod display;

pub use display::{DisplayConfig, OffsetRule};

/// 默认的 LibreLinkUp 接口地址
pub const DEFAULT_BASE_URL: &str = "https://api.libreview.io";
/// 区域接口地址模板，`{region}` 会被替换
pub const DEFAULT_REGION_URL_TEMPLATE: &str = "https://api-{region}.libreview.io";
pub const DEFAULT_PRODUCT: &str = "llu.ios";
pub const DEFAULT_VERSION: &str = "4.12.0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {0} must not be empty")]
    Empty(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub poll_interval_secs: u64,
    pub vendor: VendorConfig,
    pub display: DisplayConfig,
    pub nightscout: Option<NightscoutConfig>,
}

/// 厂商接口相关配置
#[derive(Debug, Clone)]
pub struct VendorConfig {
    pub email: String,
    pub password: String,
    pub base_url: String,
    pub region_url_template: String,
    pub product: String,
    pub version: String,
    pub user_agent: String,
    pub patient_id: Option<String>,
    pub proxy: Option<ProxyConfig>,
    pub request_timeout_secs: u64,
}

/// Nightscout 上传配置，地址和密钥同时设置才启用
#[derive(Debug, Clone)]
pub struct NightscoutConfig {
    pub url: String,
    pub api_secret: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源解析配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| match lookup(key) {
            None => Err(ConfigError::Missing(key)),
            Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(key)),
            Some(v) => Ok(v),
        };

        let server_port = match get("SERVER_PORT").or_else(|| get("PORT")) {
            Some(v) => parse_value("SERVER_PORT", &v)?,
            None => 5000,
        };
        let poll_interval_secs = match get("POLL_INTERVAL_SECS") {
            Some(v) => parse_value("POLL_INTERVAL_SECS", &v)?,
            None => 60,
        };
        if poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "POLL_INTERVAL_SECS",
                value: "0".into(),
            });
        }
        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => parse_value("REQUEST_TIMEOUT_SECS", &v)?,
            None => 30,
        };
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "REQUEST_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        let region_url_template = get("LIBRELINKUP_REGION_URL_TEMPLATE")
            .unwrap_or_else(|| DEFAULT_REGION_URL_TEMPLATE.to_string());
        // 指定区域时直接使用区域地址，省去一次重定向
        let base_url = match get("LIBRELINKUP_REGION") {
            Some(region) => regional_url(&region_url_template, &region),
            None => get("LIBRELINKUP_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };
        let version = get("LIBRELINKUP_VERSION").unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let user_agent = get("LIBRELINKUP_USER_AGENT").unwrap_or_else(|| {
            format!("FreeStyle LibreLink Up/{} (iOS; 15.2; iPhone; en_US)", version)
        });

        let proxy = get("HTTP_PROXY_URL").map(|url| ProxyConfig {
            url,
            username: get("HTTP_PROXY_USERNAME"),
            password: get("HTTP_PROXY_PASSWORD"),
        });

        let vendor = VendorConfig {
            email: required("LIBRELINKUP_EMAIL")?,
            password: required("LIBRELINKUP_PASSWORD")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            region_url_template,
            product: get("LIBRELINKUP_PRODUCT").unwrap_or_else(|| DEFAULT_PRODUCT.to_string()),
            version,
            user_agent,
            patient_id: get("LIBRELINKUP_PATIENT_ID"),
            proxy,
            request_timeout_secs,
        };

        let nightscout = match (get("NIGHTSCOUT_URL"), get("NIGHTSCOUT_API_SECRET")) {
            (Some(url), Some(api_secret)) => Some(NightscoutConfig {
                url: url.trim_end_matches('/').to_string(),
                api_secret,
                request_timeout_secs,
            }),
            (Some(_), None) => return Err(ConfigError::Missing("NIGHTSCOUT_API_SECRET")),
            (None, Some(_)) => return Err(ConfigError::Missing("NIGHTSCOUT_URL")),
            (None, None) => None,
        };

        Ok(Config {
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            api_base_uri: get("API_BASE_URI").unwrap_or_default(),
            poll_interval_secs,
            vendor,
            display: DisplayConfig::from_lookup(&get)?,
            nightscout,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl NightscoutConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl VendorConfig {
    /// 仅设置账号信息，其余使用默认值
    pub fn with_credentials(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            region_url_template: DEFAULT_REGION_URL_TEMPLATE.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            version: DEFAULT_VERSION.to_string(),
            user_agent: format!(
                "FreeStyle LibreLink Up/{} (iOS; 15.2; iPhone; en_US)",
                DEFAULT_VERSION
            ),
            patient_id: None,
            proxy: None,
            request_timeout_secs: 30,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn regional_base_url(&self, region: &str) -> String {
        regional_url(&self.region_url_template, region)
    }
}

fn regional_url(template: &str, region: &str) -> String {
    template
        .replace("{region}", &region.trim().to_lowercase())
        .trim_end_matches('/')
        .to_string()
}

pub(crate) fn parse_value<T: std::str::FromStr>(
    key: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
