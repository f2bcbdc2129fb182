use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::debug;

use crate::cache::GlucoseReading;
use crate::config::NightscoutConfig;
use crate::error::UploadError;
use crate::utils::nightscout_secret_hash;

use super::entry::NightscoutEntry;

pub const ENTRIES_PATH: &str = "/api/v1/entries";

#[derive(Debug, Clone)]
pub struct NightscoutUploader {
    http: reqwest::Client,
    entries_url: String,
}

impl NightscoutUploader {
    pub fn new(config: &NightscoutConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        // 十六进制摘要一定是合法的请求头
        if let Ok(secret) = HeaderValue::from_str(&nightscout_secret_hash(&config.api_secret)) {
            headers.insert("api-secret", secret);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            entries_url: format!("{}{}", config.url.trim_end_matches('/'), ENTRIES_PATH),
        })
    }

    /// 推送一条读数，失败由调用方记录
    pub async fn upload(&self, reading: &GlucoseReading) -> Result<(), UploadError> {
        let entry = NightscoutEntry::from_reading(reading);
        let response = self.http.post(&self.entries_url).json(&entry).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::HttpStatus(status));
        }
        debug!("Uploaded sgv {} ({}) to Nightscout", entry.sgv, entry.direction);
        Ok(())
    }
}
