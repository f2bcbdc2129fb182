use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::CachedSession;
use crate::config::VendorConfig;
use crate::error::DecodeError;

use super::payload::decode_json;

/// 厂商接口的 HTTP 客户端，负责伪装成官方 App 的请求头
#[derive(Debug, Clone)]
pub struct LibreLinkClient {
    http: reqwest::Client,
    config: VendorConfig,
}

/// 已读完的响应，body 可能仍是压缩数据
#[derive(Debug)]
pub struct VendorResponse {
    pub status: StatusCode,
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

impl VendorResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        decode_json(self.content_encoding.as_deref(), &self.body)
    }
}

impl LibreLinkClient {
    pub fn new(config: VendorConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(vendor_headers(&config));

        // 只使用显式配置的代理，忽略系统代理环境变量
        builder = match &config.proxy {
            Some(proxy) => {
                let mut p = reqwest::Proxy::all(&proxy.url)?;
                if let Some(username) = &proxy.username {
                    p = p.basic_auth(username, proxy.password.as_deref().unwrap_or_default());
                }
                builder.proxy(p)
            }
            None => builder.no_proxy(),
        };

        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &VendorConfig {
        &self.config
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        base: &str,
        path: &str,
        body: &B,
    ) -> Result<VendorResponse, reqwest::Error> {
        let request = self
            .http
            .request(Method::POST, join_url(base, path))
            .json(body);
        Self::finish(request.send().await?).await
    }

    /// 携带会话令牌的 GET 请求
    pub async fn get_authorized(
        &self,
        session: &CachedSession,
        path: &str,
    ) -> Result<VendorResponse, reqwest::Error> {
        let mut request = self
            .http
            .get(join_url(&session.api_base, path))
            .bearer_auth(&session.token);
        if let Some(account_id) = &session.account_id {
            request = request.header("account-id", account_id);
        }
        Self::finish(request.send().await?).await
    }

    async fn finish(response: reqwest::Response) -> Result<VendorResponse, reqwest::Error> {
        let status = response.status();
        let content_encoding = response
            .headers()
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(
            "Vendor responded {} {} (encoding: {:?})",
            status,
            response.url().path(),
            content_encoding
        );
        let body = response.bytes().await?.to_vec();
        Ok(VendorResponse {
            status,
            content_encoding,
            body,
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn vendor_headers(config: &VendorConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in [("product", &config.product), ("version", &config.version)] {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(HeaderName::from_static(name), v);
            }
            Err(_) => tracing::warn!("Ignoring invalid {} header value {:?}", name, value),
        }
    }
    headers
}
