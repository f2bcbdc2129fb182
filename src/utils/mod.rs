use axum::Json;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::common::ApiResponse;

/// 新版接口要求的 Account-Id：用户ID的 SHA-256 十六进制串
pub fn account_id_hash(user_id: &str) -> String {
    format!("{:x}", Sha256::digest(user_id.as_bytes()))
}

/// Nightscout 的 api-secret 请求头：密钥的 SHA-1 十六进制串
pub fn nightscout_secret_hash(secret: &str) -> String {
    format!("{:x}", Sha1::digest(secret.as_bytes()))
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const NOT_FOUND: i32 = 1004;
}
