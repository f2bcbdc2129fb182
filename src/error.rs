use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwest::StatusCode as VendorStatus;

use crate::common::ApiResponse;
use crate::utils::error_codes;

/// 响应体解码错误
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("failed to decompress payload: {0}")]
    Decompress(#[from] std::io::Error),
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// 登录失败
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login rejected: bad credentials")]
    BadCredentials,
    #[error("login requires an additional account step: {0}")]
    StepRequired(String),
    #[error("client version rejected by vendor (minimum {0})")]
    VersionRejected(String),
    #[error("vendor redirected twice (last region {0})")]
    RedirectLoop(String),
    #[error("unexpected login response (status {status}): {detail}")]
    UnexpectedShape { status: i64, detail: String },
    #[error("login http status {0}")]
    HttpStatus(VendorStatus),
    #[error("login request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// 拉取失败，本轮放弃，缓存保持不变
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("vendor rejected the session token")]
    Unauthorized,
    #[error("vendor returned http status {0}")]
    HttpStatus(VendorStatus),
    #[error("vendor returned status {0} in body")]
    VendorStatus(i64),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("missing field in vendor response: {0}")]
    MissingField(&'static str),
    #[error("account has no connections")]
    NoConnections,
    #[error("configured patient {0} not found among connections")]
    PatientNotFound(String),
}

/// Nightscout 上传失败，只记录日志，不影响缓存
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("nightscout returned http status {0}")]
    HttpStatus(VendorStatus),
    #[error("nightscout request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 对外接口错误
#[derive(Debug)]
pub enum AppError {
    NoDataAvailable,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            AppError::NoDataAvailable => (
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                "暂无血糖数据".to_string(),
            ),
        };

        let body = Json(ApiResponse::<()> {
            code,
            msg,
            resp_data: None,
        });

        (status, body).into_response()
    }
}
