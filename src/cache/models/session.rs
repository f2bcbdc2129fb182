use std::fmt;

use chrono::{DateTime, Utc};

/// 厂商会话：令牌只在进程内复用，直到缺失或被 401 作废
#[derive(Clone, PartialEq)]
pub struct CachedSession {
    pub token: String,
    /// 令牌所属的接口地址，重定向后为区域地址
    pub api_base: String,
    /// `Account-Id` 请求头的值
    pub account_id: Option<String>,
    pub obtained_at: DateTime<Utc>,
}

impl fmt::Debug for CachedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedSession")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("account_id", &self.account_id)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}
