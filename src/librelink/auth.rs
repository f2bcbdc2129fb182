use chrono::Utc;
use tracing::{debug, info};

use crate::cache::CachedSession;
use crate::error::AuthError;
use crate::utils::account_id_hash;

use super::client::LibreLinkClient;
use super::models::{Envelope, LoginData, LoginRequest};

pub const LOGIN_PATH: &str = "/llu/auth/login";

/// 登录接口的两种合法返回
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// 直接签发令牌
    Ticket {
        token: String,
        account_id: Option<String>,
    },
    /// 账号属于其他区域，需要到区域地址重新登录
    Redirect { region: String },
}

impl LoginOutcome {
    pub fn classify(envelope: Envelope<LoginData>) -> Result<Self, AuthError> {
        match envelope.status {
            0 => {
                let data = envelope.data.unwrap_or_default();
                if data.redirect {
                    return data
                        .region
                        .filter(|r| !r.trim().is_empty())
                        .map(|region| LoginOutcome::Redirect { region })
                        .ok_or_else(|| AuthError::UnexpectedShape {
                            status: 0,
                            detail: "redirect without region".into(),
                        });
                }
                match data.auth_ticket.and_then(|t| t.token).filter(|t| !t.is_empty()) {
                    Some(token) => Ok(LoginOutcome::Ticket {
                        token,
                        account_id: data.user.map(|u| account_id_hash(&u.id)),
                    }),
                    None => Err(AuthError::UnexpectedShape {
                        status: 0,
                        detail: "missing authTicket.token".into(),
                    }),
                }
            }
            2 => Err(AuthError::BadCredentials),
            4 => {
                let step = envelope
                    .data
                    .and_then(|d| d.step)
                    .and_then(|s| {
                        s.get("type")
                            .or_else(|| s.get("componentName"))
                            .and_then(|v| v.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| "unknown".into());
                Err(AuthError::StepRequired(step))
            }
            920 => Err(AuthError::VersionRejected(
                envelope
                    .data
                    .and_then(|d| d.minimum_version)
                    .unwrap_or_else(|| "unknown".into()),
            )),
            status => Err(AuthError::UnexpectedShape {
                status,
                detail: envelope
                    .error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "no error message".into()),
            }),
        }
    }
}

/// 负责换取厂商令牌
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: LibreLinkClient,
}

impl Authenticator {
    pub fn new(client: LibreLinkClient) -> Self {
        Self { client }
    }

    /// 登录，最多跟随一次区域重定向
    pub async fn login(&self) -> Result<CachedSession, AuthError> {
        let base = self.client.config().base_url.clone();
        let (api_base, token, account_id) = match self.login_at(&base).await? {
            LoginOutcome::Ticket { token, account_id } => (base, token, account_id),
            LoginOutcome::Redirect { region } => {
                let regional = self.client.config().regional_base_url(&region);
                info!("Login redirected to region {} ({})", region, regional);
                match self.login_at(&regional).await? {
                    LoginOutcome::Ticket { token, account_id } => (regional, token, account_id),
                    LoginOutcome::Redirect { region } => {
                        return Err(AuthError::RedirectLoop(region));
                    }
                }
            }
        };

        info!("Authenticated against {}", api_base);
        Ok(CachedSession {
            token,
            api_base,
            account_id,
            obtained_at: Utc::now(),
        })
    }

    async fn login_at(&self, base: &str) -> Result<LoginOutcome, AuthError> {
        let config = self.client.config();
        debug!("Logging in at {}", base);
        let response = self
            .client
            .post_json(
                base,
                LOGIN_PATH,
                &LoginRequest {
                    email: &config.email,
                    password: &config.password,
                },
            )
            .await?;

        if !response.status.is_success() {
            return Err(AuthError::HttpStatus(response.status));
        }
        LoginOutcome::classify(response.json()?)
    }
}
