// LibreLinkUp 厂商接口
// 登录（含区域重定向）、连接列表与图表数据拉取、响应解压

pub mod auth;
pub mod client;
pub mod fetcher;
pub mod models;
pub mod payload;

pub use auth::{Authenticator, LoginOutcome};
pub use client::LibreLinkClient;
pub use fetcher::GlucoseFetcher;
pub use payload::PayloadEncoding;
