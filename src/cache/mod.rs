// 进程内缓存
// 保存最近一次成功拉取的血糖读数、厂商会话以及轮询状态

pub mod models;
mod store;

pub use models::{CachedSession, GlucoseReading, GlucoseUnits, PollStatus, Trend};
pub use store::GlucoseStore;
