// 可选的 Nightscout 上传
// 每次成功写入缓存后把最新读数作为一条 sgv 记录推送出去
pub mod entry;
pub mod uploader;

pub use entry::NightscoutEntry;
pub use uploader::NightscoutUploader;
