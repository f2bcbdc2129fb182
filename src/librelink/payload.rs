use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 响应体的编码方式，由 Content-Encoding 和内容本身判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Plain,
    Gzip,
    Deflate,
}

impl PayloadEncoding {
    /// 没有 Content-Encoding 时按 gzip 魔数判断
    pub fn detect(content_encoding: Option<&str>, body: &[u8]) -> Result<Self, DecodeError> {
        let header = content_encoding
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty());

        match header.as_deref() {
            None | Some("identity") => {
                if body.starts_with(&GZIP_MAGIC) {
                    Ok(Self::Gzip)
                } else {
                    Ok(Self::Plain)
                }
            }
            Some("gzip") | Some("x-gzip") => Ok(Self::Gzip),
            Some("deflate") => Ok(Self::Deflate),
            Some(other) => Err(DecodeError::UnsupportedEncoding(other.to_string())),
        }
    }

    pub fn decode(self, body: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        match self {
            Self::Plain => return Ok(body.to_vec()),
            Self::Gzip => {
                GzDecoder::new(body).read_to_end(&mut out)?;
            }
            Self::Deflate => {
                ZlibDecoder::new(body).read_to_end(&mut out)?;
            }
        }
        Ok(out)
    }
}

/// 解压并解析 JSON
pub fn decode_json<T: DeserializeOwned>(
    content_encoding: Option<&str>,
    body: &[u8],
) -> Result<T, DecodeError> {
    let encoding = PayloadEncoding::detect(content_encoding, body)?;
    let plain = encoding.decode(body)?;
    Ok(serde_json::from_slice(&plain)?)
}
