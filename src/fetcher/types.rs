use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

/// A fetched page, decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    /// WHATWG name of the encoding the body was decoded from.
    pub encoding: &'static str,
    pub body_raw: Bytes,
    pub body_utf8: String,
    /// Set when some byte sequences could not be decoded and were replaced.
    pub lossy: bool,
    pub fetched_at: DateTime<Utc>,
}
