//! JSON envelope wrapped around every content-service response

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage tag reported in `source`.
pub const SOURCE_SQLITE: &str = "sqlite";

/// `{ success, data?, count?, cached?, source?, query?, error?, message?, timestamp }`
///
/// Optional members are omitted from the JSON when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Echo of the query parameters a search ran with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    fn blank(success: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            success,
            data: None,
            count: None,
            cached: None,
            source: None,
            query: None,
            error: None,
            message: None,
            timestamp,
        }
    }

    pub fn ok(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            data: Some(data),
            ..Self::blank(true, timestamp)
        }
    }

    /// Success without payload, e.g. after a cache flush.
    pub fn message(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::blank(true, timestamp)
        }
    }

    pub fn error(error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::blank(false, timestamp)
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = Some(cached);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Unserializable queries are silently left out of the echo.
    pub fn with_query<Q: Serialize>(mut self, query: &Q) -> Self {
        self.query = serde_json::to_value(query).ok();
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List payload with `count` filled in.
    pub fn list(data: Vec<T>, timestamp: DateTime<Utc>) -> Self {
        let count = data.len();
        Self::ok(data, timestamp).with_count(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid time")
    }

    #[test]
    fn empty_list_is_still_a_success() {
        let json = serde_json::to_value(ApiResponse::<Vec<u8>>::list(vec![], at())).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 0);
        assert_eq!(json["data"], serde_json::json!([]));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error("boom", at())).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
    }
}
