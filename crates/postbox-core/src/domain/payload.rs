//! Payload - 配送される単位
//!
//! # 学習ポイント
//! - Trait で「シリアライズ方法」だけを要求し、中身には関与しない
//! - serde の `Serialize` を持つ型は `JsonPayload` で包むだけで送れる

use serde::Serialize;

/// Payload はキューに投入されるデータ
///
/// The queue never looks inside a payload. It only needs the text that will be
/// stored and later handed to the transport as-is.
pub trait Payload {
    /// Serialized representation written to the store.
    fn to_body(&self) -> Result<String, serde_json::Error>;
}

/// Any `Serialize` value, stored as JSON.
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize)]
/// struct Event { name: String }
///
/// manager.submit(&JsonPayload(Event { name: "launch".into() }))?;
/// ```
#[derive(Debug, Clone)]
pub struct JsonPayload<T>(pub T);

impl<T: Serialize> Payload for JsonPayload<T> {
    fn to_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

/// Body that is already serialized by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(String);

impl RawPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Payload for RawPayload {
    fn to_body(&self) -> Result<String, serde_json::Error> {
        Ok(self.0.clone())
    }
}

impl Payload for serde_json::Value {
    fn to_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Launch {
        version: String,
        cold_start: bool,
    }

    #[test]
    fn json_payload_serializes_inner_value() {
        let p = JsonPayload(Launch {
            version: "1.2.0".to_string(),
            cold_start: true,
        });
        let body = p.to_body().unwrap();
        let back: Launch = serde_json::from_str(&body).unwrap();
        assert_eq!(back, p.0);
    }

    #[test]
    fn raw_payload_is_passed_through_untouched() {
        let p = RawPayload::new("not even json");
        assert_eq!(p.to_body().unwrap(), "not even json");
    }

    #[test]
    fn json_value_is_a_payload() {
        let v = serde_json::json!({"event": "open"});
        assert_eq!(v.to_body().unwrap(), r#"{"event":"open"}"#);
    }
}
