//! Response normalization.
//!
//! The device mostly answers with JSON envelopes, but nothing guarantees it.
//! [`ApiResponse`] keeps the status and headers verbatim and classifies the
//! body once: JSON when it decodes, text otherwise. Binary asset fetches skip
//! decoding and keep the raw bytes.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::defaults::keys;

/// Classified response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

/// Body classification tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
    Bytes,
}

impl ResponseBody {
    /// Decode `bytes` as JSON, falling back to (lossy UTF-8) text.
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(json) => Self::Json(json),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub const fn kind(&self) -> BodyKind {
        match self {
            Self::Json(_) => BodyKind::Json,
            Self::Text(_) => BodyKind::Text,
            Self::Bytes(_) => BodyKind::Bytes,
        }
    }
}

/// Result of [`ApiResponse::as_json_or_text`]; never binary.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedBody {
    Json(Value),
    Text(String),
}

impl NormalizedBody {
    pub const fn kind(&self) -> BodyKind {
        match self {
            Self::Json(_) => BodyKind::Json,
            Self::Text(_) => BodyKind::Text,
        }
    }
}

/// Immutable HTTP response: status, headers, classified body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: ResponseBody,
}

impl ApiResponse {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Build from a raw body, decoding JSON when possible.
    pub fn decoded(status: u16, headers: BTreeMap<String, String>, raw: &[u8]) -> Self {
        Self::new(status, headers, ResponseBody::decode(raw))
    }

    /// Build from a raw body without attempting to decode it.
    pub fn binary(status: u16, headers: BTreeMap<String, String>, raw: Vec<u8>) -> Self {
        Self::new(status, headers, ResponseBody::Bytes(raw))
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Header lookup; names are stored lowercased.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub const fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Status in the 2xx range.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decoded JSON body, if the body was JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Body as text (JSON re-serialized, bytes decoded lossily).
    pub fn text(&self) -> String {
        match &self.body {
            ResponseBody::Json(v) => v.to_string(),
            ResponseBody::Text(t) => t.clone(),
            ResponseBody::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// JSON when the body decodes as JSON, raw text otherwise. Never fails.
    pub fn as_json_or_text(&self) -> NormalizedBody {
        match &self.body {
            ResponseBody::Json(v) => NormalizedBody::Json(v.clone()),
            ResponseBody::Text(t) => NormalizedBody::Text(t.clone()),
            ResponseBody::Bytes(b) => match ResponseBody::decode(b) {
                ResponseBody::Json(v) => NormalizedBody::Json(v),
                _ => NormalizedBody::Text(String::from_utf8_lossy(b).into_owned()),
            },
        }
    }

    /// The `result` member of a JSON envelope, if present.
    pub fn result_payload(&self) -> Option<&Value> {
        self.json()
            .and_then(Value::as_object)
            .and_then(|obj| obj.get(keys::RESULT))
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status Code: {}", self.status)?;
        writeln!(f, "Headers: {:?}", self.headers)?;
        match &self.body {
            ResponseBody::Json(v) => {
                let pretty = serde_json::to_string_pretty(v).map_err(|_| fmt::Error)?;
                writeln!(f, "Response Body:\n{pretty}")?;
            }
            ResponseBody::Text(t) => writeln!(f, "Response Body:\n{t}")?,
            ResponseBody::Bytes(b) => writeln!(f, "Response Body: <{} bytes>", b.len())?,
        }
        write!(f, "{}", "-".repeat(50))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers() -> BTreeMap<String, String> {
        BTreeMap::from([("content-type".to_string(), "application/json".to_string())])
    }

    #[test]
    fn valid_json_is_decoded() {
        let resp = ApiResponse::decoded(200, headers(), br#"{"status":"Success"}"#);
        assert_eq!(
            resp.as_json_or_text(),
            NormalizedBody::Json(json!({"status": "Success"}))
        );
        assert_eq!(resp.body().kind(), BodyKind::Json);
    }

    #[test]
    fn invalid_json_falls_back_to_literal_text() {
        let resp = ApiResponse::decoded(200, headers(), b"not json {");
        assert_eq!(
            resp.as_json_or_text(),
            NormalizedBody::Text("not json {".to_string())
        );
    }

    #[test]
    fn empty_body_is_text() {
        let resp = ApiResponse::decoded(204, BTreeMap::new(), b"");
        assert_eq!(resp.as_json_or_text().kind(), BodyKind::Text);
    }

    #[test]
    fn binary_body_keeps_bytes() {
        let raw = vec![0x52, 0x49, 0x46, 0x46, 0x00, 0xff];
        let resp = ApiResponse::binary(200, BTreeMap::new(), raw.clone());
        assert_eq!(resp.body(), &ResponseBody::Bytes(raw));
        assert_eq!(resp.as_json_or_text().kind(), BodyKind::Text);
    }

    #[test]
    fn result_payload_from_envelope() {
        let resp = ApiResponse::decoded(200, headers(), br#"{"result":[1,2],"status":"Success"}"#);
        assert_eq!(resp.result_payload(), Some(&json!([1, 2])));

        let bare = ApiResponse::decoded(200, headers(), b"[1,2]");
        assert_eq!(bare.result_payload(), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let resp = ApiResponse::decoded(200, headers(), b"{}");
        assert_eq!(resp.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn success_range() {
        assert!(ApiResponse::decoded(200, BTreeMap::new(), b"").is_success());
        assert!(ApiResponse::decoded(299, BTreeMap::new(), b"").is_success());
        assert!(!ApiResponse::decoded(300, BTreeMap::new(), b"").is_success());
        assert!(!ApiResponse::decoded(404, BTreeMap::new(), b"").is_success());
    }

    #[test]
    fn display_indents_json_by_two_spaces() {
        let resp = ApiResponse::decoded(200, BTreeMap::new(), br#"{"a":1}"#);
        let rendered = resp.to_string();
        assert!(rendered.starts_with("Status Code: 200\n"));
        assert!(rendered.contains("{\n  \"a\": 1\n}"));
        assert!(rendered.ends_with(&"-".repeat(50)));
    }
}
