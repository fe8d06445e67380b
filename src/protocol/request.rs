//! Request and Response message types.
//!
//! Both travel as UTF-8 JSON text. Requests flow from the UI script to the
//! native host; Responses flow back through the response callback.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CorrelationId;

use super::payload::{ErrorCode, ErrorPayload};
use super::{Operation, PROTOCOL_VERSION};

// ============================================================================
// Request
// ============================================================================

/// A bridge request from the UI.
///
/// # Format
///
/// ```json
/// {
///   "protocol": "1.0",
///   "id": "uuid",
///   "type": "READ_FILE",
///   "payload": { "path": "notes.txt" }
/// }
/// ```
///
/// `id` and `type` are required. `protocol` defaults to
/// [`PROTOCOL_VERSION`] and `payload` to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version. Reserved, not negotiated.
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Correlation id chosen by the UI.
    pub id: CorrelationId,

    /// Operation to run.
    #[serde(rename = "type")]
    pub operation: Operation,

    /// Operation-specific data, validated by the target service.
    #[serde(default)]
    pub payload: Value,
}

/// Serde default for [`Request::protocol`].
fn default_protocol() -> String {
    PROTOCOL_VERSION.to_string()
}

impl Request {
    /// Creates a request with a generated correlation id.
    #[inline]
    #[must_use]
    pub fn new(operation: Operation, payload: Value) -> Self {
        Self::with_id(CorrelationId::generate(), operation, payload)
    }

    /// Creates a request with a specific correlation id.
    #[inline]
    #[must_use]
    pub fn with_id(id: CorrelationId, operation: Operation, payload: Value) -> Self {
        Self {
            protocol: default_protocol(),
            id,
            operation,
            payload,
        }
    }

    /// Decodes a request from its wire text.
    ///
    /// The text is parsed as generic JSON first so the correlation id can
    /// be recovered for the error Response even when the rest of the
    /// message is unusable.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the text is not JSON, a required field is
    /// missing, or `type` is not a known operation.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::decode(None, e.to_string()))?;

        let id = value
            .get("id")
            .and_then(Value::as_str)
            .map(CorrelationId::from);

        serde_json::from_value(value).map_err(|e| Error::decode(id, e.to_string()))
    }

    /// Encodes the request to wire text.
    ///
    /// # Errors
    ///
    /// [`Error::Encode`] if the payload cannot be serialized.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A bridge response delivered back to the UI.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": "uuid", "status": "SUCCESS", "payload": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": "uuid", "status": "ERROR", "payload": { "code": "...", "message": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echoed request id, or `"global"`.
    pub id: CorrelationId,

    /// Outcome.
    pub status: ResponseStatus,

    /// Result value or [`ErrorPayload`].
    #[serde(default)]
    pub payload: Value,
}

impl Response {
    /// Creates a success response.
    #[inline]
    #[must_use]
    pub fn success(id: CorrelationId, payload: Value) -> Self {
        Self {
            id,
            status: ResponseStatus::Success,
            payload,
        }
    }

    /// Creates an error response.
    #[must_use]
    pub fn error(id: CorrelationId, error: ErrorPayload) -> Self {
        let payload = serde_json::json!({
            "code": error.code,
            "message": error.message,
        });
        Self {
            id,
            status: ResponseStatus::Error,
            payload,
        }
    }

    /// Builds the minimal `ERROR` text used when encoding itself failed.
    ///
    /// Formatted by hand so it cannot fail in turn.
    #[must_use]
    pub fn encoding_failure(id: &CorrelationId, error: &Error) -> String {
        format!(
            r#"{{"id":{},"status":"ERROR","payload":{{"code":"{}","message":{}}}}}"#,
            Value::from(id.as_str()),
            ErrorCode::InternalError.as_str(),
            Value::from(error.to_string()),
        )
    }

    /// Encodes the response to wire text.
    ///
    /// # Errors
    ///
    /// [`Error::Encode`] if the payload cannot be serialized.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    /// Decodes a response from wire text.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the text is not a valid Response.
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::decode(None, e.to_string()))
    }

    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }

    /// Returns the error payload of an `ERROR` response.
    #[must_use]
    pub fn error_payload(&self) -> Option<ErrorPayload> {
        if !self.is_error() {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }

    /// Extracts the payload, turning an `ERROR` response into an error.
    ///
    /// # Errors
    ///
    /// [`Error::Internal`] carrying the remote code and message.
    pub fn into_result(self) -> Result<Value> {
        match self.status {
            ResponseStatus::Success => Ok(self.payload),
            ResponseStatus::Error => {
                let code = self.get_string("code");
                let message = self.get_string("message");
                Err(Error::internal(format!("{code}: {message}")))
            }
        }
    }

    /// Gets a string value from the payload.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a u64 value from the payload.
    ///
    /// Returns 0 if key not found or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.payload
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }

    /// Gets a boolean value from the payload.
    ///
    /// Returns false if key not found or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.payload
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }
}

// ============================================================================
// ResponseStatus
// ============================================================================

/// Response status discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// Operation succeeded.
    Success,
    /// Operation failed; payload is an [`ErrorPayload`].
    Error,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_request_decode() {
        let text = r#"{
            "protocol": "JWB/1.0",
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "READ_FILE",
            "payload": {"path": "notes.txt"}
        }"#;

        let request = Request::decode(text).expect("decode");
        assert_eq!(request.protocol, "JWB/1.0");
        assert_eq!(request.id.as_str(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(request.operation, Operation::ReadFile);
        assert_eq!(request.payload["path"], "notes.txt");
    }

    #[test]
    fn test_request_defaults_protocol_and_payload() {
        let request = Request::decode(r#"{"id": "1", "type": "INIT_APP"}"#).expect("decode");
        assert_eq!(request.protocol, PROTOCOL_VERSION);
        assert_eq!(request.payload, Value::Null);
    }

    #[test]
    fn test_request_string_payload() {
        let request =
            Request::decode(r#"{"id": "1", "type": "LOAD_HTML", "payload": "about.html"}"#)
                .expect("decode");
        assert_eq!(request.payload, json!("about.html"));
    }

    #[test]
    fn test_decode_rejects_malformed_text_without_id() {
        let err = Request::decode("{not json").expect_err("should fail");
        match err {
            Error::Decode { id, .. } => assert!(id.is_none()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_type_recovers_id() {
        let err = Request::decode(r#"{"id": "abc", "type": "DELETE_EVERYTHING"}"#)
            .expect_err("should fail");
        match err {
            Error::Decode { id, message } => {
                assert_eq!(id, Some(CorrelationId::new("abc")));
                assert!(message.contains("DELETE_EVERYTHING"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_missing_type_recovers_id() {
        let err = Request::decode(r#"{"id": "abc"}"#).expect_err("should fail");
        assert!(matches!(err, Error::Decode { id: Some(_), .. }));
    }

    #[test]
    fn test_decode_non_string_id_is_not_recovered() {
        let err = Request::decode(r#"{"id": 7, "type": "INIT_APP"}"#).expect_err("should fail");
        assert!(matches!(err, Error::Decode { id: None, .. }));
    }

    #[test]
    fn test_request_encode_uses_wire_names() {
        let request = Request::with_id(
            CorrelationId::new("x"),
            Operation::SpawnWindow,
            json!({"htmlPath": "about.html"}),
        );
        let json: Value =
            serde_json::from_str(&request.encode().expect("encode")).expect("valid json");
        assert_eq!(json["type"], "SPAWN_WINDOW");
        assert_eq!(json["protocol"], PROTOCOL_VERSION);
        assert_eq!(json["id"], "x");
    }

    #[test]
    fn test_success_response_encoding() {
        let response = Response::success(CorrelationId::new("a"), json!({"n": 1}));
        let json: Value =
            serde_json::from_str(&response.encode().expect("encode")).expect("valid json");
        assert_eq!(json, json!({"id": "a", "status": "SUCCESS", "payload": {"n": 1}}));
    }

    #[test]
    fn test_error_response_encoding() {
        let response = Response::error(
            CorrelationId::global(),
            ErrorPayload::new(ErrorCode::DecodeError, "bad"),
        );
        let json: Value =
            serde_json::from_str(&response.encode().expect("encode")).expect("valid json");
        assert_eq!(
            json,
            json!({
                "id": "global",
                "status": "ERROR",
                "payload": {"code": "DECODE_ERROR", "message": "bad"}
            })
        );
    }

    #[test]
    fn test_encoding_failure_is_valid_response() {
        let id = CorrelationId::new("quote\"id");
        let err = Error::internal("line\nbreak \"quoted\"");
        let text = Response::encoding_failure(&id, &err);

        let response = Response::decode(&text).expect("valid response");
        assert_eq!(response.id, id);
        assert!(response.is_error());
        let payload = response.error_payload().expect("error payload");
        assert_eq!(payload.code, ErrorCode::InternalError);
        assert!(payload.message.contains("\"quoted\""));
    }

    #[test]
    fn test_error_payload_only_for_errors() {
        let ok = Response::success(CorrelationId::new("a"), json!({"code": "X"}));
        assert!(ok.error_payload().is_none());
    }

    #[test]
    fn test_into_result() {
        let ok = Response::success(CorrelationId::new("a"), json!({"value": 42}));
        assert_eq!(ok.into_result().expect("success")["value"], 42);

        let err = Response::error(
            CorrelationId::new("a"),
            ErrorPayload::new(ErrorCode::FileReadError, "gone"),
        );
        let message = err.into_result().expect_err("error").to_string();
        assert!(message.contains("FILE_READ_ERROR"));
        assert!(message.contains("gone"));
    }

    #[test]
    fn test_response_get_helpers() {
        let response = Response::success(
            CorrelationId::new("a"),
            json!({"name": "test", "count": 42, "enabled": true}),
        );
        assert_eq!(response.get_string("name"), "test");
        assert_eq!(response.get_u64("count"), 42);
        assert!(response.get_bool("enabled"));

        assert_eq!(response.get_string("missing"), "");
        assert_eq!(response.get_u64("missing"), 0);
        assert!(!response.get_bool("missing"));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            any::<u64>().prop_map(Value::from),
            "[ -~]{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z_]{1,8}", inner, 0..6)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_response_decode_encode_is_lossless(
            id in "[a-zA-Z0-9-]{1,36}",
            success in any::<bool>(),
            payload in arb_json(),
        ) {
            let status = if success { ResponseStatus::Success } else { ResponseStatus::Error };
            let original = Response { id: CorrelationId::new(id), status, payload };

            let text = original.encode().expect("encode");
            let decoded = Response::decode(&text).expect("decode");
            prop_assert_eq!(&decoded, &original);

            let again = decoded.encode().expect("re-encode");
            prop_assert_eq!(text, again);
        }
    }
}
