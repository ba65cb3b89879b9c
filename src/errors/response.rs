use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use super::codes::ErrorCode;

/// Naming convention for the numeric status key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStyle {
    /// `status_code`
    #[default]
    SnakeCase,
    /// `statusCode`
    CamelCase,
}

impl KeyStyle {
    pub fn status_key(&self) -> &'static str {
        match self {
            Self::SnakeCase => "status_code",
            Self::CamelCase => "statusCode",
        }
    }
}

/// Structured error response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error details
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    /// Canonical code name, e.g. `BAD_REQUEST`
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Numeric HTTP status
    pub status_code: u16,
    /// Trace text, only present in debug mode
    pub stack: Option<String>,
    /// Fields attached by a custom logging hook
    pub extra: Map<String, Value>,
    key_style: KeyStyle,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.name().to_string(),
                message: message.into(),
                status_code: code.status_code(),
                stack: None,
                extra: Map::new(),
                key_style: KeyStyle::default(),
            },
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.error.stack = Some(stack.into());
        self
    }

    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.error.key_style = key_style;
        self
    }

    pub fn key_style(&self) -> KeyStyle {
        self.error.key_style
    }

    /// Serialize to JSON, degrading to a fixed 500 body if serialization fails
    pub fn to_json_bytes(&self) -> Vec<u8> {
        match serde_json::to_vec(self) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to serialize error response: {}", e);
                fallback_body(self.key_style())
            }
        }
    }
}

impl Serialize for ErrorDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let status_key = self.key_style.status_key();
        // Extras never shadow the fixed fields
        let extra = self
            .extra
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "code" | "message" | "stack") && *key != status_key);

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("code", &self.code)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry(status_key, &self.status_code)?;
        if let Some(stack) = &self.stack {
            map.serialize_entry("stack", stack)?;
        }
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn fallback_body(key_style: KeyStyle) -> Vec<u8> {
    let code = ErrorCode::InternalServerError;
    format!(
        r#"{{"error":{{"code":"{}","message":"{}","{}":{}}}}}"#,
        code.name(),
        code.reason(),
        key_style.status_key(),
        code.status_code()
    )
    .into_bytes()
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            self.to_json_bytes(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_response_serialization() {
        let err = ErrorResponse::new(ErrorCode::BadRequest, "Test error");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            json!({
                "error": {
                    "code": "BAD_REQUEST",
                    "message": "Test error",
                    "status_code": 400
                }
            })
        );
    }

    #[test]
    fn test_key_order_is_stable() {
        let err = ErrorResponse::new(ErrorCode::NotFound, "gone").with_stack("trace");
        let text = String::from_utf8(err.to_json_bytes()).unwrap();
        assert_eq!(
            text,
            r#"{"error":{"code":"NOT_FOUND","message":"gone","status_code":404,"stack":"trace"}}"#
        );
    }

    #[test]
    fn test_camel_case_key() {
        let err = ErrorResponse::new(ErrorCode::Conflict, "dup").with_key_style(KeyStyle::CamelCase);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"]["statusCode"], 409);
        assert!(json["error"].get("status_code").is_none());
    }

    #[test]
    fn test_extra_fields_follow_known_fields() {
        let mut err = ErrorResponse::new(ErrorCode::Forbidden, "nope");
        err.error.extra.insert("request_id".into(), json!("abc"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"]["request_id"], "abc");
        assert_eq!(json["error"]["code"], "FORBIDDEN");
    }

    #[test]
    fn test_extra_fields_cannot_shadow_known_fields() {
        let mut err = ErrorResponse::new(ErrorCode::Forbidden, "nope");
        err.error.extra.insert("code".into(), json!(403));
        err.error.extra.insert("status_code".into(), json!("x"));
        let text = String::from_utf8(err.to_json_bytes()).unwrap();
        assert_eq!(
            text,
            r#"{"error":{"code":"FORBIDDEN","message":"nope","status_code":403}}"#
        );
    }

    #[test]
    fn test_fallback_body_is_valid_json() {
        for style in [KeyStyle::SnakeCase, KeyStyle::CamelCase] {
            let json: Value = serde_json::from_slice(&fallback_body(style)).unwrap();
            assert_eq!(json["error"]["code"], "INTERNAL_SERVER_ERROR");
            assert_eq!(json["error"][style.status_key()], 500);
        }
    }

    // ========== HTTP STATUS CODE TESTS ==========

    #[test]
    fn test_into_response_status_bad_request() {
        let response = ErrorResponse::new(ErrorCode::BadRequest, "Bad query").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_into_response_status_internal_error() {
        let response =
            ErrorResponse::new(ErrorCode::InternalServerError, "Something went wrong").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status_service_unavailable() {
        let response = ErrorResponse::new(ErrorCode::ServiceUnavailable, "down").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
