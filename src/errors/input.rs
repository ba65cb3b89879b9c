use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt::Write as _;

use super::codes::ErrorCode;

/// The identifier an error carries: a numeric status or a canonical name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCode {
    Number(i64),
    Name(String),
}

impl From<u16> for RawCode {
    fn from(value: u16) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<i64> for RawCode {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawCode {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for RawCode {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<ErrorCode> for RawCode {
    fn from(value: ErrorCode) -> Self {
        Self::from(value.status_code())
    }
}

/// An error as handed to the responder.
///
/// Every field is optional; whatever is missing falls back to the defaults of
/// the code table when the response is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInput {
    pub code: Option<RawCode>,
    pub message: Option<String>,
    pub stack: Option<String>,
}

impl ErrorInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, code: impl Into<RawCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a Rust error: its message, its source chain and a backtrace.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut stack = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = write!(stack, "\n    caused by: {cause}");
            source = cause.source();
        }
        let _ = write!(stack, "\n{}", Backtrace::force_capture());

        Self {
            code: None,
            message: Some(err.to_string()),
            stack: Some(stack),
        }
    }

    /// Read an untyped error value.
    ///
    /// `code` may be an integral number or a string, `message` and `stack` must be
    /// strings. Fields that are missing or of the wrong type are left unset,
    /// and any other attribute is ignored.
    pub fn from_value(value: &Value) -> Self {
        let code = match value.get("code") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| integral_f64(n.as_f64()?))
                .map(RawCode::Number),
            Some(Value::String(s)) => Some(RawCode::Name(s.clone())),
            _ => None,
        };
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            code,
            message: text("message"),
            stack: text("stack"),
        }
    }

    /// Message to present, treating an empty string as absent
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message,
            _ => fallback,
        }
    }
}

/// `400.0` is the same code as `400`; fractional or out-of-range floats are not
fn integral_f64(value: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&value);
    (in_range && value.fract() == 0.0).then_some(value as i64)
}

impl From<anyhow::Error> for ErrorInput {
    fn from(err: anyhow::Error) -> Self {
        Self {
            code: None,
            message: Some(err.to_string()),
            stack: Some(format!("{err:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: std::io::Error,
    }

    #[test]
    fn test_builder() {
        let input = ErrorInput::new()
            .with_code(400u16)
            .with_message("Missing fields: [name]");
        assert_eq!(input.code, Some(RawCode::Number(400)));
        assert_eq!(input.message.as_deref(), Some("Missing fields: [name]"));
        assert!(input.stack.is_none());
    }

    #[test]
    fn test_from_error_captures_chain() {
        let err = Outer {
            inner: std::io::Error::new(std::io::ErrorKind::NotFound, "file missing"),
        };
        let input = ErrorInput::from_error(&err);
        assert_eq!(input.message.as_deref(), Some("outer failure"));
        let stack = input.stack.unwrap();
        assert!(stack.starts_with("outer failure"));
        assert!(stack.contains("caused by: file missing"));
        assert!(input.code.is_none());
    }

    #[test]
    fn test_from_anyhow() {
        let err = anyhow::anyhow!("disk full").context("saving upload");
        let input = ErrorInput::from(err);
        assert_eq!(input.message.as_deref(), Some("saving upload"));
        assert!(input.stack.unwrap().contains("disk full"));
    }

    #[test]
    fn test_from_value_reads_known_fields() {
        let input = ErrorInput::from_value(&json!({
            "code": 404,
            "message": "no such user",
            "stack": "at users.rs:10",
            "user_id": 7
        }));
        assert_eq!(input.code, Some(RawCode::Number(404)));
        assert_eq!(input.message.as_deref(), Some("no such user"));
        assert_eq!(input.stack.as_deref(), Some("at users.rs:10"));
    }

    #[test]
    fn test_from_value_ignores_wrong_types() {
        let input = ErrorInput::from_value(&json!({
            "code": [400],
            "message": 12,
            "stack": {"frames": []}
        }));
        assert_eq!(input, ErrorInput::new());

        assert_eq!(ErrorInput::from_value(&json!("boom")), ErrorInput::new());
        assert_eq!(ErrorInput::from_value(&Value::Null), ErrorInput::new());
    }

    #[test]
    fn test_from_value_string_code() {
        let input = ErrorInput::from_value(&json!({ "code": "BAD_REQUEST" }));
        assert_eq!(input.code, Some(RawCode::Name("BAD_REQUEST".into())));
    }

    #[test]
    fn test_from_value_integral_float_code() {
        let input = ErrorInput::from_value(&json!({ "code": 400.0 }));
        assert_eq!(input.code, Some(RawCode::Number(400)));
        assert_eq!(ErrorCode::resolve(input.code.as_ref()), ErrorCode::BadRequest);

        assert!(ErrorInput::from_value(&json!({ "code": 400.5 })).code.is_none());
        assert!(ErrorInput::from_value(&json!({ "code": 1e300 })).code.is_none());
    }

    #[test]
    fn test_raw_code_untagged() {
        let number: RawCode = serde_json::from_value(json!(418)).unwrap();
        let name: RawCode = serde_json::from_value(json!("GONE")).unwrap();
        assert_eq!(number, RawCode::Number(418));
        assert_eq!(name, RawCode::Name("GONE".into()));
    }

    #[test]
    fn test_message_or_treats_empty_as_absent() {
        let empty = ErrorInput::new().with_message("");
        assert_eq!(empty.message_or("Bad Request"), "Bad Request");
        assert_eq!(ErrorInput::new().message_or("Gone"), "Gone");
        let set = ErrorInput::new().with_message("custom");
        assert_eq!(set.message_or("Gone"), "custom");
    }
}
