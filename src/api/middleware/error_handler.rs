use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::errors::{ErrorCode, ErrorInput};
use crate::responder::ErrorResponder;

/// Error returned by a handler, rendered later by [`handle_errors`].
///
/// On its own it becomes a bare 500 that carries the [`ErrorInput`] in the
/// response extensions; the middleware swaps that for the JSON body.
#[derive(Debug, Clone)]
pub struct HttpError(pub ErrorInput);

impl HttpError {
    pub fn new(input: ErrorInput) -> Self {
        Self(input)
    }

    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self(ErrorInput::new().with_code(code).with_message(message))
    }

    pub fn input(&self) -> &ErrorInput {
        &self.0
    }
}

impl<E> From<E> for HttpError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(ErrorInput::from(err.into()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self.0);
        response
    }
}

/// Error-dispatch middleware: runs the rest of the stack and renders any
/// pending [`HttpError`] with the configured responder.
pub async fn handle_errors(
    State(responder): State<Arc<ErrorResponder>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorInput>() {
        Some(err) => responder.respond(&err),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_carries_input() {
        let response = HttpError::with_code(ErrorCode::NotFound, "no card").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let input = response.extensions().get::<ErrorInput>().unwrap();
        assert_eq!(input.message.as_deref(), Some("no card"));
        assert_eq!(ErrorCode::resolve(input.code.as_ref()), ErrorCode::NotFound);
    }

    #[test]
    fn test_from_anyhow_has_no_code() {
        let err: HttpError = anyhow::anyhow!("pool exhausted").into();
        assert!(err.input().code.is_none());
        assert_eq!(err.input().message.as_deref(), Some("pool exhausted"));
    }

    #[test]
    fn test_from_std_error() {
        fn parse(value: &str) -> Result<u32, HttpError> {
            Ok(value.parse::<u32>()?)
        }

        let err = parse("abc").unwrap_err();
        assert_eq!(
            err.input().message.as_deref(),
            Some("invalid digit found in string")
        );
    }
}
