use anyhow::Context;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::middleware::HttpError;
use crate::errors::{ErrorInput, RawCode};

/// Health check endpoint
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "json-error-responder",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct FailParams {
    pub message: Option<String>,
}

/// Fails with the code taken from the path: a number or a canonical name
pub async fn fail_with_code(
    Path(code): Path<String>,
    Query(params): Query<FailParams>,
) -> Result<StatusCode, HttpError> {
    let raw = match code.parse::<i64>() {
        Ok(n) => RawCode::Number(n),
        Err(_) => RawCode::Name(code),
    };

    let mut input = ErrorInput::new().with_code(raw);
    if let Some(message) = params.message {
        input = input.with_message(message);
    }

    Err(HttpError::new(input))
}

/// Fails with whatever error object the client posted
pub async fn fail_with_value(Json(value): Json<Value>) -> Result<StatusCode, HttpError> {
    Err(HttpError::new(ErrorInput::from_value(&value)))
}

/// Fails through `?` on an anyhow error, which carries no code
pub async fn fail_unhandled() -> Result<StatusCode, HttpError> {
    let budget: u32 = "unlimited"
        .parse()
        .context("Failed to parse retry budget")?;

    tracing::debug!(budget, "Parsed retry budget");
    Ok(StatusCode::NO_CONTENT)
}
