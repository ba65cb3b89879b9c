use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("response body has already been written")]
    AlreadyWritten,

    #[error("failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the responder writes its output: a status, then exactly one body.
pub trait ResponseSink {
    /// Whether a body has already gone out; the responder leaves such sinks untouched
    fn is_written(&self) -> bool;

    fn set_status(&mut self, status: u16);

    fn write_json(&mut self, body: &[u8]) -> Result<(), SinkError>;
}

/// In-memory response, convertible into an axum response
#[derive(Debug, Clone, Default)]
pub struct BufferedResponse {
    status: Option<u16>,
    body: Option<Vec<u8>>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status set by the responder, 200 if none was set
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(self.body())
    }
}

impl ResponseSink for BufferedResponse {
    fn is_written(&self) -> bool {
        self.body.is_some()
    }

    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn write_json(&mut self, body: &[u8]) -> Result<(), SinkError> {
        if self.body.is_some() {
            return Err(SinkError::AlreadyWritten);
        }
        self.body = Some(body.to_vec());
        Ok(())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body.unwrap_or_default(),
        )
            .into_response()
    }
}

/// Streams the body into any writer (a socket, a log file, stderr)
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    status: Option<u16>,
    written: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            status: None,
            written: false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResponseSink for WriterSink<W> {
    fn is_written(&self) -> bool {
        self.written
    }

    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn write_json(&mut self, body: &[u8]) -> Result<(), SinkError> {
        if self.written {
            return Err(SinkError::AlreadyWritten);
        }
        self.written = true;
        self.writer.write_all(body)?;
        self.writer.flush()?;
        Ok(())
    }
}
