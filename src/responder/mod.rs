//! Turns an error into the final JSON error response

pub mod sink;

use axum::response::{IntoResponse, Response};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::errors::{ErrorCode, ErrorInput, ErrorResponse, KeyStyle};
use crate::metrics::ERROR_RESPONSES_TOTAL;

pub use sink::{BufferedResponse, ResponseSink, SinkError, WriterSink};

/// Callback that sees the original error and may rewrite the outgoing response
pub type LogHook = Arc<dyn Fn(&ErrorInput, &mut ErrorResponse) + Send + Sync>;

/// What to do with an error before it is written
#[derive(Clone, Default)]
pub enum LogMode {
    #[default]
    Disabled,
    /// Emit the error as a tracing event
    DefaultLogger,
    /// Hand the error and the response to a user callback
    Custom(LogHook),
}

impl From<bool> for LogMode {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::DefaultLogger
        } else {
            Self::Disabled
        }
    }
}

impl fmt::Debug for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::DefaultLogger => f.write_str("DefaultLogger"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseOptions {
    pub log: LogMode,
    pub debug: bool,
    pub camel_case: bool,
}

impl ResponseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(mut self, log: impl Into<LogMode>) -> Self {
        self.log = log.into();
        self
    }

    pub fn log_with<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ErrorInput, &mut ErrorResponse) + Send + Sync + 'static,
    {
        self.log = LogMode::Custom(Arc::new(hook));
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn camel_case(mut self, camel_case: bool) -> Self {
        self.camel_case = camel_case;
        self
    }

    fn key_style(&self) -> KeyStyle {
        if self.camel_case {
            KeyStyle::CamelCase
        } else {
            KeyStyle::SnakeCase
        }
    }
}

/// Error handler configured once and reused for every failed request.
///
/// Holds no per-call state; each invocation derives the response from the
/// error and the options alone.
#[derive(Debug, Clone, Default)]
pub struct ErrorResponder {
    options: ResponseOptions,
}

impl ErrorResponder {
    pub fn new(options: ResponseOptions) -> Self {
        debug!(
            log = ?options.log,
            debug = options.debug,
            camel_case = options.camel_case,
            "Configured error responder"
        );
        Self { options }
    }

    pub fn options(&self) -> &ResponseOptions {
        &self.options
    }

    /// Resolve the code and assemble the response, running the log step.
    ///
    /// The returned code is the one the status line must use, regardless of
    /// what a custom hook did to the body.
    pub fn build(&self, err: &ErrorInput) -> (ErrorCode, ErrorResponse) {
        let code = ErrorCode::resolve(err.code.as_ref());

        let mut response = ErrorResponse::new(code, err.message_or(code.reason()))
            .with_key_style(self.options.key_style());

        if self.options.debug {
            let stack = match err.stack.as_deref() {
                Some(stack) if !stack.is_empty() => stack.to_string(),
                _ => format!("{}: {}", code.name(), response.error.message),
            };
            response = response.with_stack(stack);
        }

        match &self.options.log {
            LogMode::Disabled => {}
            LogMode::Custom(hook) => hook(err, &mut response),
            LogMode::DefaultLogger => log_error(code, err, &response),
        }

        (code, response)
    }

    /// Write the response for `err` into `sink`. Never fails: a sink that
    /// already holds a body, or refuses one, is reported and left as it was.
    pub fn handle<S: ResponseSink + ?Sized>(&self, err: &ErrorInput, sink: &mut S) {
        if sink.is_written() {
            warn!("Error response already written, skipping");
            return;
        }

        let (code, response) = self.build(err);
        let status = code.status_code();
        let status_label = status.to_string();

        ERROR_RESPONSES_TOTAL
            .with_label_values(&[code.name(), status_label.as_str()])
            .inc();

        sink.set_status(status);
        if let Err(e) = sink.write_json(&response.to_json_bytes()) {
            warn!(status, code = %code, "Failed to write error response: {}", e);
        }
    }

    /// Render `err` as an axum response
    pub fn respond(&self, err: &ErrorInput) -> Response {
        let mut buffered = BufferedResponse::new();
        self.handle(err, &mut buffered);
        buffered.into_response()
    }
}

fn log_error(code: ErrorCode, err: &ErrorInput, response: &ErrorResponse) {
    let status = code.status_code();
    let error_message = response.error.message.as_str();

    match err.stack.as_deref() {
        Some(stack) => error!(status, code = %code, error_message, stack, "Request failed"),
        None => error!(status, code = %code, error_message, "Request failed"),
    }
}
