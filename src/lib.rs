//! JSON error responses for HTTP services.
//!
//! An [`ErrorResponder`] is configured once with [`ResponseOptions`] and then
//! turns any [`ErrorInput`] into a `{"error": {...}}` body with the matching
//! HTTP status.

pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod responder;

pub use api::{handle_errors, HttpError};
pub use errors::{ErrorCode, ErrorInput, ErrorResponse, KeyStyle, RawCode};
pub use responder::{
    BufferedResponse, ErrorResponder, LogMode, ResponseOptions, ResponseSink, SinkError,
    WriterSink,
};
