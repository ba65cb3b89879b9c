mod error_handler;
mod logging;

pub use error_handler::{handle_errors, HttpError};
pub use logging::logging_middleware;
