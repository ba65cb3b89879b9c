pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::{handle_errors, logging_middleware, HttpError};
