//! Error codes, error input and the structured response shape

pub mod codes;
pub mod input;
pub mod response;

pub use codes::ErrorCode;
pub use input::{ErrorInput, RawCode};
pub use response::{ErrorDetail, ErrorResponse, KeyStyle};
