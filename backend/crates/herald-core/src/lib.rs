pub mod error;
pub mod models;

#[cfg(test)]
mod tests;

pub use error::{CoreError, CoreResult};
pub use models::channel::{Channel, DEFAULT_NAMESPACE};
pub use models::event_kind::EventKind;
pub use models::log_record::LogRecord;

pub use error_location::ErrorLocation;
