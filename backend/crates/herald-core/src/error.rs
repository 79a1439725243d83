use crate::ErrorLocation;

use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown event kind: {value} {location}")]
    UnknownEventKind {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid namespace '{value}': {message} {location}")]
    InvalidNamespace {
        value: String,
        message: String,
        location: ErrorLocation,
    },
}

pub type CoreResult<T> = StdResult<T, CoreError>;
