//! Error Types for the Flight Desk

use mode_core::ModeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeskError>;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Flight not found: {0}")]
    FlightNotFound(String),

    #[error("Flight {0} is sold out")]
    SoldOut(String),

    #[error("No policy on {0}")]
    UnknownPolicy(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DeskError> for ModeError {
    fn from(err: DeskError) -> Self {
        match err {
            DeskError::Serialization(e) => Self::Json(e),
            other => Self::Other(other.to_string()),
        }
    }
}
