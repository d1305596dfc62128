//! Error taxonomy and the boolean+message shape handed to the presentation layer
use crate::request::RequestStatus;

#[derive(thiserror::Error, Debug)]
pub enum StockError {
    #[error("{0}")]
    Validation(String),
    #[error("Product {0} not found in inventory")]
    ProductNotFound(String),
    #[error("Request {0} not found")]
    RequestNotFound(String),
    #[error("Insufficient stock. Available: {available}, Requested: {requested}")]
    InsufficientStock { available: u32, requested: u32 },
    #[error("Request cannot move from {from} to {to}")]
    IllegalTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("failed to encode identifier: {0}")]
    Id(String),
    #[error("failed to encode or decode stored row: {0}")]
    Codec(String),
    #[error("storage failure: {0}")]
    Backend(#[from] sled::Error),
}

impl From<minicbor::encode::Error<std::convert::Infallible>> for StockError {
    fn from(err: minicbor::encode::Error<std::convert::Infallible>) -> Self {
        StockError::Codec(err.to_string())
    }
}

impl From<minicbor::decode::Error> for StockError {
    fn from(err: minicbor::decode::Error) -> Self {
        StockError::Codec(err.to_string())
    }
}

/// What every ledger and lifecycle operation returns across the service
/// boundary. The structured [`StockError`] collapses to a message here;
/// callers branch on `success` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl From<Result<String, StockError>> for Outcome {
    fn from(result: Result<String, StockError>) -> Self {
        match result {
            Ok(message) => Self {
                success: true,
                message,
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
            },
        }
    }
}
