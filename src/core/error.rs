//! Error taxonomy for the conversion pipeline.

use thiserror::Error;

/// Errors surfaced by rate fetching and conversion.
///
/// Manual conversions show all of these to the user; the live auto-convert
/// path only logs them.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing user input (amount or currency code).
    #[error("{0}")]
    Validation(String),

    /// Transport failure or non-success HTTP status from the rate API.
    #[error("network error: {0}")]
    Network(String),

    /// The rate API answered, but the payload is unusable.
    #[error("exchange rate data error: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Error::Network(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }
}
