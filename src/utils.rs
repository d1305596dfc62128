//! Utility functions for identifier generation and input parsing

use crate::error::StockError;
use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique record id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String, StockError> {
    let hrp = bech32::Hrp::parse(hrp).map_err(|err| StockError::Id(err.to_string()))?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .map_err(|err| StockError::Id(err.to_string()))?;
    Ok(encode)
}

/// Parse a quantity typed into a form field. Empty and non-numeric input both
/// fail validation before any persistence call is made.
pub fn parse_quantity(input: &str) -> Result<u32, StockError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(StockError::Validation("Quantity must not be empty".into()));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| StockError::Validation(format!("'{trimmed}' is not a valid quantity")))
}
