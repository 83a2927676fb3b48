//! Pure conversion math over a rate table.

use crate::core::error::{Error, Result};
use crate::core::rates::RateTable;

/// Outcome of a single conversion. Values are unrounded; display rounding
/// happens at the presentation edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub result: f64,
    pub rate: f64,
}

/// Validates a user-entered amount: must parse to a finite number > 0.
pub fn parse_amount(input: &str) -> Result<f64> {
    let amount: f64 = input
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("'{}' is not a number", input.trim())))?;
    validate_amount(amount)
}

pub fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation("enter an amount greater than zero"));
    }
    Ok(amount)
}

/// Normalizes a currency code: upcased 3-letter ASCII.
pub fn parse_currency(input: &str) -> Result<String> {
    let code = input.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::validation(format!(
            "'{}' is not a currency code (expected 3 letters, e.g. USD)",
            input.trim()
        )));
    }
    Ok(code)
}

/// Converts `amount` of the table's base currency into `to`.
///
/// The table must be keyed with `from` as base; callers refresh the store
/// before calling when it is not.
pub fn convert(amount: f64, from: &str, to: &str, table: &RateTable) -> Result<Conversion> {
    debug_assert_eq!(table.base, from);
    let rate = table
        .rate(to)
        .ok_or_else(|| Error::data(format!("no rate for {from} to {to}")))?;

    Ok(Conversion {
        result: amount * rate,
        rate,
    })
}
