//! Error taxonomy for projection and valuation runs
//!
//! A run either returns a complete result or one of these errors. Market data
//! failures are not part of this enum: they are absorbed by the resolver and
//! only show up as diagnostics (see `market::MarketDataError`).

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Missing or malformed assumption, rejected before any computation
    #[error("invalid input for `{field}`: {reason}")]
    InputValidation { field: String, reason: String },

    /// A formula was evaluated outside its valid domain (e.g. WACC <= g)
    #[error("mathematical domain error on `{parameter}`: {detail}")]
    MathematicalDomain { parameter: String, detail: String },

    /// Non-finite intermediate result from extreme inputs
    #[error("non-finite value for `{quantity}` in year {year}")]
    ComputationOverflow { quantity: String, year: u32 },

    /// A year's prerequisite row was not available
    #[error("projection row for year {year} is missing")]
    MissingProjectionYear { year: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InputValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn domain(parameter: impl Into<String>, detail: impl Into<String>) -> Self {
        EngineError::MathematicalDomain {
            parameter: parameter.into(),
            detail: detail.into(),
        }
    }
}

/// Reject NaN and infinities instead of letting them flow into later steps.
/// Year 0 is used for values that are not tied to a projection year.
pub fn ensure_finite(quantity: &str, year: u32, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::ComputationOverflow {
            quantity: quantity.to_string(),
            year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite_passes_through() {
        assert_eq!(ensure_finite("revenue", 1, 42.0).unwrap(), 42.0);
    }

    #[test]
    fn test_ensure_finite_rejects_nan_and_inf() {
        let err = ensure_finite("ebitda", 3, f64::NAN).unwrap_err();
        match err {
            EngineError::ComputationOverflow { quantity, year } => {
                assert_eq!(quantity, "ebitda");
                assert_eq!(year, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ensure_finite("cash", 1, f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = EngineError::domain("terminal_growth", "WACC 2.00% <= g 3.00%");
        assert!(err.to_string().contains("terminal_growth"));

        let err = EngineError::invalid("tax_rate_pct", "must be within [0, 100]");
        assert!(err.to_string().contains("tax_rate_pct"));
    }
}
