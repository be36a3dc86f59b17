use thiserror::Error;

use crate::validation::BoundViolation;

#[derive(Debug, Error)]
pub enum LoanError {
    /// The term yields no repayments, so no payment can be derived.
    #[error("Non-positive period count: {term_years} years at {periods_per_year} periods per year")]
    NonPositivePeriodCount {
        term_years: u32,
        periods_per_year: u32,
    },

    /// A decimal result exceeded the representable range.
    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    /// Inputs rejected by the bounds before any calculation ran.
    #[error("Invalid inputs: {}", join_violations(.0))]
    InputOutOfRange(Vec<BoundViolation>),

    /// Unreadable or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input store could not be read or written.
    #[error("Store error: {0}")]
    Store(String),

    /// The schedule could not be written out.
    #[error("Export error: {0}")]
    Export(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn join_violations(violations: &[BoundViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for LoanError {
    fn from(e: csv::Error) -> Self {
        LoanError::Export(e.to_string())
    }
}

pub type LoanResult<T> = Result<T, LoanError>;
