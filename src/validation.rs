//! Input bounds that gate payment and schedule calculation.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, LoanResult};
use crate::export::format_with_commas;

pub const MIN_LOAN_AMOUNT: Decimal = dec!(50_000);
pub const MAX_LOAN_AMOUNT: Decimal = dec!(950_000);
pub const MIN_INTEREST: Decimal = dec!(5);
pub const MAX_INTEREST: Decimal = dec!(10);
pub const MIN_TERM_YEARS: u32 = 5;
pub const MAX_TERM_YEARS: u32 = 30;

/// Inclusive bounds for principal, annual rate (percent) and term (years).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationBounds {
    /// Smallest loan amount accepted.
    pub min_loan_amount: Decimal,
    /// Largest loan amount accepted.
    pub max_loan_amount: Decimal,
    /// Lowest annual rate accepted, in percent.
    pub min_interest: Decimal,
    /// Highest annual rate accepted, in percent.
    pub max_interest: Decimal,
    /// Shortest term accepted, in years.
    pub min_term_years: u32,
    /// Longest term accepted, in years.
    pub max_term_years: u32,
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            min_loan_amount: MIN_LOAN_AMOUNT,
            max_loan_amount: MAX_LOAN_AMOUNT,
            min_interest: MIN_INTEREST,
            max_interest: MAX_INTEREST,
            min_term_years: MIN_TERM_YEARS,
            max_term_years: MAX_TERM_YEARS,
        }
    }
}

/// A single input that fell outside its bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum BoundViolation {
    /// The loan amount is outside `min..=max`.
    Principal { value: Decimal, min: Decimal, max: Decimal },
    /// The annual rate is outside `min..=max`.
    InterestRate { value: Decimal, min: Decimal, max: Decimal },
    /// The term is outside `min..=max`.
    TermYears { value: u32, min: u32, max: u32 },
}

impl fmt::Display for BoundViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundViolation::Principal { min, max, .. } => write!(
                f,
                "Enter an amount between ${} and ${}",
                format_with_commas(*min),
                format_with_commas(*max)
            ),
            BoundViolation::InterestRate { min, max, .. } => {
                write!(f, "Enter an interest rate between {min}% and {max}%")
            }
            BoundViolation::TermYears { min, max, .. } => {
                write!(f, "Enter a term between {min} and {max} years")
            }
        }
    }
}

impl ValidationBounds {
    /// True only when principal, rate and term are all within bounds.
    #[must_use]
    pub fn validate(&self, principal: Decimal, annual_rate_percent: Decimal, term_years: u32) -> bool {
        self.check_inputs(principal, annual_rate_percent, term_years).is_empty()
    }

    /// Lists every violated bound, in principal, rate, term order.
    #[must_use]
    pub fn check_inputs(
        &self,
        principal: Decimal,
        annual_rate_percent: Decimal,
        term_years: u32,
    ) -> Vec<BoundViolation> {
        let mut violations = Vec::new();

        if principal < self.min_loan_amount || principal > self.max_loan_amount {
            violations.push(BoundViolation::Principal {
                value: principal,
                min: self.min_loan_amount,
                max: self.max_loan_amount,
            });
        }
        if annual_rate_percent < self.min_interest || annual_rate_percent > self.max_interest {
            violations.push(BoundViolation::InterestRate {
                value: annual_rate_percent,
                min: self.min_interest,
                max: self.max_interest,
            });
        }
        if term_years < self.min_term_years || term_years > self.max_term_years {
            violations.push(BoundViolation::TermYears {
                value: term_years,
                min: self.min_term_years,
                max: self.max_term_years,
            });
        }

        violations
    }

    /// Snaps a loan amount to the nearest bound, as the input form does once
    /// editing of the amount finishes.
    #[must_use]
    pub fn clamp_principal(&self, principal: Decimal) -> Decimal {
        principal.clamp(self.min_loan_amount, self.max_loan_amount)
    }

    /// Checks that the bounds themselves are usable.
    pub fn ensure_consistent(&self) -> LoanResult<()> {
        let mut errors = Vec::new();

        if self.min_loan_amount > self.max_loan_amount {
            errors.push(format!(
                "min_loan_amount {} exceeds max_loan_amount {}",
                self.min_loan_amount, self.max_loan_amount
            ));
        }
        if self.min_loan_amount <= Decimal::ZERO {
            errors.push(format!("min_loan_amount {} must be positive", self.min_loan_amount));
        }
        if self.min_interest > self.max_interest {
            errors.push(format!(
                "min_interest {} exceeds max_interest {}",
                self.min_interest, self.max_interest
            ));
        }
        if self.min_interest < Decimal::ZERO || self.max_interest >= dec!(100) {
            errors.push(format!(
                "interest bounds {}..={} must lie within [0, 100)",
                self.min_interest, self.max_interest
            ));
        }
        if self.min_term_years == 0 {
            errors.push("min_term_years must be at least 1".to_string());
        }
        if self.min_term_years > self.max_term_years {
            errors.push(format!(
                "min_term_years {} exceeds max_term_years {}",
                self.min_term_years, self.max_term_years
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoanError::Config(errors.join("; ")))
        }
    }
}

/// Validates against the canonical bounds (50,000–950,000; 5–10%; 5–30 years).
#[must_use]
pub fn validate(principal: Decimal, annual_rate_percent: Decimal, term_years: u32) -> bool {
    ValidationBounds::default().validate(principal, annual_rate_percent, term_years)
}
