//! `loan_schedule` is a Rust library for fixed-payment loan amortization.
//!
//! Given a principal, an annual interest rate, a term in years and a
//! repayment frequency it provides:
//! - **Validation**: whether the inputs fall inside the calculator's bounds
//!   (50,000–950,000 principal, 5–10% interest, 5–30 years by default).
//! - **Periodic payment**: the fixed amount due every weekly, fortnightly or
//!   monthly repayment, from the standard annuity formula.
//! - **Schedule**: the split of each payment into principal and interest,
//!   laid out at a display scale (week, fortnight, month or year).
//!
//! ## Usage
//!
//! ```rust
//! use loan_schedule::{generate_schedule, validate, compute_payment, DisplayScale, Frequency};
//! use rust_decimal_macros::dec;
//!
//! let (principal, rate, years) = (dec!(50_000), dec!(5), 5);
//!
//! if validate(principal, rate, years) {
//!     let payment = compute_payment(principal, rate, years, Frequency::Monthly).unwrap();
//!     println!("Monthly payment: {:.2}", payment);
//!
//!     let schedule =
//!         generate_schedule(principal, rate, years, Frequency::Monthly, DisplayScale::Year).unwrap();
//!     for entry in &schedule {
//!         println!("{}: principal {} interest {}", entry.index, entry.principal_portion, entry.interest_portion);
//!     }
//! }
//! ```
//!
//! Validation is the caller's job: `compute_payment` and `generate_schedule`
//! do not re-check the bounds. They only refuse inputs that would make the
//! arithmetic meaningless, such as a zero-year term.

pub mod config;
pub mod error;
pub mod export;
pub mod payment;
pub mod period;
pub mod schedule;
pub mod store;
pub mod validation;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub use error::{LoanError, LoanResult};
pub use payment::compute_payment;
pub use period::{round2, DisplayScale, Frequency};
pub use schedule::{
    generate_schedule, generate_schedule_with_mode, ScheduleEntry, ScheduleMode, ScheduleSummary,
};
pub use validation::{validate, BoundViolation, ValidationBounds};

/// Input parameters of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanTerms {
    /// The amount borrowed, in major currency units.
    pub principal: Decimal,
    /// The annual interest rate as a percentage (e.g., 5 for 5%).
    pub annual_rate_percent: Decimal,
    /// The loan term in whole years.
    pub term_years: u32,
    /// How often repayments are made.
    pub frequency: Frequency,
}

impl Default for LoanTerms {
    fn default() -> Self {
        Self {
            principal: dec!(50_000),
            annual_rate_percent: dec!(5),
            term_years: 5,
            frequency: Frequency::Monthly,
        }
    }
}

impl LoanTerms {
    /// True when principal, rate and term are all within `bounds`.
    pub fn validate(&self, bounds: &ValidationBounds) -> bool {
        bounds.validate(self.principal, self.annual_rate_percent, self.term_years)
    }

    /// Lists every bound these terms violate.
    pub fn check_inputs(&self, bounds: &ValidationBounds) -> Vec<BoundViolation> {
        bounds.check_inputs(self.principal, self.annual_rate_percent, self.term_years)
    }

    /// Returns a copy with the principal snapped into `bounds`.
    pub fn with_clamped_principal(&self, bounds: &ValidationBounds) -> Self {
        Self {
            principal: bounds.clamp_principal(self.principal),
            ..*self
        }
    }

    /// The fixed payment per repayment period, unrounded.
    pub fn payment(&self) -> LoanResult<Decimal> {
        compute_payment(self.principal, self.annual_rate_percent, self.term_years, self.frequency)
    }

    /// The schedule laid out at `scale`.
    pub fn schedule(&self, scale: DisplayScale, mode: ScheduleMode) -> LoanResult<Vec<ScheduleEntry>> {
        generate_schedule_with_mode(
            self.principal,
            self.annual_rate_percent,
            self.term_years,
            self.frequency,
            scale,
            mode,
        )
    }

    /// Calculates the payment and schedule together.
    ///
    /// # Errors
    ///
    /// Returns an error if the term is zero or the arithmetic overflows.
    pub fn summary(&self, scale: DisplayScale, mode: ScheduleMode) -> LoanResult<ScheduleSummary> {
        let payment = self.payment()?;
        let total_periods = self.frequency.total_periods(self.term_years)?;
        let entries = self.schedule(scale, mode)?;
        ScheduleSummary::new(self.principal, payment, total_periods, entries)
    }
}
