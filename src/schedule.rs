//! Per-period principal/interest decomposition of a fixed-payment loan.
//!
//! Two layouts are available:
//! - [`ScheduleMode::Compatible`] runs one iteration per display period. The
//!   payment and the per-period rate are always sized for the repayment
//!   frequency, so when the display scale differs from the frequency the
//!   balance trajectory does not describe a real repayment plan.
//! - [`ScheduleMode::FrequencyAligned`] amortizes one repayment at a time and
//!   groups repayments into display periods.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LoanError, LoanResult};
use crate::payment::compute_payment;
use crate::period::{round2, DisplayScale, Frequency};

/// One row of the schedule. Portions are rounded to cents independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based, chronological.
    pub index: u32,
    /// Part of the payment that reduces the balance.
    pub principal_portion: Decimal,
    /// Part of the payment that covers interest on the balance.
    pub interest_portion: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// One iteration per display period, payment sized for the repayment frequency.
    #[default]
    Compatible,
    /// One iteration per repayment, grouped into display periods.
    FrequencyAligned,
}

/// Headline figures for a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// The fixed payment per repayment period, rounded to cents.
    pub payment: Decimal,
    /// Payment times the number of repayments over the whole term.
    pub total_paid: Decimal,
    /// Total paid less the principal.
    pub total_interest: Decimal,
    /// Sum of the principal portions of the emitted entries.
    pub displayed_principal: Decimal,
    /// Sum of the interest portions of the emitted entries.
    pub displayed_interest: Decimal,
    pub entries: Vec<ScheduleEntry>,
}

impl ScheduleSummary {
    /// Builds the summary for a loan of `principal` repaid by `total_periods`
    /// payments of `payment`.
    ///
    /// The totals describe the loan, whatever the display scale of `entries`.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the total paid exceeds decimal range.
    pub fn new(
        principal: Decimal,
        payment: Decimal,
        total_periods: u32,
        entries: Vec<ScheduleEntry>,
    ) -> LoanResult<Self> {
        let total_paid = payment
            .checked_mul(Decimal::from(total_periods))
            .ok_or_else(|| LoanError::ArithmeticOverflow {
                context: format!("total paid over {total_periods} periods"),
            })?;
        let (displayed_principal, displayed_interest) = entries.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(principal, interest), entry| {
                (principal + entry.principal_portion, interest + entry.interest_portion)
            },
        );

        Ok(Self {
            payment: round2(payment),
            total_paid: round2(total_paid),
            total_interest: round2(total_paid - principal),
            displayed_principal,
            displayed_interest,
            entries,
        })
    }
}

/// Generates the schedule in [`ScheduleMode::Compatible`] layout.
///
/// The number of entries is `term_years` times the periods per year of
/// `scale`; the loop never stops early, even once the balance is paid off.
///
/// # Errors
///
/// Propagates `compute_payment` failures and period-count overflow.
pub fn generate_schedule(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
    frequency: Frequency,
    scale: DisplayScale,
) -> LoanResult<Vec<ScheduleEntry>> {
    generate_schedule_with_mode(
        principal,
        annual_rate_percent,
        term_years,
        frequency,
        scale,
        ScheduleMode::Compatible,
    )
}

/// Generates the schedule in the requested layout.
///
/// # Errors
///
/// Propagates `compute_payment` failures and period-count overflow.
pub fn generate_schedule_with_mode(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
    frequency: Frequency,
    scale: DisplayScale,
    mode: ScheduleMode,
) -> LoanResult<Vec<ScheduleEntry>> {
    let payment = compute_payment(principal, annual_rate_percent, term_years, frequency)?;
    let period_rate = frequency.periodic_rate(annual_rate_percent);

    let entries = match mode {
        ScheduleMode::Compatible => {
            let iterations = scale.iteration_count(term_years)?;
            if !scale.matches(frequency) {
                warn!(
                    %frequency,
                    %scale,
                    iterations,
                    "display scale differs from repayment frequency; balances will not track a real repayment plan"
                );
            }
            amortize_by_display_period(principal, payment, period_rate, iterations)
        }
        ScheduleMode::FrequencyAligned => {
            let repayments = frequency.total_periods(term_years)?;
            amortize_by_repayment(principal, payment, period_rate, repayments, frequency, scale)
        }
    };

    debug!(?mode, %frequency, %scale, entries = entries.len(), "generated schedule");
    Ok(entries)
}

fn amortize_by_display_period(
    principal: Decimal,
    payment: Decimal,
    period_rate: Decimal,
    iterations: u32,
) -> Vec<ScheduleEntry> {
    let mut remaining_balance = principal;
    let mut entries = Vec::with_capacity(iterations as usize);

    for index in 1..=iterations {
        let period_interest = remaining_balance * period_rate;
        let period_principal = payment - period_interest;
        remaining_balance -= period_principal;

        entries.push(ScheduleEntry {
            index,
            principal_portion: round2(period_principal),
            interest_portion: round2(period_interest),
        });
    }

    entries
}

fn amortize_by_repayment(
    principal: Decimal,
    payment: Decimal,
    period_rate: Decimal,
    repayments: u32,
    frequency: Frequency,
    scale: DisplayScale,
) -> Vec<ScheduleEntry> {
    let repayments_per_year = u64::from(frequency.periods_per_year());
    // A scale finer than the repayments would leave empty buckets, so each
    // repayment gets its own entry instead.
    let buckets_per_year = u64::from(scale.periods_per_year()).min(repayments_per_year);

    let mut remaining_balance = principal;
    let mut entries = Vec::new();
    let mut bucket = 1u32;
    let mut bucket_principal = Decimal::ZERO;
    let mut bucket_interest = Decimal::ZERO;

    for repayment in 1..=u64::from(repayments) {
        let period_interest = remaining_balance * period_rate;
        let period_principal = payment - period_interest;
        remaining_balance -= period_principal;

        // ceil(repayment * buckets_per_year / repayments_per_year), bounded by the bucket count
        let index = (repayment * buckets_per_year).div_ceil(repayments_per_year) as u32;
        if index != bucket {
            entries.push(ScheduleEntry {
                index: bucket,
                principal_portion: round2(bucket_principal),
                interest_portion: round2(bucket_interest),
            });
            bucket = index;
            bucket_principal = Decimal::ZERO;
            bucket_interest = Decimal::ZERO;
        }
        bucket_principal += period_principal;
        bucket_interest += period_interest;
    }

    if repayments > 0 {
        entries.push(ScheduleEntry {
            index: bucket,
            principal_portion: round2(bucket_principal),
            interest_portion: round2(bucket_interest),
        });
    }

    entries
}
