use rust_decimal::{Decimal, MathematicalOps};
use tracing::debug;

use crate::error::{LoanError, LoanResult};
use crate::period::Frequency;

/// Calculates the fixed payment due every period at `frequency`.
///
/// Uses the annuity formula: PMT = P * [r(1 + r)^n] / [(1 + r)^n – 1], where
/// `r` is the annual rate divided by the periods per year and `n` the number
/// of repayments over the term. A zero rate degenerates to `P / n`.
///
/// The result is not rounded.
///
/// # Arguments
///
/// * `principal` - The loan amount.
/// * `annual_rate_percent` - The annual interest rate as a percentage (e.g., 5 for 5%).
/// * `term_years` - The loan term in whole years.
/// * `frequency` - The repayment cadence.
///
/// # Errors
///
/// Returns `NonPositivePeriodCount` if `term_years` is zero, and
/// `ArithmeticOverflow` if the compounding factor exceeds decimal range.
pub fn compute_payment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_years: u32,
    frequency: Frequency,
) -> LoanResult<Decimal> {
    let total_periods = frequency.total_periods(term_years)?;
    let periodic_rate = frequency.periodic_rate(annual_rate_percent);

    let payment = fixed_payment(principal, periodic_rate, total_periods)?;
    debug!(%principal, %annual_rate_percent, term_years, %frequency, %payment, "computed periodic payment");
    Ok(payment)
}

/// `total_periods` must be positive.
pub(crate) fn fixed_payment(
    principal: Decimal,
    periodic_rate: Decimal,
    total_periods: u32,
) -> LoanResult<Decimal> {
    let periods = Decimal::from(total_periods);
    if periodic_rate.is_zero() {
        return Ok(principal / periods);
    }

    let overflow = || LoanError::ArithmeticOverflow {
        context: format!("compounding {periodic_rate} over {total_periods} periods"),
    };

    let growth = (Decimal::ONE + periodic_rate)
        .checked_powu(total_periods.into())
        .ok_or_else(overflow)?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        // Rate too small to register at decimal precision.
        return Ok(principal / periods);
    }

    principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::round2;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_payment_reference_value() {
        let payment = compute_payment(dec!(50000), dec!(5), 5, Frequency::Monthly).unwrap();
        assert_eq!(round2(payment), dec!(943.56));
    }

    #[test]
    fn test_matches_price_table_reference() {
        // 12,000 over 12 months at 1% per period
        let payment = fixed_payment(dec!(12000), dec!(0.01), 12).unwrap();
        assert_eq!(round2(payment), dec!(1066.19));
    }

    #[rstest]
    #[case(Frequency::Weekly)]
    #[case(Frequency::Fortnightly)]
    #[case(Frequency::Monthly)]
    fn test_zero_rate_is_straight_line(#[case] frequency: Frequency) {
        let payment = compute_payment(dec!(60000), dec!(0), 5, frequency).unwrap();
        let expected = dec!(60000) / Decimal::from(5 * frequency.periods_per_year());
        assert!((payment - expected).abs() < dec!(0.000000001));
    }

    #[rstest]
    #[case(Frequency::Weekly)]
    #[case(Frequency::Fortnightly)]
    #[case(Frequency::Monthly)]
    fn test_total_paid_exceeds_principal(#[case] frequency: Frequency) {
        let principal = dec!(950000);
        let payment = compute_payment(principal, dec!(10), 30, frequency).unwrap();
        let total = payment * Decimal::from(frequency.total_periods(30).unwrap());
        assert!(payment > Decimal::ZERO);
        assert!(total > principal);
    }

    #[test]
    fn test_more_frequent_repayments_are_smaller() {
        let weekly = compute_payment(dec!(100000), dec!(6), 20, Frequency::Weekly).unwrap();
        let fortnightly = compute_payment(dec!(100000), dec!(6), 20, Frequency::Fortnightly).unwrap();
        let monthly = compute_payment(dec!(100000), dec!(6), 20, Frequency::Monthly).unwrap();
        assert!(weekly < fortnightly && fortnightly < monthly);
    }

    #[test]
    fn test_zero_term_error() {
        let result = compute_payment(dec!(100000), dec!(5), 0, Frequency::Weekly);
        assert!(matches!(result, Err(LoanError::NonPositivePeriodCount { .. })));
    }

    #[test]
    fn test_overflow_is_reported() {
        let result = compute_payment(dec!(100000), dec!(99), 100_000, Frequency::Weekly);
        assert!(matches!(result, Err(LoanError::ArithmeticOverflow { .. })));
    }
}
