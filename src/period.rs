//! Repayment frequencies, display scales and the period/rate arithmetic
//! shared by the payment and schedule calculations.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, LoanResult};

/// Cadence of the actual repayments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    #[default]
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Weekly, Frequency::Fortnightly, Frequency::Monthly];

    #[must_use]
    pub const fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Weekly => 52,
            Frequency::Fortnightly => 26,
            Frequency::Monthly => 12,
        }
    }

    /// Number of repayments over the whole term.
    ///
    /// # Errors
    ///
    /// Returns `NonPositivePeriodCount` when `term_years` is zero and
    /// `ArithmeticOverflow` when the count does not fit in a `u32`.
    pub fn total_periods(self, term_years: u32) -> LoanResult<u32> {
        let periods_per_year = self.periods_per_year();
        if term_years == 0 {
            return Err(LoanError::NonPositivePeriodCount {
                term_years,
                periods_per_year,
            });
        }
        term_years
            .checked_mul(periods_per_year)
            .ok_or_else(|| LoanError::ArithmeticOverflow {
                context: format!("total periods for {term_years} years {self}"),
            })
    }

    /// Converts an annual percentage (e.g. `5` for 5%) into the simple
    /// per-period rate as a decimal fraction.
    #[must_use]
    pub fn periodic_rate(self, annual_rate_percent: Decimal) -> Decimal {
        annual_rate_percent / dec!(100) / Decimal::from(self.periods_per_year())
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Fortnightly => "fortnightly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" => Ok(Frequency::Weekly),
            "fortnightly" | "fortnight" => Ok(Frequency::Fortnightly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            other => Err(format!(
                "unknown frequency '{other}' (expected weekly, fortnightly or monthly)"
            )),
        }
    }
}

/// Cadence at which a schedule is laid out for charts and exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayScale {
    Week,
    Fortnight,
    Month,
    #[default]
    Year,
}

impl DisplayScale {
    pub const ALL: [DisplayScale; 4] = [
        DisplayScale::Week,
        DisplayScale::Fortnight,
        DisplayScale::Month,
        DisplayScale::Year,
    ];

    #[must_use]
    pub const fn periods_per_year(self) -> u32 {
        match self {
            DisplayScale::Week => 52,
            DisplayScale::Fortnight => 26,
            DisplayScale::Month => 12,
            DisplayScale::Year => 1,
        }
    }

    /// Number of display periods covering `term_years`.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` when the count does not fit in a `u32`.
    pub fn iteration_count(self, term_years: u32) -> LoanResult<u32> {
        term_years
            .checked_mul(self.periods_per_year())
            .ok_or_else(|| LoanError::ArithmeticOverflow {
                context: format!("display periods for {term_years} years by {self}"),
            })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DisplayScale::Week => "week",
            DisplayScale::Fortnight => "fortnight",
            DisplayScale::Month => "month",
            DisplayScale::Year => "year",
        }
    }

    /// True when this scale lays out exactly one entry per repayment at `frequency`.
    #[must_use]
    pub const fn matches(self, frequency: Frequency) -> bool {
        self.periods_per_year() == frequency.periods_per_year()
    }
}

impl fmt::Display for DisplayScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "weekly" => Ok(DisplayScale::Week),
            "fortnight" | "fortnightly" => Ok(DisplayScale::Fortnight),
            "month" | "monthly" => Ok(DisplayScale::Month),
            "year" | "yearly" => Ok(DisplayScale::Year),
            other => Err(format!(
                "unknown display scale '{other}' (expected week, fortnight, month or year)"
            )),
        }
    }
}

/// Rounds a currency amount to cents, halves away from zero.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Frequency::Weekly, 52)]
    #[case(Frequency::Fortnightly, 26)]
    #[case(Frequency::Monthly, 12)]
    fn test_frequency_periods_per_year(#[case] frequency: Frequency, #[case] expected: u32) {
        assert_eq!(frequency.periods_per_year(), expected);
        assert_eq!(frequency.total_periods(5).unwrap(), expected * 5);
    }

    #[rstest]
    #[case(DisplayScale::Year, 5)]
    #[case(DisplayScale::Month, 60)]
    #[case(DisplayScale::Fortnight, 130)]
    #[case(DisplayScale::Week, 260)]
    fn test_display_scale_iteration_count(#[case] scale: DisplayScale, #[case] expected: u32) {
        assert_eq!(scale.iteration_count(5).unwrap(), expected);
    }

    #[test]
    fn test_zero_term_is_rejected() {
        let err = Frequency::Monthly.total_periods(0).unwrap_err();
        assert!(matches!(
            err,
            LoanError::NonPositivePeriodCount {
                term_years: 0,
                periods_per_year: 12
            }
        ));
    }

    #[test]
    fn test_period_count_overflow() {
        assert!(Frequency::Weekly.total_periods(u32::MAX).is_err());
        assert!(DisplayScale::Week.iteration_count(u32::MAX).is_err());
    }

    #[test]
    fn test_periodic_rate() {
        assert_eq!(Frequency::Weekly.periodic_rate(dec!(5.2)), dec!(0.001));
        assert_eq!(Frequency::Fortnightly.periodic_rate(dec!(0)), dec!(0));
        let monthly = Frequency::Monthly.periodic_rate(dec!(5));
        assert!(monthly > dec!(0.0041666) && monthly < dec!(0.0041667));
    }

    #[test]
    fn test_round2_halves_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(943.5641)), dec!(943.56));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("fortnight".parse::<DisplayScale>().unwrap(), DisplayScale::Fortnight);
        assert!("daily".parse::<Frequency>().is_err());
        assert_eq!(DisplayScale::Year.to_string(), "year");
        assert_eq!(Frequency::Monthly.to_string(), "monthly");
    }

    #[test]
    fn test_scale_matches_frequency() {
        assert!(DisplayScale::Month.matches(Frequency::Monthly));
        assert!(!DisplayScale::Week.matches(Frequency::Monthly));
        assert!(!DisplayScale::Year.matches(Frequency::Weekly));
    }
}
