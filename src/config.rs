//! Calculator configuration.
//!
//! Loaded from a TOML file, with environment variable overrides for the
//! store location and log level. Every field has a default, so an empty
//! file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoanError, LoanResult};
use crate::period::DisplayScale;
use crate::store::LastInputs;
use crate::validation::ValidationBounds;
use crate::LoanTerms;

pub const ENV_STORE_PATH: &str = "LOAN_CALC_STORE_PATH";
pub const ENV_LOG_LEVEL: &str = "LOAN_CALC_LOG_LEVEL";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    #[serde(default)]
    pub bounds: ValidationBounds,

    /// Inputs used when nothing has been persisted yet.
    #[serde(default)]
    pub defaults: LoanTerms,

    #[serde(default)]
    pub default_scale: DisplayScale,

    /// JSON file holding the last-used inputs
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".loan-calc/last_inputs.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            bounds: ValidationBounds::default(),
            defaults: LoanTerms::default(),
            default_scale: DisplayScale::default(),
            store_path: default_store_path(),
            log_level: default_log_level(),
        }
    }
}

impl CalculatorConfig {
    pub fn from_toml_str(content: &str) -> LoanResult<Self> {
        let config: CalculatorConfig =
            toml::from_str(content).map_err(|e| LoanError::Config(format!("Failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> LoanResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoanError::Config(format!("Failed to read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Missing file means defaults; an unreadable or invalid file is still an error.
    pub fn load_or_default(path: &Path) -> LoanResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_env_override(mut self) -> Self {
        if let Ok(store_path) = std::env::var(ENV_STORE_PATH) {
            self.store_path = PathBuf::from(store_path);
        }
        if let Ok(log_level) = std::env::var(ENV_LOG_LEVEL) {
            self.log_level = log_level;
        }
        self
    }

    /// Resolves the inputs for one calculation.
    ///
    /// Each value comes from `requested` if present, then from `last`, then
    /// from the configured defaults. With `clamp` the principal is snapped
    /// into the configured bounds.
    pub fn resolve_terms(&self, requested: &LastInputs, last: &LastInputs, clamp: bool) -> LoanTerms {
        let terms = requested.clone().or(last.clone()).resolve(&self.defaults);
        if clamp {
            terms.with_clamped_principal(&self.bounds)
        } else {
            terms
        }
    }

    /// The display scale from `requested`, then `last`, then the default.
    pub fn resolve_scale(&self, requested: Option<DisplayScale>, last: &LastInputs) -> DisplayScale {
        requested.or(last.scale).unwrap_or(self.default_scale)
    }

    /// Like [`resolve_terms`](Self::resolve_terms), but refuses terms outside the bounds.
    ///
    /// # Errors
    ///
    /// Returns `InputOutOfRange` listing every violated bound.
    pub fn checked_terms(
        &self,
        requested: &LastInputs,
        last: &LastInputs,
        clamp: bool,
    ) -> LoanResult<LoanTerms> {
        let terms = self.resolve_terms(requested, last, clamp);
        let violations = terms.check_inputs(&self.bounds);
        if violations.is_empty() {
            Ok(terms)
        } else {
            Err(LoanError::InputOutOfRange(violations))
        }
    }

    /// Checks bounds, log level and default term.
    pub fn validate(&self) -> LoanResult<()> {
        self.bounds.ensure_consistent()?;

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(LoanError::Config(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, VALID_LOG_LEVELS
            )));
        }
        if self.defaults.term_years == 0 {
            return Err(LoanError::Config("defaults.term_years must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Frequency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_file_is_default() {
        let config = CalculatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, CalculatorConfig::default());
        assert_eq!(config.bounds.max_loan_amount, dec!(950000));
        assert_eq!(config.defaults.principal, dec!(50000));
        assert_eq!(config.default_scale, DisplayScale::Year);
    }

    #[test]
    fn test_partial_overrides() {
        let toml_str = r#"
            log_level = "debug"
            default_scale = "month"

            [bounds]
            max_loan_amount = 95000
            max_interest = 7

            [defaults]
            principal = 60000
            annual_rate_percent = 6
            term_years = 10
            frequency = "weekly"
        "#;
        let config = CalculatorConfig::from_toml_str(toml_str).unwrap();

        assert_eq!(config.bounds.max_loan_amount, dec!(95000));
        assert_eq!(config.bounds.max_interest, dec!(7));
        assert_eq!(config.bounds.min_loan_amount, dec!(50000));
        assert_eq!(config.defaults.frequency, Frequency::Weekly);
        assert_eq!(config.defaults.term_years, 10);
        assert_eq!(config.default_scale, DisplayScale::Month);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let toml_str = r#"
            [bounds]
            min_loan_amount = 100000
            max_loan_amount = 90000
        "#;
        assert!(matches!(
            CalculatorConfig::from_toml_str(toml_str),
            Err(LoanError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(CalculatorConfig::from_toml_str("log_level = \"loud\"").is_err());
    }

    #[test]
    fn test_omitted_inputs_fall_back_to_last_then_defaults() {
        let config = CalculatorConfig::default();
        let requested = LastInputs {
            principal: Some(dec!(120000)),
            ..LastInputs::default()
        };
        let last = LastInputs {
            principal: Some(dec!(90000)),
            term_years: Some(25),
            scale: Some(DisplayScale::Fortnight),
            ..LastInputs::default()
        };

        let terms = config.resolve_terms(&requested, &last, false);
        assert_eq!(terms.principal, dec!(120000));
        assert_eq!(terms.term_years, 25);
        assert_eq!(terms.annual_rate_percent, dec!(5));
        assert_eq!(terms.frequency, Frequency::Monthly);

        assert_eq!(config.resolve_scale(Some(DisplayScale::Week), &last), DisplayScale::Week);
        assert_eq!(config.resolve_scale(None, &last), DisplayScale::Fortnight);
        assert_eq!(config.resolve_scale(None, &LastInputs::default()), DisplayScale::Year);
    }

    #[test]
    fn test_clamp_snaps_principal_before_checking() {
        let config = CalculatorConfig::default();
        let requested = LastInputs {
            principal: Some(dec!(2_000_000)),
            ..LastInputs::default()
        };

        let unclamped = config.checked_terms(&requested, &LastInputs::default(), false);
        assert!(matches!(
            unclamped,
            Err(LoanError::InputOutOfRange(ref violations)) if violations.len() == 1
        ));

        let clamped = config.checked_terms(&requested, &LastInputs::default(), true).unwrap();
        assert_eq!(clamped.principal, dec!(950000));
    }

    #[test]
    fn test_checked_terms_reports_every_violation() {
        let config = CalculatorConfig::default();
        let requested = LastInputs {
            annual_rate_percent: Some(dec!(12)),
            term_years: Some(40),
            ..LastInputs::default()
        };

        let err = config
            .checked_terms(&requested, &LastInputs::default(), true)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid inputs: Enter an interest rate between 5% and 10%; Enter a term between 5 and 30 years"
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CalculatorConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CalculatorConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loan-calc.toml");
        std::fs::write(&path, "store_path = \"inputs.json\"\n").unwrap();

        let config = CalculatorConfig::load(&path).unwrap();
        assert_eq!(config.store_path, PathBuf::from("inputs.json"));
    }
}
