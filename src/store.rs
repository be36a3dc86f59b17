//! Key-value persistence of the last-used calculator inputs.
//!
//! The calculation functions never read or write a store; the front end
//! loads [`LastInputs`] before prompting and saves them after a successful
//! calculation.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LoanError, LoanResult};
use crate::period::{DisplayScale, Frequency};
use crate::LoanTerms;

pub const KEY_LOAN_AMOUNT: &str = "loanAmount";
pub const KEY_INTEREST_RATE: &str = "interestRate";
pub const KEY_YEARS: &str = "years";
pub const KEY_PERIOD: &str = "period";
pub const KEY_CHART_SCALE: &str = "chartScale";

/// String keys to string values, as a browser's local storage offers.
pub trait KeyValueStore {
    /// The value stored under `key`, if any.
    fn get(&self, key: &str) -> LoanResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> LoanResult<()>;
}

/// Non-persistent store, for tests and one-off sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> LoanResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> LoanResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. So is a file that is not a JSON
    /// object of strings; it is replaced on the next `set`.
    pub fn open(path: impl Into<PathBuf>) -> LoanResult<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| LoanError::Store(format!("cannot read {}: {e}", path.display())))?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "discarding unreadable input store");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = values.len(), "opened input store");
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> LoanResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> LoanResult<()> {
        self.values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| LoanError::Store(format!("cannot create {}: {e}", parent.display())))?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)
            .map_err(|e| LoanError::Store(format!("cannot write {}: {e}", self.path.display())))
    }
}

/// Scalar inputs remembered between sessions. Absent or unreadable values
/// are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastInputs {
    /// Stored under `loanAmount`.
    pub principal: Option<Decimal>,
    /// Stored under `interestRate`.
    pub annual_rate_percent: Option<Decimal>,
    /// Stored under `years`.
    pub term_years: Option<u32>,
    /// Stored under `period`.
    pub frequency: Option<Frequency>,
    /// Stored under `chartScale`.
    pub scale: Option<DisplayScale>,
}

impl LastInputs {
    /// Inputs taken from a complete set of terms.
    pub fn from_terms(terms: &LoanTerms, scale: Option<DisplayScale>) -> Self {
        Self {
            principal: Some(terms.principal),
            annual_rate_percent: Some(terms.annual_rate_percent),
            term_years: Some(terms.term_years),
            frequency: Some(terms.frequency),
            scale,
        }
    }

    /// Keeps every present value and fills the gaps from `fallback`.
    #[must_use]
    pub fn or(self, fallback: LastInputs) -> Self {
        Self {
            principal: self.principal.or(fallback.principal),
            annual_rate_percent: self.annual_rate_percent.or(fallback.annual_rate_percent),
            term_years: self.term_years.or(fallback.term_years),
            frequency: self.frequency.or(fallback.frequency),
            scale: self.scale.or(fallback.scale),
        }
    }

    /// Complete terms, taking each absent value from `defaults`.
    pub fn resolve(&self, defaults: &LoanTerms) -> LoanTerms {
        LoanTerms {
            principal: self.principal.unwrap_or(defaults.principal),
            annual_rate_percent: self.annual_rate_percent.unwrap_or(defaults.annual_rate_percent),
            term_years: self.term_years.unwrap_or(defaults.term_years),
            frequency: self.frequency.unwrap_or(defaults.frequency),
        }
    }

    /// The display scale, or `default` when absent.
    pub fn resolve_scale(&self, default: DisplayScale) -> DisplayScale {
        self.scale.unwrap_or(default)
    }

    /// Reads every known key from `store`.
    pub fn load(store: &impl KeyValueStore) -> LoanResult<Self> {
        Ok(Self {
            principal: read_value(store, KEY_LOAN_AMOUNT)?,
            annual_rate_percent: read_value(store, KEY_INTEREST_RATE)?,
            term_years: read_value(store, KEY_YEARS)?,
            frequency: read_value(store, KEY_PERIOD)?,
            scale: read_value(store, KEY_CHART_SCALE)?,
        })
    }

    /// Writes every present value; absent values leave the store untouched.
    pub fn save(&self, store: &mut impl KeyValueStore) -> LoanResult<()> {
        if let Some(principal) = self.principal {
            store.set(KEY_LOAN_AMOUNT, &principal.to_string())?;
        }
        if let Some(rate) = self.annual_rate_percent {
            store.set(KEY_INTEREST_RATE, &rate.to_string())?;
        }
        if let Some(years) = self.term_years {
            store.set(KEY_YEARS, &years.to_string())?;
        }
        if let Some(frequency) = self.frequency {
            store.set(KEY_PERIOD, frequency.as_str())?;
        }
        if let Some(scale) = self.scale {
            store.set(KEY_CHART_SCALE, scale.as_str())?;
        }
        Ok(())
    }

    /// True when no value is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Runs `calculate` and records `terms` and `scale` as last used only if it
/// succeeds. A failed calculation leaves the store untouched.
pub fn remember_on_success<S, T, F>(
    store: &mut S,
    terms: &LoanTerms,
    scale: Option<DisplayScale>,
    calculate: F,
) -> LoanResult<T>
where
    S: KeyValueStore,
    F: FnOnce(&LoanTerms) -> LoanResult<T>,
{
    let output = calculate(terms)?;
    LastInputs::from_terms(terms, scale).save(store)?;
    debug!(?scale, "remembered inputs");
    Ok(output)
}

fn read_value<T: FromStr>(store: &impl KeyValueStore, key: &str) -> LoanResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match raw.parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unreadable stored input");
            Ok(None)
        }
    }
}
