//! Spreadsheet export of a schedule and display formatting of amounts.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{LoanError, LoanResult};
use crate::period::DisplayScale;
use crate::schedule::ScheduleEntry;
use crate::store::{
    LastInputs, KEY_CHART_SCALE, KEY_INTEREST_RATE, KEY_LOAN_AMOUNT, KEY_PERIOD, KEY_YEARS,
};

pub const EXPORT_EXTENSION: &str = "csv";

/// Column layout of an exported row: `period,Principal,Interest`.
#[derive(Debug, Serialize)]
struct ExportRow {
    period: u32,
    #[serde(rename = "Principal")]
    principal: Decimal,
    #[serde(rename = "Interest")]
    interest: Decimal,
}

impl From<&ScheduleEntry> for ExportRow {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            period: entry.index,
            principal: entry.principal_portion,
            interest: entry.interest_portion,
        }
    }
}

/// `<ISO-timestamp> <scale> Loan Calculator.<ext>`, timestamp to the second.
pub fn export_filename(timestamp: DateTime<Utc>, scale: DisplayScale, extension: &str) -> String {
    format!(
        "{} {} Loan Calculator.{}",
        timestamp.format("%Y-%m-%dT%H:%M:%S"),
        scale,
        extension
    )
}

/// Writes one CSV row per entry, with a header row, to `writer`.
pub fn write_schedule_csv<W: Write>(writer: W, entries: &[ScheduleEntry]) -> LoanResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    if entries.is_empty() {
        wtr.write_record(["period", "Principal", "Interest"])?;
    }
    for entry in entries {
        wtr.serialize(ExportRow::from(entry))?;
    }

    wtr.flush().map_err(|e| LoanError::Export(e.to_string()))
}

/// Writes the remembered inputs as `key,value` rows, keyed as in the store.
/// Absent values are left out; the header is always written.
pub fn write_last_inputs_csv<W: Write>(writer: W, inputs: &LastInputs) -> LoanResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["key", "value"])?;

    let rows = [
        (KEY_LOAN_AMOUNT, inputs.principal.map(|v| v.to_string())),
        (KEY_INTEREST_RATE, inputs.annual_rate_percent.map(|v| v.to_string())),
        (KEY_YEARS, inputs.term_years.map(|v| v.to_string())),
        (KEY_PERIOD, inputs.frequency.map(|v| v.as_str().to_string())),
        (KEY_CHART_SCALE, inputs.scale.map(|v| v.as_str().to_string())),
    ];
    for (key, value) in rows {
        if let Some(value) = value {
            wtr.write_record([key, value.as_str()])?;
        }
    }

    wtr.flush().map_err(|e| LoanError::Export(e.to_string()))
}

/// Creates the export file in `dir` and returns its path.
pub fn export_schedule(
    dir: &Path,
    scale: DisplayScale,
    entries: &[ScheduleEntry],
    timestamp: DateTime<Utc>,
) -> LoanResult<PathBuf> {
    let path = dir.join(export_filename(timestamp, scale, EXPORT_EXTENSION));
    let file = File::create(&path)
        .map_err(|e| LoanError::Export(format!("cannot create {}: {e}", path.display())))?;

    write_schedule_csv(file, entries)?;
    info!(path = %path.display(), rows = entries.len(), "exported schedule");
    Ok(path)
}

/// Groups the integer digits in threes, e.g. `950000` -> `950,000`.
pub fn format_with_commas(value: Decimal) -> String {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_entries() -> Vec<ScheduleEntry> {
        vec![
            ScheduleEntry {
                index: 1,
                principal_portion: dec!(735.23),
                interest_portion: dec!(208.33),
            },
            ScheduleEntry {
                index: 2,
                principal_portion: dec!(738.29),
                interest_portion: dec!(205.27),
            },
        ]
    }

    #[test]
    fn test_export_filename() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            export_filename(ts, DisplayScale::Month, "csv"),
            "2024-03-09T14:05:07 month Loan Calculator.csv"
        );
    }

    #[test]
    fn test_write_schedule_csv() {
        let mut buf = Vec::new();
        write_schedule_csv(&mut buf, &sample_entries()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "period,Principal,Interest\n1,735.23,208.33\n2,738.29,205.27\n"
        );
    }

    #[test]
    fn test_write_empty_schedule_keeps_header() {
        let mut buf = Vec::new();
        write_schedule_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "period,Principal,Interest\n");
    }

    #[test]
    fn test_write_last_inputs_csv() {
        let inputs = LastInputs {
            principal: Some(dec!(125000)),
            annual_rate_percent: Some(dec!(6.25)),
            term_years: None,
            frequency: Some(crate::period::Frequency::Weekly),
            scale: Some(DisplayScale::Fortnight),
        };
        let mut buf = Vec::new();
        write_last_inputs_csv(&mut buf, &inputs).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "key,value\nloanAmount,125000\ninterestRate,6.25\nperiod,weekly\nchartScale,fortnight\n"
        );
    }

    #[test]
    fn test_write_empty_last_inputs_csv() {
        let mut buf = Vec::new();
        write_last_inputs_csv(&mut buf, &LastInputs::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "key,value\n");
    }

    #[test]
    fn test_export_schedule_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let ts = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let path = export_schedule(dir.path(), DisplayScale::Year, &sample_entries(), ts).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "2025-01-31T23:59:59 year Loan Calculator.csv"
        );
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(dec!(950000)), "950,000");
        assert_eq!(format_with_commas(dec!(50000)), "50,000");
        assert_eq!(format_with_commas(dec!(999)), "999");
        assert_eq!(format_with_commas(dec!(1234567.89)), "1,234,567.89");
        assert_eq!(format_with_commas(dec!(-1000)), "-1,000");
    }
}
