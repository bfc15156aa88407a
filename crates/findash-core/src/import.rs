//! CSV import of financial records
//!
//! Expected headers: `Department`, `Date`, `Revenue`, `Expenses`, `Profit`.
//! Column order does not matter and extra columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Record;

/// Row as it appears in the file, before validation
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Department")]
    department: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Revenue")]
    revenue: String,
    #[serde(rename = "Expenses")]
    expenses: String,
    #[serde(rename = "Profit")]
    profit: String,
}

/// Load records from a CSV file on disk
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    parse_records(file)
}

/// Parse records from any CSV reader, keeping file order
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();

    for (index, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let raw = result?;
        // Header is line 1
        let line = index + 2;

        let department = raw
            .department
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::Import(format!("Missing department on line {}", line)))?;

        let date_str = raw
            .date
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::Import(format!("Missing date on line {}", line)))?;
        let date = parse_date(&date_str)?;

        records.push(Record {
            department,
            date,
            revenue: parse_amount(&raw.revenue)?,
            expenses: parse_amount(&raw.expenses)?,
            profit: parse_amount(&raw.profit)?,
        });
    }

    debug!("Parsed {} financial records", records.len());
    Ok(records)
}

/// Parse a date string in one of the supported formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    // %y must come before %Y: chrono's %Y also takes a two-digit year
    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    for fmt in formats {
        match NaiveDate::parse_from_str(s, fmt) {
            // Short years are only accepted through %y
            Ok(date) if fmt.contains("%Y") && date.year() < 100 => continue,
            Ok(date) => return Ok(date),
            Err(_) => continue,
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date("01/15/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("not a date").is_err());
    }

    #[test]
    fn test_parse_date_all_formats() {
        let jan_15 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("01/15/24").unwrap(), jan_15);
        assert_eq!(parse_date("01-15-2024").unwrap(), jan_15);
        assert_eq!(parse_date("15/01/2024").unwrap(), jan_15);
        assert_eq!(parse_date(" 2024-01-15 ").unwrap(), jan_15);
    }

    #[test]
    fn test_parse_date_rejects_short_four_digit_year() {
        // Day-first with a two-digit year has no matching format
        assert!(parse_date("15/01/24").is_err());
        assert!(parse_date("24-01-15").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("-123.45").unwrap(), -123.45);
        assert_eq!(parse_amount("(100.00)").unwrap(), -100.00);
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_amount_rejects_non_finite() {
        for input in ["inf", "-inf", "infinity", "NaN", "1e400"] {
            let err = parse_amount(input).unwrap_err();
            assert!(
                matches!(err, Error::Import(ref msg) if msg.contains("Unable to parse amount")),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_parse_records_rejects_infinite_revenue() {
        let csv = "Date,Department,Revenue,Expenses,Profit
2024-01-01,Sales,inf,1,1";

        assert!(matches!(
            parse_records(csv.as_bytes()),
            Err(Error::Import(_))
        ));
    }

    #[test]
    fn test_parse_records_keeps_file_order() {
        let csv = "Date,Department,Revenue,Expenses,Profit
2024-02-01,Sales,100,60,40
2024-01-01,Ops,30,20,10";

        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].department, "Sales");
        assert_eq!(records[0].profit, 40.0);
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_records_reordered_and_extra_columns() {
        let csv = "Profit,Notes,Revenue,Department,Expenses,Date
\"1,500.00\",q1 close,\"$2,000\", Marketing ,500,01/31/2024";

        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].department, "Marketing");
        assert_eq!(records[0].revenue, 2000.0);
        assert_eq!(records[0].profit, 1500.0);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_parse_records_missing_department_value() {
        let csv = "Date,Department,Revenue,Expenses,Profit
2024-01-01,,100,60,40";

        let err = parse_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_parse_records_missing_date_column() {
        let csv = "Department,Revenue,Expenses,Profit
Sales,100,60,40";

        assert!(matches!(
            parse_records(csv.as_bytes()),
            Err(Error::Import(_))
        ));
    }

    #[test]
    fn test_parse_records_missing_revenue_column() {
        let csv = "Date,Department,Expenses,Profit
2024-01-01,Sales,60,40";

        assert!(matches!(parse_records(csv.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn test_parse_records_bad_amount() {
        let csv = "Date,Department,Revenue,Expenses,Profit
2024-01-01,Sales,lots,60,40";

        assert!(parse_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_load_records_missing_file() {
        let result = load_records(Path::new("/nonexistent/finance_data.csv"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
