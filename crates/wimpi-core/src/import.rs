//! CSV transaction import
//!
//! Expected header: `transaction_at,type,amount,category,notes`.
//! `notes` is optional. Types accept `income`/`expense` as well as
//! `Pemasukan`/`Pengeluaran`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType};

/// Column positions resolved from the header row
struct Columns {
    transaction_at: usize,
    tx_type: usize,
    amount: usize,
    category: usize,
    notes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::InvalidData(format!("Missing CSV column: {}", name)))
        };

        Ok(Self {
            transaction_at: require("transaction_at")?,
            tx_type: require("type")?,
            amount: require("amount")?,
            category: require("category")?,
            notes: find("notes"),
        })
    }
}

/// Parse CSV data into transactions (ids left at 0 for the ledger to assign)
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = row + 2;

        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::InvalidData(format!("Line {}: missing {}", line, name)))
        };

        let transaction_at = parse_timestamp(field(columns.transaction_at, "transaction_at")?)
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", line, e)))?;
        let tx_type: TransactionType = field(columns.tx_type, "type")?
            .parse()
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", line, e)))?;
        let amount = parse_amount(field(columns.amount, "amount")?)
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", line, e)))?;
        if amount < 0.0 {
            return Err(Error::InvalidAmount(format!(
                "Line {}: amount must not be negative ({})",
                line, amount
            )));
        }
        let category = field(columns.category, "category")?.to_string();
        let notes = columns
            .notes
            .and_then(|idx| record.get(idx))
            .filter(|s| !s.is_empty())
            .map(String::from);

        transactions.push(Transaction {
            id: 0,
            transaction_at,
            tx_type,
            amount,
            category,
            notes,
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

/// Parse an RFC 3339 timestamp, a naive datetime, or a bare date (midnight UTC)
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }

    let formats = [
        "%Y-%m-%d", // 2026-10-19
        "%d/%m/%Y", // 19/10/2026
    ];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, tolerating an `Rp` prefix and `,`/space grouping
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches("Rp")
        .replace([',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_csv_basic() {
        let data = "\
transaction_at,type,amount,category,notes
2026-10-01,Pemasukan,5000000,Gaji,October salary
2026-10-02T12:30:00Z,expense,75000,Food,
2026-10-03 08:00:00,Pengeluaran,\"Rp 1,250,000\",Rent,
";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].tx_type, TransactionType::Income);
        assert_eq!(txs[0].amount, 5_000_000.0);
        assert_eq!(txs[0].notes.as_deref(), Some("October salary"));
        assert_eq!(
            txs[0].transaction_at,
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );

        assert_eq!(txs[1].tx_type, TransactionType::Expense);
        assert!(txs[1].notes.is_none());
        assert_eq!(
            txs[1].transaction_at,
            Utc.with_ymd_and_hms(2026, 10, 2, 12, 30, 0).unwrap()
        );

        assert_eq!(txs[2].amount, 1_250_000.0);
        assert_eq!(txs[2].category, "Rent");
    }

    #[test]
    fn test_columns_any_order_and_notes_optional() {
        let data = "category,amount,type,transaction_at\nFood,1000,expense,2026-01-05\n";
        let txs = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].category, "Food");
        assert!(txs[0].notes.is_none());
    }

    #[test]
    fn test_missing_column_rejected() {
        let data = "transaction_at,type,category\n2026-01-05,expense,Food\n";
        let err = parse_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_bad_rows_report_line() {
        let data = "transaction_at,type,amount,category\n2026-01-05,transfer,10,Food\n";
        let err = parse_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));

        let negative = "transaction_at,type,amount,category\n2026-01-05,expense,-10,Food\n";
        assert!(matches!(
            parse_csv(negative.as_bytes()),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2026-10-19").unwrap(), expected);
        assert_eq!(parse_timestamp("19/10/2026").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2026-10-19T07:00:00+07:00").unwrap(),
            expected
        );
        assert!(parse_timestamp("yesterday").is_err());
    }
}
