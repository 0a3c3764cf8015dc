//! CSV ingest for one side of a reconciliation.
//!
//! Fixed header contract: `id,date,description,amount,type`. Dates are
//! `YYYY-MM-DD`; amounts are non-negative decimals with at most two
//! fractional digits; type is `debit` or `credit`.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::ReconError;
use crate::model::{parse_amount_cents, AmountParseKind, Polarity, Side, Transaction};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse one side's CSV data into transactions. Every record must parse;
/// the first bad field aborts the load with the offending record id.
pub fn load_csv_transactions(side: Side, csv_data: &str) -> Result<Vec<Transaction>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ReconError::Io(format!("{side} CSV: missing column '{name}'"))
        })
    };

    let id_idx = idx("id")?;
    let date_idx = idx("date")?;
    let description_idx = idx("description")?;
    let amount_idx = idx("amount")?;
    let type_idx = idx("type")?;

    let mut transactions = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let id = field(id_idx).to_string();

        let date_str = field(date_idx);
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|_| {
            ReconError::DateParse {
                side,
                id: id.clone(),
                value: date_str.into(),
            }
        })?;

        let amount_str = field(amount_idx);
        let amount_cents = parse_amount_cents(amount_str).map_err(|kind| match kind {
            AmountParseKind::Negative => ReconError::NegativeAmount {
                side,
                id: id.clone(),
            },
            AmountParseKind::Malformed => ReconError::AmountParse {
                side,
                id: id.clone(),
                value: amount_str.into(),
            },
        })?;

        let type_str = field(type_idx);
        let polarity = Polarity::from_str(type_str).map_err(|_| ReconError::PolarityParse {
            side,
            id: id.clone(),
            value: type_str.into(),
        })?;

        transactions.push(Transaction {
            id,
            date,
            description: field(description_idx).to_string(),
            amount_cents,
            polarity,
        });
    }

    Ok(transactions)
}
