use std::fmt;

use crate::model::Side;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad tolerance, threshold out of range, etc.).
    ConfigValidation(String),
    /// Date field could not be parsed to a calendar date.
    DateParse { side: Side, id: String, value: String },
    /// Amount field could not be parsed (non-numeric, or more than two
    /// fractional digits).
    AmountParse { side: Side, id: String, value: String },
    /// Amount was negative.
    NegativeAmount { side: Side, id: String },
    /// Polarity tag was neither debit nor credit.
    PolarityParse { side: Side, id: String, value: String },
    /// The same id appeared twice within one side.
    DuplicateId { side: Side, id: String },
    /// Caller requested cancellation between passes.
    Cancelled,
    /// A commit violated an engine invariant. Fatal; aborts the run.
    InvariantViolation(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl ReconError {
    /// True for the pre-pass input validation family.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::DateParse { .. }
                | Self::AmountParse { .. }
                | Self::NegativeAmount { .. }
                | Self::PolarityParse { .. }
                | Self::DuplicateId { .. }
        )
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DateParse { side, id, value } => {
                write!(f, "{side} record '{id}': cannot parse date '{value}'")
            }
            Self::AmountParse { side, id, value } => {
                write!(f, "{side} record '{id}': cannot parse amount '{value}'")
            }
            Self::NegativeAmount { side, id } => {
                write!(f, "{side} record '{id}': negative amount")
            }
            Self::PolarityParse { side, id, value } => {
                write!(f, "{side} record '{id}': unknown transaction type '{value}'")
            }
            Self::DuplicateId { side, id } => {
                write!(f, "{side} side: duplicate id '{id}'")
            }
            Self::Cancelled => write!(f, "reconciliation cancelled"),
            Self::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
