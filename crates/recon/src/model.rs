use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// Which input a transaction came from. Matching is asymmetric only in
/// iteration direction; the side mostly matters for error context and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Bank,
    Ledger,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bank => write!(f, "bank"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Debit or credit tag. Two transactions may only be matched when their
/// polarities are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Debit,
    Credit,
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(format!("unknown polarity '{other}'")),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "debit"),
            Self::Credit => write!(f, "credit"),
        }
    }
}

/// A single normalized transaction from either side. Inputs are never
/// mutated by the engine; match groups hold clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Non-negative amount in integer cents. Cent precision keeps index
    /// keys and sum comparisons exact.
    pub amount_cents: i64,
    pub polarity: Polarity,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        amount_cents: i64,
        polarity: Polarity,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            amount_cents,
            polarity,
        }
    }
}

/// Parse a decimal amount string with at most two fractional digits into
/// non-negative integer cents. `"1250"`, `"1250.5"`, and `"1250.50"` all
/// yield 125050.
pub fn parse_amount_cents(value: &str) -> Result<i64, AmountParseKind> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AmountParseKind::Malformed);
    }
    if trimmed.starts_with('-') {
        return Err(AmountParseKind::Negative);
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((_, "")) => return Err(AmountParseKind::Malformed),
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountParseKind::Malformed);
    }
    if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountParseKind::Malformed);
    }

    let whole: i64 = whole.parse().map_err(|_| AmountParseKind::Malformed)?;
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| AmountParseKind::Malformed)? * 10,
        _ => frac.parse().map_err(|_| AmountParseKind::Malformed)?,
    };

    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .ok_or(AmountParseKind::Malformed)
}

/// Why an amount string was rejected. Mapped to `ReconError` with record
/// context by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountParseKind {
    Negative,
    Malformed,
}

/// Render integer cents as a 2-decimal string for reasons and summaries.
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// How a match group was formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    OneToMany,
    ManyToOne,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::OneToMany => write!(f, "one-to-many"),
            Self::ManyToOne => write!(f, "many-to-one"),
        }
    }
}

/// An atomic match decision. Created by the cascade, never modified or
/// removed afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct MatchGroup {
    pub id: String,
    pub bank: Vec<Transaction>,
    pub ledger: Vec<Transaction>,
    pub kind: MatchKind,
    /// Pass name plus any quantitative hint (similarity %, day offset,
    /// amount diff).
    pub reason: String,
    pub confidence: f64,
}

impl MatchGroup {
    pub fn bank_total_cents(&self) -> i64 {
        self.bank.iter().map(|t| t.amount_cents).sum()
    }

    pub fn ledger_total_cents(&self) -> i64 {
        self.ledger.iter().map(|t| t.amount_cents).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconStats {
    pub total_bank: usize,
    pub total_ledger: usize,
    pub matched_bank_count: usize,
    pub matched_ledger_count: usize,
    pub unmatched_bank_count: usize,
    pub unmatched_ledger_count: usize,
    /// (matched items across both sides) / (total items across both sides)
    /// as a percentage.
    pub match_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    pub matches: Vec<MatchGroup>,
    pub unmatched_bank: Vec<Transaction>,
    pub unmatched_ledger: Vec<Transaction>,
    pub stats: ReconStats,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
