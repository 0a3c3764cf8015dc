//! Description normalization and reference-token extraction.
//!
//! Both functions are deterministic and total; they feed the similarity
//! scorer and the reference-id pass.

use std::collections::BTreeSet;

/// Banking/corporate noise vocabulary stripped before textual comparison.
/// This list is part of the matching contract; changing it changes which
/// descriptions compare equal.
const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "ltd", "inc", "corp", "plc", "llc", "gmbh", "pvt",
    "payment", "transfer", "tfr", "inv", "ref", "invoice", "bill", "reference",
    "to", "from", "of", "for", "by", "deposit", "withdrawal", "dr", "cr",
    "momo", "mobile", "money", "bank", "charges", "service", "fee", "comm",
    "pos", "purchase", "card", "visa", "mastercard", "direct", "debit",
    "standing", "order", "chq", "cheque", "cash", "atm", "trf", "rtgs",
    "neft", "imps", "ach", "wire", "txn", "id", "no", "number", "account",
    "acct", "opening", "balance", "closing", "brought", "forward",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Reduce a free-text narrative to its comparable core: lowercase,
/// punctuation folded to spaces, single-character tokens and stop words
/// dropped, survivors joined with single spaces.
pub fn normalize(input: &str) -> String {
    let folded: String = input
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();

    folded
        .split_whitespace()
        .filter(|t| t.len() > 1)
        .filter(|t| !is_stop_word(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract likely reference-identifier tokens (invoice numbers, transfer
/// references) from a description.
///
/// Tokens are maximal runs of ASCII alphanumerics, so `INV-99821` yields
/// `INV` and `99821` and both sides of a hyphenated/plain reference agree
/// on the digit run. Accepted: all-digit tokens of length >= 3 that are not
/// calendar years in 2020..=2030, and mixed tokens carrying at least one
/// letter and at least three digits. Case-sensitive, deduplicated.
pub fn reference_tokens(input: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();

    for raw in input.split(|c: char| !c.is_ascii_alphanumeric()) {
        if raw.is_empty() {
            continue;
        }
        let digits = raw.bytes().filter(|b| b.is_ascii_digit()).count();
        let letters = raw.bytes().filter(|b| b.is_ascii_alphabetic()).count();

        if letters == 0 {
            // Calendar-year guard: a bare 2020..=2030 is a date, not a reference.
            if let Ok(year) = raw.parse::<i64>() {
                if (2020..=2030).contains(&year) {
                    continue;
                }
            }
            if digits >= 3 {
                tokens.insert(raw.to_string());
            }
        } else if digits >= 3 {
            tokens.insert(raw.to_string());
        }
    }

    tokens
}
