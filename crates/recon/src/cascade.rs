//! The ordered match cascade.
//!
//! Each pass is a standalone function from (state, side views, config) to a
//! set of commits. Passes run from highest to lowest confidence and never
//! revisit a committed transaction, so earlier passes always win. Iteration
//! order within a pass is date ascending with input-order ties; candidate
//! enumeration follows the amount index (ascending cents, input order
//! within a bucket). Both orders are part of the determinism contract.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::amount_index::AmountIndex;
use crate::config::MatchConfig;
use crate::error::ReconError;
use crate::model::{format_cents, MatchGroup, MatchKind, Transaction};
use crate::similarity::similarity;
use crate::subset_sum::find_subset;
use crate::text::reference_tokens;

/// Candidates whose scores differ by no more than this are tied in the
/// strict-window pass and fall through to the date tiebreak.
const SCORE_BAND_STRICT: f64 = 0.1;
/// Same, for the loose-amount pass (amount-diff tiebreak).
const SCORE_BAND_LOOSE: f64 = 0.05;

// ---------------------------------------------------------------------------
// Side view
// ---------------------------------------------------------------------------

/// One side's transactions with the pass iteration order and amount index
/// precomputed.
pub struct SideView<'a> {
    pub txs: &'a [Transaction],
    /// Indices sorted by (date, input position).
    pub order: Vec<usize>,
    pub index: AmountIndex,
}

impl<'a> SideView<'a> {
    pub fn new(txs: &'a [Transaction]) -> Self {
        let mut order: Vec<usize> = (0..txs.len()).collect();
        order.sort_by(|&a, &b| txs[a].date.cmp(&txs[b].date).then(a.cmp(&b)));
        Self {
            txs,
            order,
            index: AmountIndex::build(txs),
        }
    }
}

fn days_apart(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

// ---------------------------------------------------------------------------
// Cascade state
// ---------------------------------------------------------------------------

/// The only mutable data in the engine: matched-id sets and the append-only
/// match list. Scoped to a single reconciliation run.
#[derive(Debug, Default)]
pub struct CascadeState {
    matched_bank: HashSet<String>,
    matched_ledger: HashSet<String>,
    matches: Vec<MatchGroup>,
}

impl CascadeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bank_matched(&self, id: &str) -> bool {
        self.matched_bank.contains(id)
    }

    pub fn is_ledger_matched(&self, id: &str) -> bool {
        self.matched_ledger.contains(id)
    }

    pub fn matches(&self) -> &[MatchGroup] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<MatchGroup> {
        self.matches
    }

    /// Record a match group and consume its transactions. Rejects commits
    /// that would break group invariants: empty sides, mixed polarity, or
    /// an id that is already matched.
    pub fn commit(
        &mut self,
        bank: Vec<Transaction>,
        ledger: Vec<Transaction>,
        kind: MatchKind,
        reason: String,
        confidence: f64,
    ) -> Result<(), ReconError> {
        if bank.is_empty() || ledger.is_empty() {
            return Err(ReconError::InvariantViolation(format!(
                "match group '{reason}' has an empty side"
            )));
        }
        let polarity = bank[0].polarity;
        if bank
            .iter()
            .chain(ledger.iter())
            .any(|t| t.polarity != polarity)
        {
            return Err(ReconError::InvariantViolation(format!(
                "match group '{reason}' mixes polarities"
            )));
        }
        for t in &bank {
            if self.matched_bank.contains(&t.id) {
                return Err(ReconError::InvariantViolation(format!(
                    "bank id '{}' committed twice",
                    t.id
                )));
            }
        }
        for t in &ledger {
            if self.matched_ledger.contains(&t.id) {
                return Err(ReconError::InvariantViolation(format!(
                    "ledger id '{}' committed twice",
                    t.id
                )));
            }
        }

        for t in &bank {
            self.matched_bank.insert(t.id.clone());
        }
        for t in &ledger {
            self.matched_ledger.insert(t.id.clone());
        }
        let id = format!("mg_{}", self.matches.len() + 1);
        self.matches.push(MatchGroup {
            id,
            bank,
            ledger,
            kind,
            reason,
            confidence,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pass 1 — reference id
// ---------------------------------------------------------------------------

/// Amount within tolerance, date within the wide reference window, and a
/// shared reference token. The strongest signal, so it runs first.
pub fn pass_reference_id(
    state: &mut CascadeState,
    bank: &SideView<'_>,
    ledger: &SideView<'_>,
    config: &MatchConfig,
) -> Result<(), ReconError> {
    for &bi in &bank.order {
        let b = &bank.txs[bi];
        if state.is_bank_matched(&b.id) {
            continue;
        }
        let b_refs = reference_tokens(&b.description);
        if b_refs.is_empty() {
            continue;
        }

        for li in ledger
            .index
            .candidates(b.amount_cents, config.amount_tolerance_cents)
        {
            let l = &ledger.txs[li];
            if state.is_ledger_matched(&l.id)
                || l.polarity != b.polarity
                || days_apart(b.date, l.date) > config.date_window_reference
            {
                continue;
            }
            if !b_refs.is_disjoint(&reference_tokens(&l.description)) {
                state.commit(
                    vec![b.clone()],
                    vec![l.clone()],
                    MatchKind::Exact,
                    "Matched by Amount & Reference ID".into(),
                    0.99,
                )?;
                break;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pass 2 — perfect date
// ---------------------------------------------------------------------------

/// Amount within tolerance on the same day. The highest-similarity
/// candidate wins; ties keep the earliest candidate.
pub fn pass_exact_date(
    state: &mut CascadeState,
    bank: &SideView<'_>,
    ledger: &SideView<'_>,
    config: &MatchConfig,
) -> Result<(), ReconError> {
    for &bi in &bank.order {
        let b = &bank.txs[bi];
        if state.is_bank_matched(&b.id) {
            continue;
        }

        let mut best: Option<(usize, f64)> = None;
        for li in ledger
            .index
            .candidates(b.amount_cents, config.amount_tolerance_cents)
        {
            let l = &ledger.txs[li];
            if state.is_ledger_matched(&l.id)
                || l.polarity != b.polarity
                || b.date != l.date
            {
                continue;
            }
            let score = similarity(&b.description, &l.description);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((li, score));
            }
        }

        if let Some((li, score)) = best {
            let reason = if score > 0.8 {
                "Perfect Match"
            } else {
                "Matched by Amount & Exact Date"
            };
            state.commit(
                vec![b.clone()],
                vec![ledger.txs[li].clone()],
                MatchKind::Exact,
                reason.into(),
                0.95,
            )?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pass 3 — strict window
// ---------------------------------------------------------------------------

/// Amount within tolerance inside the strict date window. Candidates whose
/// scores sit within [`SCORE_BAND_STRICT`] of each other are ranked by date
/// proximity instead. The winner must clear a modest text bar or sit
/// within a day.
pub fn pass_strict_window(
    state: &mut CascadeState,
    bank: &SideView<'_>,
    ledger: &SideView<'_>,
    config: &MatchConfig,
) -> Result<(), ReconError> {
    for &bi in &bank.order {
        let b = &bank.txs[bi];
        if state.is_bank_matched(&b.id) {
            continue;
        }

        let mut best: Option<(usize, f64, i64)> = None;
        for li in ledger
            .index
            .candidates(b.amount_cents, config.amount_tolerance_cents)
        {
            let l = &ledger.txs[li];
            if state.is_ledger_matched(&l.id) || l.polarity != b.polarity {
                continue;
            }
            let date_diff = days_apart(b.date, l.date);
            if date_diff > config.date_window_strict {
                continue;
            }
            let score = similarity(&b.description, &l.description);
            let better = match best {
                None => true,
                Some((_, best_score, best_diff)) => {
                    score > best_score + SCORE_BAND_STRICT
                        || ((score - best_score).abs() <= SCORE_BAND_STRICT
                            && date_diff < best_diff)
                }
            };
            if better {
                best = Some((li, score, date_diff));
            }
        }

        if let Some((li, score, date_diff)) = best {
            if score >= 0.5 || date_diff <= 1 {
                let reason = if score >= 0.8 {
                    "Strong Text & Nearby Date"
                } else {
                    "Amount & Nearby Date"
                };
                state.commit(
                    vec![b.clone()],
                    vec![ledger.txs[li].clone()],
                    MatchKind::Exact,
                    reason.into(),
                    0.90,
                )?;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pass 3.5 — loose amount, strong text
// ---------------------------------------------------------------------------

/// Fee/rounding variants: amount only within the loose tolerance, so the
/// text similarity bar is high. Score ties within [`SCORE_BAND_LOOSE`]
/// rank by amount proximity.
pub fn pass_loose_amount(
    state: &mut CascadeState,
    bank: &SideView<'_>,
    ledger: &SideView<'_>,
    config: &MatchConfig,
) -> Result<(), ReconError> {
    for &bi in &bank.order {
        let b = &bank.txs[bi];
        if state.is_bank_matched(&b.id) {
            continue;
        }

        let mut best: Option<(usize, f64, i64)> = None;
        for li in ledger
            .index
            .candidates(b.amount_cents, config.amount_tolerance_loose_cents)
        {
            let l = &ledger.txs[li];
            if state.is_ledger_matched(&l.id)
                || l.polarity != b.polarity
                || days_apart(b.date, l.date) > config.date_window_strict
            {
                continue;
            }
            let score = similarity(&b.description, &l.description);
            if score <= 0.85 {
                continue;
            }
            let amount_diff = (b.amount_cents - l.amount_cents).abs();
            let better = match best {
                None => true,
                Some((_, best_score, best_diff)) => {
                    score > best_score + SCORE_BAND_LOOSE
                        || ((score - best_score).abs() <= SCORE_BAND_LOOSE
                            && amount_diff < best_diff)
                }
            };
            if better {
                best = Some((li, score, amount_diff));
            }
        }

        if let Some((li, _, amount_diff)) = best {
            state.commit(
                vec![b.clone()],
                vec![ledger.txs[li].clone()],
                MatchKind::Fuzzy,
                format!(
                    "Strong Text & Approx Amount (Diff: {})",
                    format_cents(amount_diff)
                ),
                0.88,
            )?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pass 4 — fuzzy date
// ---------------------------------------------------------------------------

/// Amount within tolerance inside the loose date window. The date offset
/// discounts the text score by up to 0.2; the discounted score becomes the
/// group confidence, but acceptance gates on the raw score.
pub fn pass_fuzzy_date(
    state: &mut CascadeState,
    bank: &SideView<'_>,
    ledger: &SideView<'_>,
    config: &MatchConfig,
) -> Result<(), ReconError> {
    if config.date_window_loose == 0 {
        return Ok(());
    }
    for &bi in &bank.order {
        let b = &bank.txs[bi];
        if state.is_bank_matched(&b.id) {
            continue;
        }

        // (ledger idx, raw score, final score, date diff)
        let mut best: Option<(usize, f64, f64, i64)> = None;
        for li in ledger
            .index
            .candidates(b.amount_cents, config.amount_tolerance_cents)
        {
            let l = &ledger.txs[li];
            if state.is_ledger_matched(&l.id) || l.polarity != b.polarity {
                continue;
            }
            let date_diff = days_apart(b.date, l.date);
            if date_diff > config.date_window_loose {
                continue;
            }
            let raw = similarity(&b.description, &l.description);
            let penalty = date_diff as f64 / config.date_window_loose as f64 * 0.2;
            let final_score = raw - penalty;
            if best.map_or(true, |(_, _, s, _)| final_score > s) {
                best = Some((li, raw, final_score, date_diff));
            }
        }

        if let Some((li, raw, final_score, date_diff)) = best {
            if raw >= config.fuzzy_text_threshold {
                state.commit(
                    vec![b.clone()],
                    vec![ledger.txs[li].clone()],
                    MatchKind::Fuzzy,
                    format!(
                        "Fuzzy Match ({:.0}% text sim, {}d offset)",
                        raw * 100.0,
                        date_diff
                    ),
                    final_score.clamp(0.0, 1.0),
                )?;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pass 5 — combinations
// ---------------------------------------------------------------------------

/// One bank transaction split across several ledger entries.
pub fn pass_one_to_many(
    state: &mut CascadeState,
    bank: &SideView<'_>,
    ledger: &SideView<'_>,
    config: &MatchConfig,
) -> Result<(), ReconError> {
    if config.max_combination_depth == 0 {
        return Ok(());
    }
    for &bi in &bank.order {
        let b = &bank.txs[bi];
        if state.is_bank_matched(&b.id) {
            continue;
        }

        let pool = combination_pool(state, ledger, b, config, false);
        if pool.is_empty() {
            continue;
        }
        let amounts: Vec<i64> = pool.iter().map(|&li| ledger.txs[li].amount_cents).collect();
        let Some(subset) = find_subset(
            &amounts,
            b.amount_cents,
            config.amount_tolerance_cents,
            config.max_combination_depth,
        ) else {
            continue;
        };

        let group: Vec<Transaction> = subset.iter().map(|&i| ledger.txs[pool[i]].clone()).collect();
        let diff = (b.amount_cents - group.iter().map(|t| t.amount_cents).sum::<i64>()).abs();
        let reason = format!(
            "One-to-Many: {} ledger entries sum to bank amount (diff {})",
            group.len(),
            format_cents(diff)
        );
        state.commit(vec![b.clone()], group, MatchKind::OneToMany, reason, 0.85)?;
    }
    Ok(())
}

/// Several bank entries merged into one ledger transaction. Mirror of
/// [`pass_one_to_many`] with the sides reversed.
pub fn pass_many_to_one(
    state: &mut CascadeState,
    bank: &SideView<'_>,
    ledger: &SideView<'_>,
    config: &MatchConfig,
) -> Result<(), ReconError> {
    if config.max_combination_depth == 0 {
        return Ok(());
    }
    for &li in &ledger.order {
        let l = &ledger.txs[li];
        if state.is_ledger_matched(&l.id) {
            continue;
        }

        let pool = combination_pool(state, bank, l, config, true);
        if pool.is_empty() {
            continue;
        }
        let amounts: Vec<i64> = pool.iter().map(|&bi| bank.txs[bi].amount_cents).collect();
        let Some(subset) = find_subset(
            &amounts,
            l.amount_cents,
            config.amount_tolerance_cents,
            config.max_combination_depth,
        ) else {
            continue;
        };

        let group: Vec<Transaction> = subset.iter().map(|&i| bank.txs[pool[i]].clone()).collect();
        let diff = (l.amount_cents - group.iter().map(|t| t.amount_cents).sum::<i64>()).abs();
        let reason = format!(
            "Many-to-One: {} bank entries sum to ledger amount (diff {})",
            group.len(),
            format_cents(diff)
        );
        state.commit(group, vec![l.clone()], MatchKind::ManyToOne, reason, 0.85)?;
    }
    Ok(())
}

/// Unmatched entries on `side` that can participate in a combination for
/// `target`: same polarity, inside the strict date window, and not alone
/// exceeding the target plus tolerance. Sorted by date proximity to the
/// target, ties by date order.
fn combination_pool(
    state: &CascadeState,
    side: &SideView<'_>,
    target: &Transaction,
    config: &MatchConfig,
    side_is_bank: bool,
) -> Vec<usize> {
    let mut pool: Vec<usize> = side
        .order
        .iter()
        .copied()
        .filter(|&i| {
            let t = &side.txs[i];
            let matched = if side_is_bank {
                state.is_bank_matched(&t.id)
            } else {
                state.is_ledger_matched(&t.id)
            };
            !matched
                && t.polarity == target.polarity
                && days_apart(target.date, t.date) <= config.date_window_strict
                && t.amount_cents <= target.amount_cents + config.amount_tolerance_cents
        })
        .collect();
    pool.sort_by_key(|&i| days_apart(target.date, side.txs[i].date));
    pool
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Polarity;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tx(id: &str, d: &str, desc: &str, cents: i64) -> Transaction {
        Transaction::new(id, date(d), desc, cents, Polarity::Debit)
    }

    fn credit(id: &str, d: &str, desc: &str, cents: i64) -> Transaction {
        Transaction::new(id, date(d), desc, cents, Polarity::Credit)
    }

    #[test]
    fn commit_rejects_double_match() {
        let mut state = CascadeState::new();
        let b = tx("b1", "2024-01-01", "x", 100);
        let l = tx("l1", "2024-01-01", "x", 100);
        state
            .commit(
                vec![b.clone()],
                vec![l.clone()],
                MatchKind::Exact,
                "first".into(),
                0.9,
            )
            .unwrap();
        let err = state
            .commit(vec![b], vec![tx("l2", "2024-01-01", "x", 100)], MatchKind::Exact, "again".into(), 0.9)
            .unwrap_err();
        assert!(matches!(err, ReconError::InvariantViolation(_)));
    }

    #[test]
    fn commit_rejects_mixed_polarity() {
        let mut state = CascadeState::new();
        let err = state
            .commit(
                vec![tx("b1", "2024-01-01", "x", 100)],
                vec![credit("l1", "2024-01-01", "x", 100)],
                MatchKind::Exact,
                "mixed".into(),
                0.9,
            )
            .unwrap_err();
        assert!(matches!(err, ReconError::InvariantViolation(_)));
    }

    #[test]
    fn commit_rejects_empty_side() {
        let mut state = CascadeState::new();
        let err = state
            .commit(
                vec![tx("b1", "2024-01-01", "x", 100)],
                vec![],
                MatchKind::Exact,
                "empty".into(),
                0.9,
            )
            .unwrap_err();
        assert!(matches!(err, ReconError::InvariantViolation(_)));
    }

    #[test]
    fn group_ids_are_unique_and_sequential() {
        let mut state = CascadeState::new();
        for i in 0..3 {
            state
                .commit(
                    vec![tx(&format!("b{i}"), "2024-01-01", "x", 100)],
                    vec![tx(&format!("l{i}"), "2024-01-01", "x", 100)],
                    MatchKind::Exact,
                    "seq".into(),
                    0.9,
                )
                .unwrap();
        }
        let ids: Vec<&str> = state.matches().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["mg_1", "mg_2", "mg_3"]);
    }

    #[test]
    fn reference_pass_spans_wide_date_gap() {
        let bank_txs = vec![tx("b1", "2024-01-05", "TRF INV-99821 ACME", 125000)];
        let ledger_txs = vec![tx("l1", "2024-02-15", "Invoice 99821 payment", 125000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);
        let config = MatchConfig::accuracy();

        let mut state = CascadeState::new();
        pass_reference_id(&mut state, &bank, &ledger, &config).unwrap();
        assert_eq!(state.matches().len(), 1);
        assert_eq!(state.matches()[0].reason, "Matched by Amount & Reference ID");
        assert_eq!(state.matches()[0].confidence, 0.99);
    }

    #[test]
    fn reference_pass_respects_window() {
        let bank_txs = vec![tx("b1", "2024-01-05", "TRF INV-99821", 125000)];
        // 60 days out, beyond the 45-day accuracy window.
        let ledger_txs = vec![tx("l1", "2024-03-05", "Invoice 99821", 125000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_reference_id(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert!(state.matches().is_empty());
    }

    #[test]
    fn exact_date_pass_prefers_higher_similarity() {
        let bank_txs = vec![tx("b1", "2024-03-10", "ACME CORP SERVICES", 50000)];
        let ledger_txs = vec![
            tx("l1", "2024-03-10", "Unrelated", 50000),
            tx("l2", "2024-03-10", "Acme Corp Services Ltd", 50000),
        ];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_exact_date(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert_eq!(state.matches().len(), 1);
        assert_eq!(state.matches()[0].ledger[0].id, "l2");
        assert_eq!(state.matches()[0].reason, "Perfect Match");
    }

    #[test]
    fn strict_window_rejects_weak_text_beyond_one_day() {
        let bank_txs = vec![tx("b1", "2024-03-10", "Totally unrelated words", 50000)];
        let ledger_txs = vec![tx("l1", "2024-03-13", "Another thing entirely", 50000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_strict_window(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert!(state.matches().is_empty());
    }

    #[test]
    fn strict_window_accepts_amount_match_within_one_day() {
        let bank_txs = vec![tx("b1", "2024-03-10", "Totally unrelated words", 50000)];
        let ledger_txs = vec![tx("l1", "2024-03-11", "Another thing entirely", 50000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_strict_window(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert_eq!(state.matches().len(), 1);
        assert_eq!(state.matches()[0].reason, "Amount & Nearby Date");
    }

    #[test]
    fn loose_amount_pass_reports_diff() {
        let bank_txs = vec![tx("b1", "2024-06-10", "Wire ACME Holdings", 99875)];
        let ledger_txs = vec![tx("l1", "2024-06-10", "Wire ACME Holdings", 100000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_loose_amount(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert_eq!(state.matches().len(), 1);
        let m = &state.matches()[0];
        assert_eq!(m.kind, MatchKind::Fuzzy);
        assert_eq!(m.confidence, 0.88);
        assert!(m.reason.contains("Approx Amount (Diff: 1.25)"), "{}", m.reason);
    }

    #[test]
    fn fuzzy_pass_discounts_by_date_offset() {
        let bank_txs = vec![credit("b1", "2024-04-01", "Salary June K Mensah", 300000)];
        let ledger_txs = vec![credit("l1", "2024-04-08", "K. Mensah salary payment", 300000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_fuzzy_date(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert_eq!(state.matches().len(), 1);
        let m = &state.matches()[0];
        let raw = 2.0 / 3.0;
        let expected = raw - (7.0 / 10.0) * 0.2;
        assert!((m.confidence - expected).abs() < 1e-9, "{}", m.confidence);
        assert!(m.reason.contains("% text sim"), "{}", m.reason);
        assert!(m.reason.contains("7d offset"), "{}", m.reason);
    }

    #[test]
    fn one_to_many_finds_split() {
        let bank_txs = vec![tx("b1", "2024-05-02", "Bulk payment", 100000)];
        let ledger_txs = vec![
            tx("l1", "2024-05-01", "Part A", 40000),
            tx("l2", "2024-05-03", "Part B", 60000),
            tx("l3", "2024-05-02", "Noise", 25000),
        ];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_one_to_many(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert_eq!(state.matches().len(), 1);
        let m = &state.matches()[0];
        assert_eq!(m.kind, MatchKind::OneToMany);
        let mut ids: Vec<&str> = m.ledger.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["l1", "l2"]);
        assert!(!state.is_ledger_matched("l3"));
    }

    #[test]
    fn many_to_one_mirrors_split() {
        let bank_txs = vec![
            tx("b1", "2024-05-01", "Part A", 40000),
            tx("b2", "2024-05-03", "Part B", 60000),
        ];
        let ledger_txs = vec![tx("l1", "2024-05-02", "Bulk entry", 100000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut state = CascadeState::new();
        pass_many_to_one(&mut state, &bank, &ledger, &MatchConfig::accuracy()).unwrap();
        assert_eq!(state.matches().len(), 1);
        assert_eq!(state.matches()[0].kind, MatchKind::ManyToOne);
        assert_eq!(state.matches()[0].bank.len(), 2);
    }

    #[test]
    fn combination_passes_disabled_at_zero_depth() {
        let bank_txs = vec![tx("b1", "2024-05-02", "Bulk payment", 100000)];
        let ledger_txs = vec![
            tx("l1", "2024-05-01", "Part A", 40000),
            tx("l2", "2024-05-03", "Part B", 60000),
        ];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);

        let mut config = MatchConfig::accuracy();
        config.max_combination_depth = 0;
        let mut state = CascadeState::new();
        pass_one_to_many(&mut state, &bank, &ledger, &config).unwrap();
        pass_many_to_one(&mut state, &bank, &ledger, &config).unwrap();
        assert!(state.matches().is_empty());
    }

    #[test]
    fn polarity_is_a_hard_constraint_everywhere() {
        let bank_txs = vec![tx("b1", "2024-03-10", "Acme Services", 50000)];
        let ledger_txs = vec![credit("l1", "2024-03-10", "Acme Services", 50000)];
        let bank = SideView::new(&bank_txs);
        let ledger = SideView::new(&ledger_txs);
        let config = MatchConfig::accuracy();

        let mut state = CascadeState::new();
        pass_reference_id(&mut state, &bank, &ledger, &config).unwrap();
        pass_exact_date(&mut state, &bank, &ledger, &config).unwrap();
        pass_strict_window(&mut state, &bank, &ledger, &config).unwrap();
        pass_loose_amount(&mut state, &bank, &ledger, &config).unwrap();
        pass_fuzzy_date(&mut state, &bank, &ledger, &config).unwrap();
        pass_one_to_many(&mut state, &bank, &ledger, &config).unwrap();
        pass_many_to_one(&mut state, &bank, &ledger, &config).unwrap();
        assert!(state.matches().is_empty());
    }
}
