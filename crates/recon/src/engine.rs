//! Reconciliation driver: validates inputs, runs the cascade in order,
//! assembles the result.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cascade::{
    pass_exact_date, pass_fuzzy_date, pass_loose_amount, pass_many_to_one, pass_one_to_many,
    pass_reference_id, pass_strict_window, CascadeState, SideView,
};
use crate::config::{MatchConfig, Mode};
use crate::error::ReconError;
use crate::model::{ReconStats, ReconciliationResult, Side, Transaction};

/// Progress percentages reported between pipeline stages: one before the
/// first pass, one after each of the seven passes, one after assembly.
const PROGRESS_STEPS: [u8; 9] = [5, 15, 30, 50, 65, 75, 85, 92, 100];

/// Shared cancellation flag. Checked between passes; a cancelled run
/// returns [`ReconError::Cancelled`] with no partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reconcile two transaction sets under a built-in profile. The common
/// entry point; use [`Reconciler`] for progress or cancellation hooks.
pub fn reconcile(
    bank: &[Transaction],
    ledger: &[Transaction],
    mode: Mode,
) -> Result<ReconciliationResult, ReconError> {
    Reconciler::new(MatchConfig::for_mode(mode)).run(bank, ledger)
}

/// A configured reconciliation run with optional progress and cancellation
/// collaborators. Single-shot and single-threaded; independent runs may be
/// executed in parallel by the caller.
pub struct Reconciler<'a> {
    config: MatchConfig,
    progress: Option<Box<dyn FnMut(u8) + 'a>>,
    cancel: Option<CancelFlag>,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            progress: None,
            cancel: None,
        }
    }

    /// Register a progress sink. Percentages are monotonically
    /// non-decreasing and never affect the reconciliation output.
    pub fn on_progress(mut self, sink: impl FnMut(u8) + 'a) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn run(
        mut self,
        bank: &[Transaction],
        ledger: &[Transaction],
    ) -> Result<ReconciliationResult, ReconError> {
        self.config.validate()?;
        validate_side(Side::Bank, bank)?;
        validate_side(Side::Ledger, ledger)?;

        let bank_view = SideView::new(bank);
        let ledger_view = SideView::new(ledger);
        let mut state = CascadeState::new();
        let mut steps = PROGRESS_STEPS.iter().copied();
        self.report(&mut steps);

        type Pass = fn(
            &mut CascadeState,
            &SideView<'_>,
            &SideView<'_>,
            &MatchConfig,
        ) -> Result<(), ReconError>;
        let passes: [(&str, Pass); 7] = [
            ("reference_id", pass_reference_id),
            ("exact_date", pass_exact_date),
            ("strict_window", pass_strict_window),
            ("loose_amount", pass_loose_amount),
            ("fuzzy_date", pass_fuzzy_date),
            ("one_to_many", pass_one_to_many),
            ("many_to_one", pass_many_to_one),
        ];

        for (name, pass) in passes {
            self.check_cancelled()?;
            let before = state.matches().len();
            pass(&mut state, &bank_view, &ledger_view, &self.config)?;
            tracing::debug!(
                pass = name,
                new_matches = state.matches().len() - before,
                "pass complete"
            );
            self.report(&mut steps);
        }

        self.check_cancelled()?;
        let result = assemble(bank, ledger, state);
        self.report(&mut steps);
        Ok(result)
    }

    fn report(&mut self, steps: &mut impl Iterator<Item = u8>) {
        let percent = steps.next();
        if let (Some(sink), Some(percent)) = (self.progress.as_mut(), percent) {
            sink(percent);
        }
    }

    fn check_cancelled(&self) -> Result<(), ReconError> {
        match &self.cancel {
            Some(flag) if flag.is_cancelled() => Err(ReconError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Pre-pass input validation: ids unique within the side, amounts
/// non-negative. Runs before any pass so a bad input never yields a
/// partial result.
fn validate_side(side: Side, transactions: &[Transaction]) -> Result<(), ReconError> {
    let mut seen = HashSet::with_capacity(transactions.len());
    for tx in transactions {
        if tx.amount_cents < 0 {
            return Err(ReconError::NegativeAmount {
                side,
                id: tx.id.clone(),
            });
        }
        if !seen.insert(tx.id.as_str()) {
            return Err(ReconError::DuplicateId {
                side,
                id: tx.id.clone(),
            });
        }
    }
    Ok(())
}

fn assemble(
    bank: &[Transaction],
    ledger: &[Transaction],
    state: CascadeState,
) -> ReconciliationResult {
    let unmatched_bank: Vec<Transaction> = bank
        .iter()
        .filter(|t| !state.is_bank_matched(&t.id))
        .cloned()
        .collect();
    let unmatched_ledger: Vec<Transaction> = ledger
        .iter()
        .filter(|t| !state.is_ledger_matched(&t.id))
        .cloned()
        .collect();

    let matched_bank_count = bank.len() - unmatched_bank.len();
    let matched_ledger_count = ledger.len() - unmatched_ledger.len();
    let total = bank.len() + ledger.len();
    let match_rate = if total == 0 {
        0.0
    } else {
        (matched_bank_count + matched_ledger_count) as f64 / total as f64 * 100.0
    };

    ReconciliationResult {
        matches: state.into_matches(),
        unmatched_bank,
        unmatched_ledger,
        stats: ReconStats {
            total_bank: bank.len(),
            total_ledger: ledger.len(),
            matched_bank_count,
            matched_ledger_count,
            unmatched_bank_count: bank.len() - matched_bank_count,
            unmatched_ledger_count: ledger.len() - matched_ledger_count,
            match_rate,
        },
    }
}
