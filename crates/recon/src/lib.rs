//! `crosscheck-recon` — deterministic two-sided bank/ledger reconciliation.
//!
//! Pure engine crate: receives validated transactions, returns match groups
//! and residual unmatched sets. No CLI or IO dependencies beyond the CSV
//! ingest helper.
//!
//! The core is a multi-pass cascade: a reference-id pass, three
//! amount+date+text passes of decreasing confidence, a loose-amount pass
//! for fee variants, and bounded subset-sum passes for split/merge
//! matches. Every pass respects the commitments of the passes before it,
//! and the whole pipeline is single-threaded and deterministic for a given
//! input order and config.

pub mod amount_index;
pub mod cascade;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod similarity;
pub mod subset_sum;
pub mod text;

pub use config::{MatchConfig, Mode};
pub use engine::{reconcile, CancelFlag, Reconciler};
pub use error::ReconError;
pub use ingest::load_csv_transactions;
pub use model::{
    MatchGroup, MatchKind, Polarity, ReconStats, ReconciliationResult, Side, Transaction,
};
