//! Cent-keyed amount index with tolerance range lookup.

use std::collections::BTreeMap;

use crate::model::Transaction;

/// Buckets one side's transactions by integer-cent amount. Values are
/// indices into the slice the index was built over, in insertion order, so
/// candidate enumeration is reproducible.
#[derive(Debug)]
pub struct AmountIndex {
    buckets: BTreeMap<i64, Vec<usize>>,
}

impl AmountIndex {
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, tx) in transactions.iter().enumerate() {
            buckets.entry(tx.amount_cents).or_default().push(i);
        }
        Self { buckets }
    }

    /// Indices of all transactions whose amount lies within
    /// `target_cents ± tolerance_cents`, in ascending amount order and
    /// insertion order within each amount.
    pub fn candidates(&self, target_cents: i64, tolerance_cents: i64) -> Vec<usize> {
        let lo = target_cents.saturating_sub(tolerance_cents);
        let hi = target_cents.saturating_add(tolerance_cents);
        self.buckets
            .range(lo..=hi)
            .flat_map(|(_, bucket)| bucket.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Polarity;
    use chrono::NaiveDate;

    fn tx(id: &str, cents: i64) -> Transaction {
        Transaction::new(
            id,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "test",
            cents,
            Polarity::Debit,
        )
    }

    #[test]
    fn exact_bucket_lookup() {
        let txs = vec![tx("a", 1000), tx("b", 2000), tx("c", 1000)];
        let index = AmountIndex::build(&txs);
        assert_eq!(index.candidates(1000, 0), vec![0, 2]);
        assert_eq!(index.candidates(2000, 0), vec![1]);
        assert!(index.candidates(3000, 0).is_empty());
    }

    #[test]
    fn range_walk_is_ascending_by_amount() {
        let txs = vec![tx("a", 1005), tx("b", 995), tx("c", 1000), tx("d", 1020)];
        let index = AmountIndex::build(&txs);
        // 995, 1000, 1005 fall inside 1000 +/- 5; 1020 does not.
        assert_eq!(index.candidates(1000, 5), vec![1, 2, 0]);
    }

    #[test]
    fn insertion_order_preserved_within_bucket() {
        let txs = vec![tx("a", 500), tx("b", 500), tx("c", 500)];
        let index = AmountIndex::build(&txs);
        assert_eq!(index.candidates(500, 100), vec![0, 1, 2]);
    }

    #[test]
    fn zero_amount_near_zero_target() {
        let txs = vec![tx("a", 0), tx("b", 3)];
        let index = AmountIndex::build(&txs);
        assert_eq!(index.candidates(0, 5), vec![0, 1]);
    }
}
