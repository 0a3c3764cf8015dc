//! Description similarity scoring in [0, 1].

use std::collections::BTreeSet;

use crate::text::{normalize, reference_tokens};

/// Score returned when both descriptions carry reference tokens and share
/// at least one. A shared invoice/transfer id is strong evidence on its
/// own; the exact constant is relied on by downstream thresholds.
pub const REFERENCE_MATCH_SCORE: f64 = 0.98;

/// Score for one normalized description containing the other verbatim.
const CONTAINMENT_SCORE: f64 = 0.85;

/// Similarity between two transaction descriptions.
///
/// Shared reference tokens short-circuit at [`REFERENCE_MATCH_SCORE`].
/// Otherwise the normalized strings are compared by the best of three
/// complementary signals: token-set Jaccard, substring containment, and a
/// length-gated edit-distance score. An empty normalization on either side
/// scores 0. Symmetric in its arguments.
pub fn similarity(a: &str, b: &str) -> f64 {
    let refs_a = reference_tokens(a);
    let refs_b = reference_tokens(b);
    if !refs_a.is_empty() && !refs_b.is_empty() && !refs_a.is_disjoint(&refs_b) {
        return REFERENCE_MATCH_SCORE;
    }

    let na = normalize(a);
    let nb = normalize(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    if na == nb {
        return 1.0;
    }

    let tokens_a: BTreeSet<&str> = na.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = nb.split_whitespace().collect();
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    let jaccard = intersection as f64 / union as f64;

    let containment = if na.contains(&nb) || nb.contains(&na) {
        CONTAINMENT_SCORE
    } else {
        0.0
    };

    // Edit distance only pays off on comparable lengths; a large length gap
    // already means low similarity and the quadratic cost is wasted.
    let (len_a, len_b) = (na.len(), nb.len());
    let edit = if len_a.abs_diff(len_b) < 5 && len_a.max(len_b) > 3 {
        let dist = strsim::levenshtein(&na, &nb);
        1.0 - dist as f64 / len_a.max(len_b) as f64
    } else {
        0.0
    };

    jaccard.max(containment).max(edit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_reference_short_circuits() {
        let s = similarity("TRF INV-99821 ACME", "Invoice 99821 payment");
        assert_eq!(s, REFERENCE_MATCH_SCORE);
    }

    #[test]
    fn reference_short_circuit_beats_textual_equality() {
        // Identical strings with a shared reference still take the
        // short-circuit path.
        let s = similarity("Invoice 99821", "Invoice 99821");
        assert_eq!(s, REFERENCE_MATCH_SCORE);
    }

    #[test]
    fn normalized_equality_scores_one() {
        assert_eq!(similarity("ACME CORP SERVICES", "Acme Corp Services Ltd"), 1.0);
    }

    #[test]
    fn empty_normalization_scores_zero() {
        assert_eq!(similarity("RTGS TRF", "Acme Corp"), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn jaccard_overlap() {
        // {salary, june, mensah} vs {mensah, salary}: 2 shared of 3 total.
        let s = similarity("Salary June K Mensah", "K. Mensah salary payment");
        assert!((s - 2.0 / 3.0).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn containment_floor() {
        // "acme holdings" is a substring of "acme holdings international";
        // token overlap would only give 2/3.
        let s = similarity("Acme Holdings", "Acme Holdings International");
        assert_eq!(s, CONTAINMENT_SCORE);
    }

    #[test]
    fn edit_distance_catches_typos() {
        // One substitution in otherwise disjoint-token strings.
        let s = similarity("flexworth", "flexwarth");
        assert!((s - (1.0 - 1.0 / 9.0)).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn edit_distance_gated_on_length_gap() {
        // Token sets disjoint, no containment, length gap >= 5: score 0.
        let s = similarity("abcd", "zzzzzzzzzzzz");
        assert_eq!(s, 0.0);
    }

    #[test]
    fn bounded_and_symmetric() {
        let samples = [
            "TRF INV-99821 ACME",
            "Invoice 99821 payment",
            "Salary June K Mensah",
            "K. Mensah salary payment",
            "Wire ACME Holdings",
            "Unrelated",
            "RTGS TRF",
            "",
        ];
        for a in &samples {
            for b in &samples {
                let ab = similarity(a, b);
                let ba = similarity(b, a);
                assert!((0.0..=1.0).contains(&ab), "similarity({a:?},{b:?}) = {ab}");
                assert_eq!(ab, ba, "asymmetric for {a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn identity_scores_one_for_plain_text() {
        for s in ["Acme Holdings", "salary june mensah", "grocery store run"] {
            assert_eq!(similarity(s, s), 1.0);
        }
    }
}
