//! Signed probability difference between two buckets.

use crate::frequency::ProbabilityTable;
use serde::Serialize;

/// One ranked term.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedTerm {
    pub text: String,
    pub difference: f64,
}

/// Terms ordered by `prob_a - prob_b`, largest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DifferenceRanking {
    terms: Vec<RankedTerm>,
}

impl DifferenceRanking {
    pub fn terms(&self) -> &[RankedTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The `n` terms most characteristic of the first table.
    pub fn top(&self, n: usize) -> &[RankedTerm] {
        &self.terms[..n.min(self.terms.len())]
    }

    /// The `n` terms most characteristic of the second table, most negative
    /// difference first.
    pub fn bottom(&self, n: usize) -> Vec<&RankedTerm> {
        self.terms.iter().rev().take(n).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.terms.iter().map(|t| (t.text.as_str(), t.difference))
    }
}

/// Rank every key of `prob_b` by `prob_a[k] - prob_b[k]` (missing = 0).
///
/// Keys present only in `prob_a` never appear in the result. Ties keep the
/// iteration order of `prob_b`.
pub fn rank_difference(prob_a: &ProbabilityTable, prob_b: &ProbabilityTable) -> DifferenceRanking {
    let mut terms: Vec<RankedTerm> = prob_b
        .iter()
        .map(|(w, pb)| RankedTerm {
            text: w.to_string(),
            difference: prob_a.get(w).unwrap_or(0.0) - pb,
        })
        .collect();
    // `sort_by` is stable.
    terms.sort_by(|a, b| {
        b.difference
            .partial_cmp(&a.difference)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    DifferenceRanking { terms }
}
