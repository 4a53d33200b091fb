use std::cmp::Ordering;

use rust_decimal::Decimal;

/// Scores that agree to this many units of 1e-9 are treated as tied.
const SCORE_QUANTUM: f64 = 1e9;

pub(crate) struct RankingCandidate {
    pub input_index: usize,
    pub composite_score: f64,
    pub total_value: Decimal,
}

fn score_key(score: f64) -> i64 {
    (score * SCORE_QUANTUM).round() as i64
}

/// Higher composite first, cheaper bid on ties, then original input order.
pub(crate) fn compare_candidates(a: &RankingCandidate, b: &RankingCandidate) -> Ordering {
    score_key(b.composite_score)
        .cmp(&score_key(a.composite_score))
        .then_with(|| a.total_value.cmp(&b.total_value))
        .then_with(|| a.input_index.cmp(&b.input_index))
}
