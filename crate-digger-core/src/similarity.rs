//! Bounded string similarity used to rank catalog candidates.
//!
//! Scores are Sørensen–Dice coefficients over character bigrams (whitespace
//! ignored). The matcher thresholds in [`crate::catalog`] are tuned against
//! this metric; changing the metric means re-tuning them.

use crate::text::normalize;

/// Similarity of two already-normalized strings, in `[0, 1]`.
///
/// Symmetric. Identical inputs score `1.0`; strings sharing no bigram score
/// `0.0`.
pub fn score(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(a, b).clamp(0.0, 1.0)
}

/// Normalize both sides, then [`score`] them.
pub fn normalized_score(a: &str, b: &str) -> f64 {
    score(&normalize(a), &normalize(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_scores_one() {
        for s in ["", "a", "ok computer", "radiohead ok computer"] {
            assert_eq!(score(s, s), 1.0, "score({s:?}, {s:?})");
        }
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("ok computer", "ok computer oknotok"),
            ("kid a", "amnesiac"),
            ("night", "nacht"),
            ("bjork", "björk"),
            ("", "abc"),
        ];
        for (a, b) in pairs {
            assert_eq!(score(a, b), score(b, a), "asymmetric for {a:?} / {b:?}");
        }
    }

    #[test]
    fn test_disjoint_scores_zero() {
        assert_eq!(score("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_bounded() {
        let s = score("radiohead ok computer", "radiohead ok computer oknotok 1997 2017");
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn test_normalized_score_ignores_presentation() {
        assert_eq!(normalized_score("Radiohead OK Computer", "Radiohead - OK Computer"), 1.0);
        assert_eq!(normalized_score("The Smiths", "smiths"), 1.0);
    }

    #[test]
    fn test_partial_overlap_ranks_closer_higher() {
        let query = normalize("Radiohead OK Computer");
        let close = score(&query, &normalize("Radiohead - OK Computer OKNOTOK"));
        let far = score(&query, &normalize("Radiohead - Amnesiac"));
        assert!(close > far);
    }
}
