//! Faculty ranking: plain or Bayesian-shrunk per-category scores.
//!
//! The weighted method pulls each faculty's average toward the global
//! category mean, discounting small samples so a single 5-star rating does
//! not outrank a consistently high average over many raters.

use super::stats::{FacultyStats, RatingCategory};

/// Shrinkage constant: how many "virtual" ratings at the global mean each
/// faculty starts with under the weighted method.
const SHRINKAGE_C: f64 = 10.0;

/// Global prior used when no ratings exist at all in the category.
const GLOBAL_MEAN_FALLBACK: f64 = 3.0;

/// Ranking method selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMethod {
    /// Bayesian-shrunk average; unrated faculty are forced to 0.0.
    #[default]
    Weighted,
    /// Plain average (naturally 0 for unrated faculty).
    Simple,
}

impl RankMethod {
    /// Anything other than "weighted" falls back to the simple average.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("weighted") {
            RankMethod::Weighted
        } else {
            RankMethod::Simple
        }
    }
}

/// One scored faculty, referring back to its position in the input slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRank {
    /// Index into the input slice this score belongs to.
    pub index: usize,
    /// Score rounded to 2 decimal places.
    pub score: f64,
    /// 1-based position after sorting.
    pub rank: i32,
}

/// Rating-count-weighted mean of all averages in the category, or the
/// fallback prior when nobody has rated anyone.
pub fn global_mean(stats: &[FacultyStats], category: RatingCategory) -> f64 {
    let total_ratings: f64 = stats
        .iter()
        .map(|s| {
            let c = s.get(category);
            c.average * f64::from(c.count)
        })
        .sum();
    let total_count: i64 = stats.iter().map(|s| i64::from(s.get(category).count)).sum();

    if total_count > 0 {
        total_ratings / total_count as f64
    } else {
        GLOBAL_MEAN_FALLBACK
    }
}

/// Score and rank a faculty list for one category.
///
/// The sort is stable and descending, so ties keep their input order, and
/// zero-rating faculty under the weighted method (score forced to exactly
/// 0.0) always land at the bottom.
pub fn rank_scores(
    stats: &[FacultyStats],
    category: RatingCategory,
    method: RankMethod,
) -> Vec<ScoredRank> {
    let mean_rating = global_mean(stats, category);

    let mut scored: Vec<ScoredRank> = stats
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let c = s.get(category);
            let n = f64::from(c.count);
            let score = match method {
                RankMethod::Weighted => {
                    if c.count == 0 {
                        0.0
                    } else {
                        (c.average * n + SHRINKAGE_C * mean_rating) / (n + SHRINKAGE_C)
                    }
                }
                RankMethod::Simple => c.average,
            };
            ScoredRank {
                index,
                score: round2(score),
                rank: 0,
            }
        })
        .collect();

    // Stable sort: equal scores keep their relative input order.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    for (position, entry) in scored.iter_mut().enumerate() {
        entry.rank = (position + 1) as i32;
    }

    scored
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::CategoryStats;

    fn with_overall(average: f64, count: i32) -> FacultyStats {
        let mut s = FacultyStats::default();
        s.set(RatingCategory::Overall, CategoryStats { average, count });
        s
    }

    #[test]
    fn global_mean_weights_by_count() {
        let stats = vec![with_overall(5.0, 1), with_overall(3.0, 3)];
        // (5*1 + 3*3) / 4 = 3.5
        assert_eq!(global_mean(&stats, RatingCategory::Overall), 3.5);
    }

    #[test]
    fn global_mean_falls_back_when_unrated() {
        let stats = vec![with_overall(0.0, 0), with_overall(0.0, 0)];
        assert_eq!(global_mean(&stats, RatingCategory::Overall), 3.0);
    }

    #[test]
    fn weighted_shrinks_toward_mean() {
        // A perfect score from a single rater vs a slightly lower average
        // over many raters, with a third faculty dragging the global mean
        // down: shrinkage must favor the well-sampled faculty.
        //
        // mean = (5*1 + 4.5*40 + 2*20) / 61 ~= 3.69
        // n=1:  (5   + 10*mean) / 11 ~= 3.81
        // n=40: (180 + 10*mean) / 50 ~= 4.34
        let stats = vec![
            with_overall(5.0, 1),
            with_overall(4.5, 40),
            with_overall(2.0, 20),
        ];
        let ranked = rank_scores(&stats, RatingCategory::Overall, RankMethod::Weighted);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].index, 0);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[2].index, 2);
    }

    #[test]
    fn unrated_faculty_scores_exactly_zero() {
        let stats = vec![with_overall(0.0, 0), with_overall(1.0, 2)];
        let ranked = rank_scores(&stats, RatingCategory::Overall, RankMethod::Weighted);
        let unrated = ranked.iter().find(|r| r.index == 0).unwrap();
        assert_eq!(unrated.score, 0.0);
        // Any faculty with ratings and a positive average ranks above it.
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn all_unrated_keeps_input_order() {
        let stats = vec![
            with_overall(0.0, 0),
            with_overall(0.0, 0),
            with_overall(0.0, 0),
        ];
        let ranked = rank_scores(&stats, RatingCategory::Overall, RankMethod::Weighted);
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn simple_method_uses_plain_average() {
        let stats = vec![with_overall(2.0, 10), with_overall(4.0, 1)];
        let ranked = rank_scores(&stats, RatingCategory::Overall, RankMethod::Simple);
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[0].score, 4.0);
    }

    #[test]
    fn weighted_formula_value() {
        // Single faculty: mean_rating == its own average, so the shrunk
        // score equals the average exactly.
        let stats = vec![with_overall(4.0, 5)];
        let ranked = rank_scores(&stats, RatingCategory::Overall, RankMethod::Weighted);
        assert_eq!(ranked[0].score, 4.0);
    }

    #[test]
    fn scores_round_to_two_places() {
        let stats = vec![with_overall(3.333333, 3), with_overall(4.0, 1)];
        let ranked = rank_scores(&stats, RatingCategory::Overall, RankMethod::Simple);
        assert_eq!(ranked[1].score, 3.33);
    }

    #[test]
    fn method_parsing() {
        assert_eq!(RankMethod::parse("weighted"), RankMethod::Weighted);
        assert_eq!(RankMethod::parse("simple"), RankMethod::Simple);
        assert_eq!(RankMethod::parse("anything"), RankMethod::Simple);
    }
}
