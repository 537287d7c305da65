//! Personalized faculty recommendations.
//!
//! Two independent signals per faculty: compatibility with the user's
//! preferred rating categories, and keyword matches between the user's
//! stated interests and the faculty's research-interest text plus imported
//! publication titles. Rating compatibility always wins when the user
//! supplied both.

use super::stats::{FacultyStats, RatingCategory};

/// Sort-only score assigned to pure interest matches.
const INTEREST_MATCH_SCORE: f64 = 85.0;

/// Maps the 1-5 rating scale onto 0-100.
const RATING_SCALE: f64 = 20.0;

/// Recommendations are truncated to this many entries.
const MAX_RECOMMENDATIONS: usize = 10;

/// Everything the engine reads about one faculty record.
#[derive(Debug, Clone, Default)]
pub struct FacultyDoc {
    pub stats: FacultyStats,
    pub research_interests: Option<String>,
    /// Publication titles imported by the scholar sync.
    pub work_titles: Vec<String>,
}

/// One recommendation, referring back to its position in the input slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub index: usize,
    /// Sort key (rating compatibility on the 0-100 scale, or the fixed
    /// interest-match score).
    pub score: f64,
    /// Shown to the user, rounded to 1 decimal place. Absent for
    /// interest-only matches by users with no rating preferences.
    pub compatibility_percentage: Option<f64>,
    /// Human-readable explanation of an interest match.
    pub reason: Option<String>,
}

/// A matched interest keyword and where it was found.
#[derive(Debug, Clone, PartialEq)]
struct InterestHit {
    keyword: String,
    reason: String,
}

/// Rating compatibility on the 0-100 scale.
///
/// Mean of the user's matched preference-category averages, scaled by 20;
/// falls back to the overall average when no preferred category has
/// ratings; 0.0 means no rating signal at all.
fn rating_compatibility(preferences: &[String], stats: &FacultyStats) -> f64 {
    let mut sum = 0.0;
    let mut matched = 0u32;

    for pref in preferences {
        let Some(category) = RatingCategory::parse(pref) else {
            continue;
        };
        let average = stats.get(category).average;
        if average > 0.0 {
            sum += average;
            matched += 1;
        }
    }

    if matched > 0 {
        (sum / f64::from(matched)) * RATING_SCALE
    } else if stats.overall.average > 0.0 {
        stats.overall.average * RATING_SCALE
    } else {
        0.0
    }
}

/// First user keyword found in the faculty's interest corpus, with a reason
/// that cites the specific publication title when the keyword appears
/// there, else the research-interest text.
fn find_interest_match(ai_interests: &[String], doc: &FacultyDoc) -> Option<InterestHit> {
    let interests_text = doc.research_interests.as_deref().unwrap_or("");
    let interests_lower = interests_text.to_lowercase();

    for keyword in ai_interests {
        let kw = keyword.trim().to_lowercase();
        if kw.is_empty() {
            continue;
        }

        if let Some(title) = doc
            .work_titles
            .iter()
            .find(|t| t.to_lowercase().contains(&kw))
        {
            return Some(InterestHit {
                keyword: keyword.trim().to_string(),
                reason: format!(
                    "Matches your interest \"{}\" in the publication \"{}\"",
                    keyword.trim(),
                    title
                ),
            });
        }

        if interests_lower.contains(&kw) {
            return Some(InterestHit {
                keyword: keyword.trim().to_string(),
                reason: format!(
                    "Matches your interest \"{}\" in research interests: {}",
                    keyword.trim(),
                    interests_text
                ),
            });
        }
    }

    None
}

/// Rank faculty for one user.
///
/// Returns at most [`MAX_RECOMMENDATIONS`] entries, sorted descending by
/// score with stable tie order. Users with neither preferences nor
/// interests get nothing; admin exclusion is the caller's concern.
pub fn recommend(
    preferences: &[String],
    ai_interests: &[String],
    faculty: &[FacultyDoc],
) -> Vec<Recommendation> {
    let has_preferences = !preferences.is_empty();
    let has_interests = !ai_interests.is_empty();

    // No stated interest of any kind, no recommendations.
    if !has_preferences && !has_interests {
        return Vec::new();
    }

    let mut results: Vec<Recommendation> = Vec::new();

    for (index, doc) in faculty.iter().enumerate() {
        let rating_score = if has_preferences {
            rating_compatibility(preferences, &doc.stats)
        } else {
            0.0
        };
        let interest = if has_interests {
            find_interest_match(ai_interests, doc)
        } else {
            None
        };

        let entry = match (has_preferences, has_interests) {
            (false, true) => interest.map(|hit| Recommendation {
                index,
                score: INTEREST_MATCH_SCORE,
                compatibility_percentage: None,
                reason: Some(hit.reason),
            }),
            (true, false) => (rating_score > 0.0).then(|| Recommendation {
                index,
                score: rating_score,
                compatibility_percentage: Some(round1(rating_score)),
                reason: None,
            }),
            (true, true) => {
                if rating_score > 0.0 {
                    // Ratings take priority; the interest match is ignored.
                    Some(Recommendation {
                        index,
                        score: rating_score,
                        compatibility_percentage: Some(round1(rating_score)),
                        reason: None,
                    })
                } else {
                    interest.map(|hit| Recommendation {
                        index,
                        score: INTEREST_MATCH_SCORE,
                        compatibility_percentage: Some(INTEREST_MATCH_SCORE),
                        reason: Some(hit.reason),
                    })
                }
            }
            (false, false) => unreachable!("gated above"),
        };

        if let Some(entry) = entry {
            results.push(entry);
        }
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(MAX_RECOMMENDATIONS);
    results
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::CategoryStats;

    fn prefs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn doc_with(category: RatingCategory, average: f64, count: i32) -> FacultyDoc {
        let mut doc = FacultyDoc::default();
        doc.stats.set(category, CategoryStats { average, count });
        doc
    }

    #[test]
    fn gated_when_user_states_nothing() {
        let faculty = vec![doc_with(RatingCategory::Overall, 5.0, 3)];
        assert!(recommend(&[], &[], &faculty).is_empty());
    }

    #[test]
    fn preference_match_scales_to_percentage() {
        let faculty = vec![doc_with(RatingCategory::Teaching, 4.0, 2)];
        let recs = recommend(&prefs(&["teaching"]), &[], &faculty);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].compatibility_percentage, Some(80.0));
        assert!(recs[0].reason.is_none());
    }

    #[test]
    fn rating_beats_interest_when_both_match() {
        // Spec exclusivity property: teaching=4.0 plus a "robotics" interest
        // match yields 80.0, not 85.
        let mut doc = doc_with(RatingCategory::Teaching, 4.0, 2);
        doc.research_interests = Some("Robotics and control systems".into());
        let recs = recommend(&prefs(&["teaching"]), &prefs(&["robotics"]), &[doc]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].compatibility_percentage, Some(80.0));
        assert!(recs[0].reason.is_none());
    }

    #[test]
    fn interest_fallback_when_no_rating_signal() {
        let mut doc = FacultyDoc::default();
        doc.research_interests = Some("Distributed systems".into());
        let recs = recommend(&prefs(&["teaching"]), &prefs(&["distributed"]), &[doc]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].score, 85.0);
        assert_eq!(recs[0].compatibility_percentage, Some(85.0));
        assert!(recs[0].reason.is_some());
    }

    #[test]
    fn interest_only_user_gets_no_percentage() {
        let mut doc = FacultyDoc::default();
        doc.research_interests = Some("Natural language processing".into());
        let recs = recommend(&[], &prefs(&["language"]), &[doc]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].score, 85.0);
        assert_eq!(recs[0].compatibility_percentage, None);
        assert!(recs[0].reason.is_some());
    }

    #[test]
    fn interest_only_user_without_match_is_excluded() {
        let mut doc = FacultyDoc::default();
        doc.research_interests = Some("Databases".into());
        let recs = recommend(&[], &prefs(&["astrophysics"]), &[doc]);
        assert!(recs.is_empty());
    }

    #[test]
    fn neither_signal_excludes_faculty() {
        let doc = FacultyDoc::default();
        let recs = recommend(&prefs(&["teaching"]), &prefs(&["robotics"]), &[doc]);
        assert!(recs.is_empty());
    }

    #[test]
    fn overall_fallback_covers_unrated_preference() {
        // User prefers teaching, which has no ratings, but overall does.
        let doc = doc_with(RatingCategory::Overall, 4.5, 4);
        let recs = recommend(&prefs(&["teaching"]), &[], &[doc]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].compatibility_percentage, Some(90.0));
    }

    #[test]
    fn reason_prefers_publication_title() {
        let mut doc = FacultyDoc::default();
        doc.research_interests = Some("Robotics".into());
        doc.work_titles = vec!["Swarm Robotics for Disaster Response".into()];
        let recs = recommend(&[], &prefs(&["robotics"]), &[doc]);
        let reason = recs[0].reason.as_deref().unwrap();
        assert!(reason.contains("Swarm Robotics for Disaster Response"));
    }

    #[test]
    fn reason_cites_research_interests_without_title_hit() {
        let mut doc = FacultyDoc::default();
        doc.research_interests = Some("Applied robotics".into());
        doc.work_titles = vec!["Graph Algorithms".into()];
        let recs = recommend(&[], &prefs(&["robotics"]), &[doc]);
        let reason = recs[0].reason.as_deref().unwrap();
        assert!(reason.contains("research interests"));
    }

    #[test]
    fn multiple_preferences_average_before_scaling() {
        let mut doc = doc_with(RatingCategory::Teaching, 4.0, 1);
        doc.stats.set(
            RatingCategory::Attendance,
            CategoryStats {
                average: 2.0,
                count: 1,
            },
        );
        let recs = recommend(&prefs(&["teaching", "attendance"]), &[], &[doc]);
        // (4.0 + 2.0) / 2 * 20 = 60
        assert_eq!(recs[0].compatibility_percentage, Some(60.0));
    }

    #[test]
    fn sorted_descending_and_truncated() {
        let mut faculty = Vec::new();
        for i in 1..=12 {
            faculty.push(doc_with(
                RatingCategory::Teaching,
                1.0 + (f64::from(i) / 4.0),
                2,
            ));
        }
        let recs = recommend(&prefs(&["teaching"]), &[], &faculty);
        assert_eq!(recs.len(), 10);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        // The two weakest faculty fell off the end.
        assert!(recs.iter().all(|r| r.index >= 2));
    }

    #[test]
    fn unknown_preference_categories_are_ignored() {
        let doc = doc_with(RatingCategory::Teaching, 4.0, 1);
        let recs = recommend(&prefs(&["charisma", "teaching"]), &[], &[doc]);
        assert_eq!(recs[0].compatibility_percentage, Some(80.0));
    }
}
