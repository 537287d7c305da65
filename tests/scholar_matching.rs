//! End-to-end tests for the reconciliation-to-recommendation pipeline:
//! title stripping, author matching, outcome tallying, and the imported
//! publication titles feeding interest-based recommendations.

use podium::data::names::{AuthorCandidate, MatchError, MatchRule, match_author};
use podium::data::recommend::{FacultyDoc, recommend};
use podium::data::scholar_sync::{SyncOutcome, SyncStats};
use podium::data::stats::{CategoryStats, RatingCategory};

fn candidates(pairs: &[(&str, &str)]) -> Vec<AuthorCandidate> {
    pairs
        .iter()
        .map(|(id, name)| AuthorCandidate {
            id: id.to_string(),
            display_name: name.to_string(),
        })
        .collect()
}

#[test]
fn demo_style_names_match_against_author_search_results() {
    // The directory stores titled names; OpenAlex returns bare ones.
    let cases = [
        ("Dr. Ada Lovelace", "Ada Lovelace", MatchRule::ExactTokens),
        ("Prof. Tim Berners-Lee", "Tim Berners-Lee", MatchRule::ExactTokens),
        (
            "Dr. Anil Vitthalrao Turukmane",
            "A. V. Turukmane",
            MatchRule::Initials,
        ),
        (
            "Prof. Sandra Day O'Connor",
            "Sandra O'Connor",
            MatchRule::TokenSubset,
        ),
    ];

    for (faculty_name, author_name, expected_rule) in cases {
        let m = match_author(faculty_name, &candidates(&[("A1", author_name)]))
            .unwrap()
            .unwrap_or_else(|| panic!("{faculty_name} should match {author_name}"));
        assert_eq!(m.rule, expected_rule, "{faculty_name} vs {author_name}");
    }
}

#[test]
fn candidate_order_is_decisive_not_quality() {
    // A subset match earlier in the list beats an exact match later on:
    // candidates are evaluated in source order, first satisfying wins.
    let list = candidates(&[
        ("partial", "Jane Doe"),
        ("exact", "Jane Marie Doe"),
    ]);
    let m = match_author("Dr. Jane Marie Doe", &list).unwrap().unwrap();
    assert_eq!(m.id, "partial");
    assert_eq!(m.rule, MatchRule::TokenSubset);
}

#[test]
fn title_only_names_are_reported_as_skips() {
    let err = match_author("Assistant Professor", &candidates(&[("A1", "Someone")]));
    assert_eq!(err.unwrap_err(), MatchError::NoNameAfterCleaning);
}

#[test]
fn batch_tally_mirrors_per_faculty_outcomes() {
    // Simulate a sync pass over four faculty with mixed fates.
    let outcomes = vec![
        SyncOutcome::Updated {
            faculty_id: 1,
            author_id: "https://openalex.org/A100".into(),
            works: 12,
        },
        SyncOutcome::SkippedNoMatch { faculty_id: 2 },
        SyncOutcome::SkippedEmptyName { faculty_id: 3 },
        SyncOutcome::Failed { faculty_id: 4 },
    ];

    let stats = SyncStats::tally(&outcomes);
    assert_eq!(
        stats,
        SyncStats {
            total: 4,
            updated: 1,
            skipped_empty_name: 1,
            skipped_no_match: 1,
            failed: 1,
        }
    );
}

#[test]
fn imported_titles_surface_in_recommendations() {
    // Faculty A has no interest text but an imported publication matching
    // the user's keyword; faculty B has neither.
    let mut matched = FacultyDoc::default();
    matched.work_titles = vec!["Deep Reinforcement Learning for Robotics".into()];

    let unmatched = FacultyDoc::default();

    let recs = recommend(&[], &["robotics".to_string()], &[unmatched, matched]);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].index, 1);
    assert_eq!(recs[0].score, 85.0);
    let reason = recs[0].reason.as_deref().unwrap();
    assert!(reason.contains("Deep Reinforcement Learning for Robotics"));
}

#[test]
fn rating_compatibility_outranks_interest_matches() {
    // One faculty matches the user's preferred category with a strong
    // average (4.8 * 20 = 96), another only matches by publication title
    // (fixed 85): the rated one must sort first.
    let mut rated = FacultyDoc::default();
    rated.stats.set(
        RatingCategory::Teaching,
        CategoryStats {
            average: 4.8,
            count: 12,
        },
    );

    let mut published = FacultyDoc::default();
    published.work_titles = vec!["Compilers for Quantum Hardware".into()];

    let recs = recommend(
        &["teaching".to_string()],
        &["quantum".to_string()],
        &[published, rated],
    );

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].index, 1);
    assert_eq!(recs[0].compatibility_percentage, Some(96.0));
    assert_eq!(recs[1].index, 0);
    assert_eq!(recs[1].score, 85.0);
    assert_eq!(recs[1].compatibility_percentage, Some(85.0));
}
