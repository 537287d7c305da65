//! Faculty/author name matching for the OpenAlex reconciliation sync.
//!
//! Local faculty names carry titles ("Dr.", "Prof.", designations) that
//! bibliographic author records never do, and the two sources disagree on
//! token order, middle names, and initials. Matching therefore runs on
//! order-insensitive token sets with an initials fallback.

use std::collections::HashSet;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Title and role prefixes stripped from faculty display names before
/// tokenization. Checked in order; the first matching prefix wins.
const TITLE_PREFIXES: &[&str] = &[
    "assistant professor",
    "associate professor",
    "senior professor",
    "professor",
    "senior advocate",
    "dr.",
    "dr",
    "prof.",
    "prof",
    "dean",
    "hod",
];

/// An external author candidate, in the order the source returned them.
#[derive(Debug, Clone)]
pub struct AuthorCandidate {
    pub id: String,
    pub display_name: String,
}

/// Which structural rule accepted the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Token sets are equal (order-insensitive exact match).
    ExactTokens,
    /// One token set contains the other (missing middle names).
    TokenSubset,
    /// Initials in the candidate expand to faculty tokens.
    Initials,
}

/// A successful reconciliation against one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorMatch {
    pub id: String,
    pub rule: MatchRule,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The faculty name was nothing but titles ("Dr.", "Dean", ...).
    #[error("faculty name empty after stripping title prefixes")]
    NoNameAfterCleaning,
}

/// Strip the first matching title/role prefix from a faculty display name.
///
/// A prefix only applies at a word boundary, so "Deanna Smith" is not
/// truncated by the "dean" prefix.
///
/// # Examples
///
/// ```
/// use podium::data::names::strip_title_prefixes;
///
/// assert_eq!(strip_title_prefixes("Dr. Jane Doe"), "Jane Doe");
/// assert_eq!(strip_title_prefixes("Deanna Smith"), "Deanna Smith");
/// ```
pub fn strip_title_prefixes(name: &str) -> String {
    let trimmed = name.trim();

    for prefix in TITLE_PREFIXES {
        // Prefixes are ASCII, so a byte-length slice is safe to compare
        // case-insensitively without allocating.
        if trimmed.len() < prefix.len() || !trimmed.is_char_boundary(prefix.len()) {
            continue;
        }
        if !trimmed[..prefix.len()].eq_ignore_ascii_case(prefix) {
            continue;
        }

        // Word boundary: the prefix must be followed by whitespace, a
        // period, or nothing at all.
        let rest = &trimmed[prefix.len()..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('.') {
            return rest.trim_start_matches('.').trim().to_string();
        }
    }

    trimmed.to_string()
}

/// Tokenize a name into a comparison set: lower-case, NFD-decompose and
/// drop combining marks (accent folding), strip `.` and `,`, split on
/// whitespace, drop empties.
///
/// # Examples
///
/// ```
/// use podium::data::names::token_set;
///
/// let tokens = token_set("Saldaña, J. García");
/// assert!(tokens.contains("saldana"));
/// assert!(tokens.contains("j"));
/// assert!(tokens.contains("garcia"));
/// ```
pub fn token_set(name: &str) -> HashSet<String> {
    name.split_whitespace()
        .map(|raw| {
            raw.to_lowercase()
                .nfd()
                .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
                .filter(|c| *c != '.' && *c != ',')
                .collect::<String>()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Check the initials rule: every multi-character candidate token must
/// appear verbatim among the faculty tokens, every single-character token
/// must prefix at least one faculty token, and the candidate's longest
/// token must appear verbatim (a match can never rest on initials alone).
fn initials_match(faculty: &HashSet<String>, candidate: &HashSet<String>) -> bool {
    let Some(longest) = candidate.iter().max_by_key(|t| t.chars().count()) else {
        return false;
    };
    if !faculty.contains(longest) {
        return false;
    }

    candidate.iter().all(|token| {
        if token.chars().count() > 1 {
            faculty.contains(token)
        } else {
            faculty.iter().any(|f| f.starts_with(token.as_str()))
        }
    })
}

/// Decide whether one candidate's token set denotes the same person.
fn candidate_rule(faculty: &HashSet<String>, candidate: &HashSet<String>) -> Option<MatchRule> {
    if candidate.is_empty() {
        return None;
    }

    if faculty == candidate {
        return Some(MatchRule::ExactTokens);
    }

    // Subset containment; the overlap-size check is implied by containment
    // but kept explicit to mirror the matching contract.
    let (smaller, larger) = if faculty.len() <= candidate.len() {
        (faculty, candidate)
    } else {
        (candidate, faculty)
    };
    let overlap = smaller.intersection(larger).count();
    if smaller.is_subset(larger) && overlap == smaller.len() {
        return Some(MatchRule::TokenSubset);
    }

    if initials_match(faculty, candidate) {
        return Some(MatchRule::Initials);
    }

    None
}

/// Reconcile a faculty display name against external author candidates.
///
/// Candidates are evaluated in the order supplied and the first one
/// satisfying any rule wins; there is no global best-score ranking. Returns
/// `Ok(None)` when nothing matches, and [`MatchError::NoNameAfterCleaning`]
/// when the faculty name is all titles (the sync skips such records).
pub fn match_author(
    faculty_name: &str,
    candidates: &[AuthorCandidate],
) -> Result<Option<AuthorMatch>, MatchError> {
    let cleaned = strip_title_prefixes(faculty_name);
    if cleaned.is_empty() {
        return Err(MatchError::NoNameAfterCleaning);
    }

    let faculty_tokens = token_set(&cleaned);
    if faculty_tokens.is_empty() {
        return Err(MatchError::NoNameAfterCleaning);
    }

    for candidate in candidates {
        let candidate_tokens = token_set(&candidate.display_name);
        if let Some(rule) = candidate_rule(&faculty_tokens, &candidate_tokens) {
            return Ok(Some(AuthorMatch {
                id: candidate.id.clone(),
                rule,
            }));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str) -> AuthorCandidate {
        AuthorCandidate {
            id: id.to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn strip_dr_prefix() {
        assert_eq!(strip_title_prefixes("Dr. Jane Doe"), "Jane Doe");
    }

    #[test]
    fn strip_prof_prefix() {
        assert_eq!(strip_title_prefixes("Prof. Alan Turing"), "Alan Turing");
    }

    #[test]
    fn strip_multiword_designation() {
        assert_eq!(
            strip_title_prefixes("Assistant Professor Ravi Kumar"),
            "Ravi Kumar"
        );
    }

    #[test]
    fn strip_is_case_insensitive() {
        assert_eq!(strip_title_prefixes("DR. Jane Doe"), "Jane Doe");
    }

    #[test]
    fn strip_requires_word_boundary() {
        // "Deanna" must not lose its "dean" prefix.
        assert_eq!(strip_title_prefixes("Deanna Smith"), "Deanna Smith");
        // "Drake" must not lose "dr".
        assert_eq!(strip_title_prefixes("Drake Wilson"), "Drake Wilson");
    }

    #[test]
    fn strip_title_only_name_becomes_empty() {
        assert_eq!(strip_title_prefixes("Dean"), "");
        assert_eq!(strip_title_prefixes("Dr."), "");
    }

    #[test]
    fn tokens_strip_punctuation_and_case() {
        let tokens = token_set("Doe, Jane M.");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.contains("doe"));
        assert!(tokens.contains("jane"));
        assert!(tokens.contains("m"));
    }

    #[test]
    fn tokens_fold_accents() {
        let tokens = token_set("José García");
        assert!(tokens.contains("jose"));
        assert!(tokens.contains("garcia"));
    }

    #[test]
    fn exact_match_ignores_order() {
        // "Dr. Jane Doe" cleaned to "Jane Doe" vs reordered "Doe Jane"
        let m = match_author("Dr. Jane Doe", &[candidate("A1", "Doe Jane")])
            .unwrap()
            .unwrap();
        assert_eq!(m.id, "A1");
        assert_eq!(m.rule, MatchRule::ExactTokens);
    }

    #[test]
    fn subset_match_tolerates_missing_middle_name() {
        let m = match_author(
            "Anil Vitthalrao Turukmane",
            &[candidate("A2", "Anil Turukmane")],
        )
        .unwrap()
        .unwrap();
        assert_eq!(m.rule, MatchRule::TokenSubset);
    }

    #[test]
    fn subset_match_in_the_other_direction() {
        let m = match_author("Jane Doe", &[candidate("A3", "Jane Marie Doe")])
            .unwrap()
            .unwrap();
        assert_eq!(m.rule, MatchRule::TokenSubset);
    }

    #[test]
    fn partial_overlap_without_containment_is_rejected() {
        let result =
            match_author("Jane Marie Doe", &[candidate("A4", "Jane Elizabeth Doe")]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn initials_expand_to_faculty_tokens() {
        let m = match_author(
            "Anil Vitthalrao Turukmane",
            &[candidate("A5", "A V Turukmane")],
        )
        .unwrap()
        .unwrap();
        assert_eq!(m.rule, MatchRule::Initials);
    }

    #[test]
    fn initials_with_periods() {
        let m = match_author(
            "Anil Vitthalrao Turukmane",
            &[candidate("A6", "A. V. Turukmane")],
        )
        .unwrap()
        .unwrap();
        assert_eq!(m.rule, MatchRule::Initials);
    }

    #[test]
    fn unknown_full_token_rejects_candidate() {
        // "amit" is not a faculty token, so the candidate fails outright.
        let result = match_author(
            "Anil Vitthalrao Turukmane",
            &[candidate("A7", "Amit Turukmane")],
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn initials_alone_never_match() {
        // Longest token "v" is not present verbatim in the faculty set.
        let result = match_author("Anil Vitthalrao Turukmane", &[candidate("A8", "A V")]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn first_satisfying_candidate_wins() {
        let candidates = vec![
            candidate("X1", "Someone Else"),
            candidate("X2", "Jane Doe"),
            candidate("X3", "Doe Jane"),
        ];
        let m = match_author("Dr. Jane Doe", &candidates).unwrap().unwrap();
        // X3 is an equally-exact match but X2 came first.
        assert_eq!(m.id, "X2");
    }

    #[test]
    fn title_only_name_is_a_skip() {
        let err = match_author("Dr.", &[candidate("A9", "Jane Doe")]).unwrap_err();
        assert_eq!(err, MatchError::NoNameAfterCleaning);
    }

    #[test]
    fn no_candidates_is_none() {
        assert_eq!(match_author("Jane Doe", &[]).unwrap(), None);
    }

    #[test]
    fn accented_cross_source_match() {
        let m = match_author("Dr. José García", &[candidate("B1", "Jose Garcia")])
            .unwrap()
            .unwrap();
        assert_eq!(m.rule, MatchRule::ExactTokens);
    }
}
