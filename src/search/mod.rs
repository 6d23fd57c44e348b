// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ranking of resolved values against a search query.
//!
//! Key and value are matched separately and case-insensitively. A candidate is kept when the
//! query is a subsequence of either field; its score is the better of the two field scores.

use crate::model::ResolvedValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub value: ResolvedValue,
    pub score: i64,
    /// Matched character indices in the key.
    pub key_matches: Vec<usize>,
    /// Matched character indices in the value.
    pub value_matches: Vec<usize>,
}

impl SearchResult {
    fn unranked(value: ResolvedValue) -> Self {
        Self { value, score: 0, key_matches: Vec::new(), value_matches: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubsequenceStats {
    first: usize,
    span: usize,
    consecutive: usize,
    start_boundary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldMatch {
    score: i64,
    positions: Vec<usize>,
}

/// Ranks `candidates` by descending score, ties broken by ascending key.
///
/// A blank query keeps every candidate in key order with score 0.
pub fn rank<'a>(
    candidates: impl IntoIterator<Item = &'a ResolvedValue>,
    query: &str,
) -> Vec<SearchResult> {
    let needle = fold(query.trim());
    if needle.is_empty() {
        let mut out: Vec<SearchResult> =
            candidates.into_iter().cloned().map(SearchResult::unranked).collect();
        out.sort_by(|a, b| a.value.key.cmp(&b.value.key));
        return out;
    }

    let mut out = Vec::new();
    for candidate in candidates {
        let key_match = match_field(&needle, &fold(candidate.key.as_str()));
        let value_match = match_field(&needle, &fold(&candidate.value));
        let score = match (&key_match, &value_match) {
            (None, None) => continue,
            (Some(k), None) => k.score,
            (None, Some(v)) => v.score,
            (Some(k), Some(v)) => k.score.max(v.score),
        };
        out.push(SearchResult {
            value: candidate.clone(),
            score,
            key_matches: key_match.map(|m| m.positions).unwrap_or_default(),
            value_matches: value_match.map(|m| m.positions).unwrap_or_default(),
        });
    }

    out.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.value.key.cmp(&b.value.key)));
    out
}

/// One lowercase char per input char so indices line up with the original text.
fn fold(text: &str) -> Vec<char> {
    text.chars().map(|ch| ch.to_lowercase().next().unwrap_or(ch)).collect()
}

fn match_field(needle: &[char], haystack: &[char]) -> Option<FieldMatch> {
    let score = fuzzy_score(needle, haystack)?;
    let positions = match substring_start(needle, haystack) {
        Some(start) => (start..start + needle.len()).collect(),
        None => subsequence_positions(needle, haystack),
    };
    Some(FieldMatch { score, positions })
}

fn fuzzy_score(needle: &[char], haystack: &[char]) -> Option<i64> {
    let subseq = subsequence_stats(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.iter().copied(), haystack.iter().copied());
    let ratio_score = (ratio * 1000.0).round() as i64;

    let mut score = ratio_score;
    score -= subseq.span as i64;
    score -= (subseq.first as i64) / 4;
    score += (subseq.consecutive as i64) * 40;
    if subseq.start_boundary {
        score += 150;
    }
    if substring_start(needle, haystack).is_some() {
        score += 2000;
    } else {
        score += 500;
    }
    if needle == haystack {
        score += 1000;
    }

    Some(score)
}

fn substring_start(needle: &[char], haystack: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn subsequence_positions(needle: &[char], haystack: &[char]) -> Vec<usize> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut want = needle.iter().peekable();
    for (idx, ch) in haystack.iter().enumerate() {
        match want.peek() {
            Some(&&next) if next == *ch => {
                positions.push(idx);
                want.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    positions
}

fn subsequence_stats(needle: &[char], haystack: &[char]) -> Option<SubsequenceStats> {
    let mut needle_iter = needle.iter().copied().peekable();
    let mut first: Option<usize> = None;
    let mut last: usize = 0;
    let mut prev_match: Option<usize> = None;
    let mut consecutive: usize = 0;
    let mut start_boundary = false;
    let mut prev_hay: Option<char> = None;

    for (idx, &ch) in haystack.iter().enumerate() {
        let Some(&want) = needle_iter.peek() else {
            break;
        };

        if ch == want {
            needle_iter.next();

            if first.is_none() {
                first = Some(idx);
                start_boundary = prev_hay.map_or(true, is_boundary_char);
            }

            if let Some(prev) = prev_match {
                if idx == prev + 1 {
                    consecutive += 1;
                }
            }
            prev_match = Some(idx);
            last = idx;
        }

        prev_hay = Some(ch);
    }

    if needle_iter.peek().is_some() {
        return None;
    }

    let first = first?;
    Some(SubsequenceStats {
        first,
        span: last.saturating_sub(first).saturating_add(1),
        consecutive,
        start_boundary,
    })
}

fn is_boundary_char(ch: char) -> bool {
    matches!(ch, '/' | ':' | '-' | '_' | ' ' | '.' | '=')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{fold, rank, subsequence_positions};
    use crate::model::{Key, ResolvedValue};
    use crate::path::Scope;

    fn value(key: &str, value: &str) -> ResolvedValue {
        ResolvedValue {
            key: Key::new(key).unwrap(),
            value: value.to_owned(),
            description: None,
            defined_at: Scope::from_canonical("/test"),
            overrides: None,
        }
    }

    fn keys(results: &[super::SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.value.key.as_str()).collect()
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_query_is_identity_in_key_order(#[case] query: &str) {
        let values = [value("ZEBRA", "last"), value("ALPHA", "first"), value("MIDDLE", "middle")];
        let results = rank(&values, query);
        assert_eq!(keys(&results), vec!["ALPHA", "MIDDLE", "ZEBRA"]);
        assert!(results.iter().all(|r| r.score == 0 && r.key_matches.is_empty()));
    }

    #[test]
    fn query_matches_key_case_insensitively() {
        let values =
            [value("API_KEY", "secret"), value("DATABASE_URL", "postgres://"), value("DEBUG", "true")];
        let results = rank(&values, "api");
        assert_eq!(keys(&results), vec!["API_KEY"]);
        assert_eq!(results[0].key_matches, vec![0, 1, 2]);
        assert!(results[0].value_matches.is_empty());
    }

    #[test]
    fn query_matches_value_alone() {
        let values = [value("DATABASE_URL", "postgres://localhost"), value("DEBUG", "true")];
        let results = rank(&values, "postgres");
        assert_eq!(keys(&results), vec!["DATABASE_URL"]);
        assert!(results[0].key_matches.is_empty());
        assert_eq!(results[0].value_matches, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn subsequence_matches_report_char_positions() {
        let results = rank(&[value("DATABASE_URL", "x")], "dburl");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key_matches, vec![0, 4, 9, 10, 11]);
    }

    #[test]
    fn non_matching_candidates_are_dropped() {
        assert!(rank(&[value("HOME", "/root")], "zzz").is_empty());
    }

    #[test]
    fn tighter_match_ranks_first() {
        let values = [value("PORT_NUMBER_OF_RETRIES", "1"), value("PORT", "8080")];
        let results = rank(&values, "port");
        assert_eq!(keys(&results), vec!["PORT", "PORT_NUMBER_OF_RETRIES"]);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn equal_scores_tie_break_by_key() {
        let values = [value("B_X", "v"), value("A_X", "v")];
        let results = rank(&values, "x");
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(keys(&results), vec!["A_X", "B_X"]);
    }

    #[test]
    fn folding_keeps_indices_aligned() {
        let hay = fold("ÄBC");
        assert_eq!(hay.len(), 3);
        assert_eq!(subsequence_positions(&fold("bc"), &hay), vec![1, 2]);
    }
}
