// Copyright 2026 Unisearch Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::Record;
use crate::model::SearchResult;

const EXACT_SCORE: f32 = 1.0;
const STARTS_WITH_SCORE: f32 = 0.9;
const CONTAINS_SCORE: f32 = 0.8;
const FUZZY_MIN_SCORE: f32 = 0.1;
const SEMANTIC_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    Exact,
    StartsWith,
    Contains,
    Fuzzy,
    Semantic,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Exact,
        Algorithm::StartsWith,
        Algorithm::Contains,
        Algorithm::Fuzzy,
        Algorithm::Semantic,
    ];

    pub fn as_label(self) -> &'static str {
        match self {
            Algorithm::Exact => "exact",
            Algorithm::StartsWith => "startsWith",
            Algorithm::Contains => "contains",
            Algorithm::Fuzzy => "fuzzy",
            Algorithm::Semantic => "semantic",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().replace(['-', '_'], "").as_str() {
            "exact" => Some(Algorithm::Exact),
            "startswith" | "prefix" => Some(Algorithm::StartsWith),
            "contains" => Some(Algorithm::Contains),
            "fuzzy" => Some(Algorithm::Fuzzy),
            "semantic" => Some(Algorithm::Semantic),
            _ => None,
        }
    }

    /// Declared preference used as a hint by callers; never applied to scores.
    pub fn weight(self) -> f32 {
        match self {
            Algorithm::Exact => 1.0,
            Algorithm::StartsWith => 0.9,
            Algorithm::Contains => 0.8,
            Algorithm::Fuzzy => 0.7,
            Algorithm::Semantic => 0.6,
        }
    }

    pub fn run<R: Record>(self, query: &str, data: &[R], field: &str) -> Vec<SearchResult> {
        match self {
            Algorithm::Exact => exact(query, data, field),
            Algorithm::StartsWith => starts_with(query, data, field),
            Algorithm::Contains => contains(query, data, field),
            Algorithm::Fuzzy => fuzzy(query, data, field),
            Algorithm::Semantic => semantic(query, data, field),
        }
    }
}

fn field_lower<R: Record>(record: &R, field: &str) -> String {
    record
        .field(field)
        .map(|v| v.to_lowercase())
        .unwrap_or_default()
}

fn fixed_score<R: Record>(
    algorithm: Algorithm,
    data: &[R],
    field: &str,
    score: f32,
    keep: impl Fn(&str) -> bool,
) -> Vec<SearchResult> {
    data.iter()
        .enumerate()
        .filter(|(_, record)| keep(&field_lower(*record, field)))
        .map(|(idx, record)| SearchResult::from_record(record, idx, algorithm, score))
        .collect()
}

pub fn exact<R: Record>(query: &str, data: &[R], field: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    fixed_score(Algorithm::Exact, data, field, EXACT_SCORE, |v| v == q)
}

pub fn starts_with<R: Record>(query: &str, data: &[R], field: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    fixed_score(Algorithm::StartsWith, data, field, STARTS_WITH_SCORE, |v| {
        v.starts_with(&q)
    })
}

pub fn contains<R: Record>(query: &str, data: &[R], field: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    fixed_score(Algorithm::Contains, data, field, CONTAINS_SCORE, |v| {
        v.contains(&q)
    })
}

/// Largest edit distance the fuzzy matcher accepts for a query of `len` chars.
pub fn fuzzy_threshold(len: usize) -> usize {
    (len / 3).max(2)
}

pub fn fuzzy<R: Record>(query: &str, data: &[R], field: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    let len = q.chars().count();
    let threshold = fuzzy_threshold(len);

    let mut scored: Vec<(usize, SearchResult)> = data
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let distance = levenshtein(&field_lower(record, field), &q);
            if distance > threshold {
                return None;
            }
            let score = (1.0 - distance as f32 / len.max(1) as f32).max(FUZZY_MIN_SCORE);
            Some((
                distance,
                SearchResult::from_record(record, idx, Algorithm::Fuzzy, score),
            ))
        })
        .collect();

    scored.sort_by_key(|(distance, _)| *distance);
    scored.into_iter().map(|(_, result)| result).collect()
}

/// Token-overlap score: the share of query tokens that match at least one
/// field token, so a query token counts once however many field tokens it
/// hits and the score never exceeds 1.
pub fn semantic<R: Record>(query: &str, data: &[R], field: &str) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    let query_tokens: Vec<&str> = q.split_whitespace().collect();
    if query_tokens.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = data
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let value = field_lower(record, field);
            let field_tokens: Vec<&str> = value.split_whitespace().collect();
            let matched = query_tokens
                .iter()
                .filter(|qt| {
                    field_tokens
                        .iter()
                        .any(|ft| ft.contains(*qt) || qt.contains(ft))
                })
                .count();
            let score = matched as f32 / query_tokens.len() as f32;
            (score > SEMANTIC_THRESHOLD)
                .then(|| SearchResult::from_record(record, idx, Algorithm::Semantic, score))
        })
        .collect();

    results.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    results
}

/// Levenshtein edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use serde_json::json;

    use super::*;

    fn titles(items: &[&str]) -> Vec<Value> {
        items.iter().map(|t| json!({ "title": t })).collect()
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("chart", "chart"), 0);
        assert_eq!(levenshtein("chart", "cart"), 1);
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn exact_is_case_insensitive() {
        let data = titles(&["AC Unit", "ac unit extra", "Fan"]);
        let results = exact("ac UNIT", &data, "title");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, 0);
        assert_eq!(results[0].relevance_score, 1.0);
    }

    #[test]
    fn starts_with_and_contains_scores() {
        let data = titles(&["AC System", "Premium AC Unit", "Fan"]);
        let prefix = starts_with("ac", &data, "title");
        assert_eq!(prefix.len(), 1);
        assert_eq!(prefix[0].relevance_score, 0.9);

        let inner = contains("ac", &data, "title");
        assert_eq!(inner.len(), 2);
        assert!(inner.iter().all(|r| r.relevance_score == 0.8));
    }

    #[test]
    fn fuzzy_threshold_for_short_and_long_queries() {
        assert_eq!(fuzzy_threshold(0), 2);
        assert_eq!(fuzzy_threshold(5), 2);
        assert_eq!(fuzzy_threshold(9), 3);
        assert_eq!(fuzzy_threshold(12), 4);
    }

    #[test]
    fn fuzzy_admits_distance_two_for_chart() {
        // distances to "chart": 0, 1, 2, 3
        let data = titles(&["charts", "chart", "chxrtz", "cxxrtz"]);
        let results = fuzzy("chart", &data, "title");
        let sources: Vec<usize> = results.iter().map(|r| r.source).collect();
        assert_eq!(sources, vec![1, 0, 2]);
        assert_eq!(results[0].relevance_score, 1.0);
        assert!((results[1].relevance_score - 0.8).abs() < 1e-6);
        assert!((results[2].relevance_score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn fuzzy_score_has_floor() {
        let data = titles(&["xy"]);
        let results = fuzzy("ab", &data, "title");
        assert_eq!(results.len(), 1);
        assert!((results[0].relevance_score - 0.1).abs() < 1e-6);
    }

    #[test]
    fn semantic_word_overlap() {
        let data = titles(&[
            "portable cooling fan",
            "fan",
            "heater",
            "premium cooling unit",
        ]);
        let results = semantic("portable fan", &data, "title");
        let sources: Vec<usize> = results.iter().map(|r| r.source).collect();
        assert_eq!(sources, vec![0, 1]);
        assert_eq!(results[0].relevance_score, 1.0);
        assert_eq!(results[1].relevance_score, 0.5);
    }

    #[test]
    fn semantic_threshold_is_exclusive() {
        let data = titles(&["alpha"]);
        // one of four tokens matches: 0.25
        assert!(semantic("alpha b c d", &data, "title").is_empty());
        // one of three: 0.33
        assert_eq!(semantic("alpha b c", &data, "title").len(), 1);
    }

    #[test]
    fn missing_field_is_empty_string() {
        let data = vec![json!({ "id": "x" })];
        assert!(contains("a", &data, "title").is_empty());
        assert!(semantic("a", &data, "title").is_empty());
        let fuzzy_hits = fuzzy("ab", &data, "title");
        assert_eq!(fuzzy_hits.len(), 1);
        assert_eq!(fuzzy_hits[0].id, "x");
    }

    #[test]
    fn algorithm_labels_round_trip() {
        for algo in Algorithm::ALL {
            assert_eq!(Algorithm::parse(algo.as_label()), Some(algo));
        }
        assert_eq!(Algorithm::parse("starts-with"), Some(Algorithm::StartsWith));
        assert_eq!(Algorithm::parse("bogus"), None);
    }
}
