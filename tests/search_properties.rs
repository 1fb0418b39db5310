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

use std::collections::HashSet;

use serde_json::Value;
use serde_json::json;
use unisearch::engine::SearchEngine;
use unisearch::engine::SearchOptions;
use unisearch::fusion::fuse;
use unisearch::history::HistoryStore;
use unisearch::history::MAX_HISTORY;
use unisearch::matching;
use unisearch::matching::Algorithm;
use unisearch::model::SearchResult;
use unisearch::store::MemoryStore;
use unisearch::suggest::SuggestionEngine;

fn engine(fields: &[&str], algorithms: &[Algorithm]) -> SearchEngine {
    SearchEngine::new(SearchOptions {
        fields: fields.iter().map(|f| f.to_string()).collect(),
        algorithms: algorithms.to_vec(),
        limit: 50,
    })
}

fn ids(results: &[SearchResult]) -> HashSet<String> {
    results.iter().map(|r| r.id.clone()).collect()
}

fn colour_data() -> Vec<Value> {
    vec![
        json!({ "id": 1, "text": "red car" }),
        json!({ "id": 2, "text": "red" }),
        json!({ "id": 3, "text": "car" }),
    ]
}

#[test]
fn contains_scenario_keeps_data_order() {
    let data = vec![
        json!({ "title": "Professional AC Unit" }),
        json!({ "title": "AC System" }),
        json!({ "title": "Premium AC Unit" }),
        json!({ "title": "Portable Fan" }),
    ];
    let outcome = engine(&["title"], &[Algorithm::Contains]).search("AC", &data);

    let titles: Vec<&str> = outcome.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Professional AC Unit", "AC System", "Premium AC Unit"]
    );
    assert!(outcome.results.iter().all(|r| r.relevance_score == 0.8));
    assert_eq!(outcome.total_hits, 3);
}

#[test]
fn fuzzy_admits_distance_up_to_threshold() {
    let data = vec![
        json!({ "title": "chart" }),
        json!({ "title": "chair" }),
        json!({ "title": "charity" }),
        json!({ "title": "church" }),
    ];
    assert_eq!(matching::fuzzy_threshold(5), 2);

    let results = matching::fuzzy("chart", &data, "title");
    let sources: Vec<usize> = results.iter().map(|r| r.source).collect();
    assert_eq!(sources, vec![0, 1, 2]);
    assert_eq!(results[0].relevance_score, 1.0);
    assert!((results[1].relevance_score - 0.6).abs() < 1e-6);
}

#[test]
fn fusing_a_set_with_itself_changes_nothing() {
    let data = vec![
        json!({ "id": "a", "title": "AC Unit" }),
        json!({ "id": "b", "title": "AC System" }),
    ];
    let once = matching::contains("ac", &data, "title");
    let mut doubled = once.clone();
    doubled.extend(once.clone());

    assert_eq!(fuse(doubled), fuse(once));
}

#[test]
fn fusion_keeps_the_highest_score() {
    let record = json!({ "id": "x", "title": "AC Unit" });
    let low = SearchResult::from_record(&record, 0, Algorithm::Fuzzy, 0.6);
    let high = SearchResult::from_record(&record, 0, Algorithm::Semantic, 0.9);

    let fused = fuse(vec![low, high]);
    assert_eq!(fused.len(), 1);
    assert!((fused[0].relevance_score - 0.9).abs() < 1e-6);
    assert_eq!(fused[0].algorithm, Algorithm::Semantic);
}

#[test]
fn history_is_bounded_to_the_newest_entries() {
    let history = HistoryStore::open(MemoryStore::new());
    for i in 0..60 {
        history.add_search(&format!("query {i}"), i, Vec::new());
    }

    let entries = history.get_history();
    assert_eq!(entries.len(), MAX_HISTORY);
    assert_eq!(entries[0].query, "query 59");
    assert_eq!(entries[MAX_HISTORY - 1].query, "query 10");
    assert!(!entries.iter().any(|e| e.query == "query 9"));
}

#[test]
fn repeated_query_moves_to_front() {
    let history = HistoryStore::open(MemoryStore::new());
    history.add_search("ac unit", 3, Vec::new());
    history.add_search("fan", 1, Vec::new());
    history.add_search("ac unit", 7, Vec::new());

    let entries = history.get_history();
    let matching: Vec<_> = entries.iter().filter(|e| e.query == "ac unit").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(entries[0].query, "ac unit");
    assert_eq!(entries[0].results_count, 7);
}

#[test]
fn and_keeps_records_matching_both_terms() {
    let data = colour_data();
    let outcome = engine(&["text"], &Algorithm::ALL).search("red AND car", &data);
    assert_eq!(ids(&outcome.results), HashSet::from(["1".to_string()]));
}

#[test]
fn xor_keeps_records_matching_one_term() {
    let data = colour_data();
    let outcome = engine(&["text"], &Algorithm::ALL).search("red XOR car", &data);
    assert_eq!(
        ids(&outcome.results),
        HashSet::from(["2".to_string(), "3".to_string()])
    );
}

#[test]
fn operators_chain_left_to_right() {
    let data = colour_data();
    // (red OR car) AND car; grouping AND first would also admit id 2.
    let outcome = engine(&["text"], &Algorithm::ALL).search("red OR car AND car", &data);
    assert_eq!(
        ids(&outcome.results),
        HashSet::from(["1".to_string(), "3".to_string()])
    );
}

#[test]
fn leading_and_adjacent_operators_pair_with_the_right_terms() {
    let data = vec![
        json!({ "id": 1, "text": "red car" }),
        json!({ "id": 2, "text": "blue car" }),
        json!({ "id": 3, "text": "red bike" }),
    ];
    let engine = engine(&["text"], &Algorithm::ALL);

    let outcome = engine.search("NOT red AND car", &data);
    assert_eq!(ids(&outcome.results), HashSet::from(["2".to_string()]));

    let outcome = engine.search("red AND NOT bike", &data);
    assert_eq!(ids(&outcome.results), HashSet::from(["1".to_string()]));

    let outcome = engine.search("red OR OR bike", &data);
    assert_eq!(outcome.parsed.operators.len(), 1);
    assert_eq!(
        ids(&outcome.results),
        HashSet::from(["1".to_string(), "3".to_string()])
    );
}

#[test]
fn suggestions_never_exceed_the_limit() {
    let data: Vec<Value> = ["chairs", "charts", "chimneys", "chips", "church"]
        .iter()
        .enumerate()
        .map(|(i, cat)| json!({ "id": i, "title": format!("Chrome {cat}"), "category": cat }))
        .collect();
    let history = HistoryStore::open(MemoryStore::new());
    for query in ["chair", "chart", "cheap", "chess"] {
        history.add_search(query, 1, Vec::new());
    }

    let engine = SuggestionEngine::new(&history, &data);
    for limit in [0, 1, 3, 5] {
        assert!(engine.get_suggestions("ch", limit).len() <= limit);
    }
    assert_eq!(engine.get_suggestions("ch", 5).len(), 5);
}

#[test]
fn search_and_record_feeds_history() {
    let data = colour_data();
    let history = HistoryStore::open(MemoryStore::new());
    let engine = engine(&["text"], &Algorithm::ALL);

    engine.search_and_record(&history, "  red  ", &data);
    engine.search_and_record(&history, "   ", &data);

    let entries = history.get_history();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].query, "red");
    assert_eq!(entries[0].results_count, 2);
}
