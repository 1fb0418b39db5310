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

use std::time::Instant;

use serde::Serialize;

use crate::fusion;
use crate::history::HistoryStore;
use crate::logic;
use crate::logic::ParsedQuery;
use crate::matching::Algorithm;
use crate::model::Record;
use crate::model::SearchFilter;
use crate::model::SearchResult;
use crate::scene::SpatialResult;
use crate::scene::SpatialSearch;
use crate::scene::UnsupportedScene;
use crate::store::PersistentStore;

pub const DEFAULT_FIELDS: [&str; 2] = ["title", "description"];
pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub fields: Vec<String>,
    pub algorithms: Vec<Algorithm>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            algorithms: Algorithm::ALL.to_vec(),
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub parsed: ParsedQuery,
    pub filters: Vec<SearchFilter>,
    pub results: Vec<SearchResult>,
    /// Matches before the result limit was applied.
    pub total_hits: usize,
    pub took_ms: i64,
}

pub struct SearchEngine {
    options: SearchOptions,
    spatial: Box<dyn SpatialSearch>,
}

impl SearchEngine {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            spatial: Box::new(UnsupportedScene::default()),
        }
    }

    pub fn with_spatial(mut self, backend: Box<dyn SpatialSearch>) -> Self {
        self.spatial = backend;
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn spatial_mut(&mut self) -> &mut dyn SpatialSearch {
        self.spatial.as_mut()
    }

    /// Spatial search through the configured backend; empty when unsupported.
    pub fn search_in_3d(&self, query: &str, radius: Option<f32>) -> Vec<SpatialResult> {
        if !self.spatial.is_supported() {
            tracing::debug!("spatial search requested without a supporting backend");
        }
        self.spatial.search_in_3d(query, radius)
    }

    pub fn search<R: Record>(&self, query: &str, data: &[R]) -> SearchOutcome {
        let started = Instant::now();
        let (text, filters) = extract_filters(query);
        let parsed = logic::parse(&text);

        let mut outcome = SearchOutcome {
            query: query.trim().to_string(),
            parsed,
            filters,
            results: Vec::new(),
            total_hits: 0,
            took_ms: 0,
        };
        if outcome.parsed.terms.is_empty() {
            return outcome;
        }

        let mut raw = Vec::new();
        for term in &outcome.parsed.terms {
            for field in &self.options.fields {
                for algorithm in &self.options.algorithms {
                    raw.extend(algorithm.run(term, data, field));
                }
            }
        }
        let fused = fusion::fuse(raw);
        let mut results = logic::apply(&outcome.parsed, fused, data);
        if !outcome.filters.is_empty() {
            results.retain(|r| {
                data.get(r.source)
                    .is_some_and(|record| outcome.filters.iter().all(|f| f.matches(record)))
            });
        }

        outcome.total_hits = results.len();
        results.truncate(self.options.limit);
        outcome.results = results;
        outcome.took_ms = started.elapsed().as_millis() as i64;
        tracing::debug!(
            query = %outcome.query,
            terms = outcome.parsed.terms.len(),
            hits = outcome.total_hits,
            "search complete"
        );
        outcome
    }

    /// Runs a search and records the query in `history`.
    pub fn search_and_record<R: Record, S: PersistentStore>(
        &self,
        history: &HistoryStore<S>,
        query: &str,
        data: &[R],
    ) -> SearchOutcome {
        let outcome = self.search(query, data);
        history.add_search(&outcome.query, outcome.total_hits, outcome.filters.clone());
        outcome
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

/// Pulls `category:` and `type:` tokens out of a query.
///
/// Returns the remaining text and the filters in query order; a repeated
/// filter id is kept once.
pub fn extract_filters(query: &str) -> (String, Vec<SearchFilter>) {
    let mut words = Vec::new();
    let mut filters: Vec<SearchFilter> = Vec::new();
    for word in query.split_whitespace() {
        match SearchFilter::parse_token(word) {
            Some(filter) => {
                if !filters.iter().any(|f| f.id == filter.id) {
                    filters.push(filter);
                }
            }
            None => words.push(word),
        }
    }
    (words.join(" "), filters)
}
