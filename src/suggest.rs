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

use serde_json::json;

use crate::history::HistoryStore;
use crate::logic::LogicOperator;
use crate::model::FilterFacet;
use crate::model::Record;
use crate::model::SearchSuggestion;
use crate::model::SuggestionCategory;
use crate::model::SuggestionKind;
use crate::store::PersistentStore;

const MAX_RECENT: usize = 3;
const MAX_FILTERS: usize = 2;
const MAX_OPERATORS: usize = 2;
const MAX_DEFAULT_POPULAR: usize = 3;
const MAX_DEFAULT_FILTERS: usize = 3;

/// Builds autocomplete candidates from history, data, facets and operators.
///
/// Holds read-only borrows; nothing here mutates the history or the data.
pub struct SuggestionEngine<'a, R: Record, S: PersistentStore> {
    history: &'a HistoryStore<S>,
    data: &'a [R],
    categories: Vec<String>,
    types: Vec<String>,
}

impl<'a, R: Record, S: PersistentStore> SuggestionEngine<'a, R, S> {
    pub fn new(history: &'a HistoryStore<S>, data: &'a [R]) -> Self {
        let mut categories = Vec::new();
        let mut types = Vec::new();
        for record in data {
            push_unique(&mut categories, &record.category());
            push_unique(&mut types, &record.kind());
        }
        Self {
            history,
            data,
            categories,
            types,
        }
    }

    pub fn with_categories<I, T>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for value in extra {
            push_unique(&mut self.categories, value.as_ref());
        }
        self
    }

    pub fn with_types<I, T>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for value in extra {
            push_unique(&mut self.types, value.as_ref());
        }
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn get_suggestions(&self, query: &str, limit: usize) -> Vec<SearchSuggestion> {
        let query = query.trim();
        if query.is_empty() {
            return self.default_suggestions(limit);
        }
        let needle = query.to_lowercase();
        let mut out = Vec::new();

        self.push_recent(&mut out, query, limit);
        self.push_data(&mut out, &needle, limit);
        self.push_filters(&mut out, &needle, limit);
        push_operators(&mut out, &needle, limit);

        out
    }

    fn default_suggestions(&self, limit: usize) -> Vec<SearchSuggestion> {
        let mut out = Vec::new();
        let popular = self
            .history
            .get_popular_queries(MAX_DEFAULT_POPULAR.min(limit));
        for (idx, text) in popular.into_iter().enumerate() {
            out.push(SearchSuggestion {
                id: format!("popular-{idx}"),
                text,
                category: SuggestionCategory::Popular,
                kind: SuggestionKind::Recent,
                icon: Some("trending".to_string()),
                metadata: None,
            });
        }

        let budget = MAX_DEFAULT_FILTERS.min(limit.saturating_sub(out.len()));
        for value in self.categories.iter().take(budget) {
            out.push(filter_suggestion(FilterFacet::Category, value));
        }
        out
    }

    fn push_recent(&self, out: &mut Vec<SearchSuggestion>, query: &str, limit: usize) {
        let budget = MAX_RECENT.min(limit.saturating_sub(out.len()));
        for entry in self.history.get_suggestions_from_history(query, budget) {
            out.push(SearchSuggestion {
                id: format!("recent-{}", entry.id),
                text: entry.query,
                category: SuggestionCategory::Recent,
                kind: SuggestionKind::Recent,
                icon: Some("clock".to_string()),
                metadata: Some(json!({ "resultsCount": entry.results_count })),
            });
        }
    }

    fn push_data(&self, out: &mut Vec<SearchSuggestion>, needle: &str, limit: usize) {
        let budget = limit.saturating_sub(out.len());
        if budget == 0 {
            return;
        }

        let mut matched = vec![false; self.data.len()];
        let mut picked: Vec<(usize, &'static str)> = Vec::new();
        for (idx, record) in self.data.iter().enumerate() {
            if picked.len() >= budget {
                break;
            }
            if record.title().to_lowercase().contains(needle) {
                matched[idx] = true;
                picked.push((idx, "title"));
            }
        }
        for (idx, record) in self.data.iter().enumerate() {
            if picked.len() >= budget {
                break;
            }
            if matched[idx] {
                continue;
            }
            let hit = record
                .description()
                .is_some_and(|d| d.to_lowercase().contains(needle));
            if hit {
                picked.push((idx, "description"));
            }
        }

        for (idx, matched_on) in picked {
            let record = &self.data[idx];
            let title = record.title();
            let text = if title.is_empty() {
                record.description().unwrap_or_default().into_owned()
            } else {
                title.into_owned()
            };
            out.push(SearchSuggestion {
                id: format!("data-{}", record.id().unwrap_or_else(|| idx.to_string())),
                text,
                category: SuggestionCategory::Data,
                kind: SuggestionKind::Suggestion,
                icon: None,
                metadata: Some(json!({
                    "source": idx,
                    "matchedOn": matched_on,
                    "category": record.category(),
                    "type": record.kind(),
                })),
            });
        }
    }

    fn push_filters(&self, out: &mut Vec<SearchSuggestion>, needle: &str, limit: usize) {
        let budget = MAX_FILTERS.min(limit.saturating_sub(out.len()));
        let candidates = self
            .categories
            .iter()
            .map(|v| (FilterFacet::Category, v))
            .chain(self.types.iter().map(|v| (FilterFacet::Type, v)));
        let hits: Vec<SearchSuggestion> = candidates
            .filter(|(_, value)| value.to_lowercase().contains(needle))
            .take(budget)
            .map(|(facet, value)| filter_suggestion(facet, value))
            .collect();
        out.extend(hits);
    }
}

fn push_operators(out: &mut Vec<SearchSuggestion>, needle: &str, limit: usize) {
    let budget = MAX_OPERATORS.min(limit.saturating_sub(out.len()));
    let hits = LogicOperator::ALL
        .into_iter()
        .filter(|op| op.keyword().to_lowercase().contains(needle))
        .take(budget)
        .map(|op| SearchSuggestion {
            id: format!("operator-{}", op.id()),
            text: op.keyword().to_string(),
            category: SuggestionCategory::Operator,
            kind: SuggestionKind::Operator,
            icon: Some("logic".to_string()),
            metadata: Some(json!({
                "symbol": op.symbol(),
                "shortcut": op.shortcut(),
                "description": op.description(),
            })),
        });
    out.extend(hits);
}

fn filter_suggestion(facet: FilterFacet, value: &str) -> SearchSuggestion {
    let text = format!("{}:{value}", facet.as_label());
    SearchSuggestion {
        id: format!("filter-{}", text.to_lowercase()),
        text,
        category: SuggestionCategory::Filter,
        kind: SuggestionKind::Filter,
        icon: Some("filter".to_string()),
        metadata: None,
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
