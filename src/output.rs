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

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;

use crate::engine::SearchOutcome;
use crate::logic::ParsedQuery;
use crate::model::SearchFilter;
use crate::model::SearchHistoryEntry;
use crate::model::SearchSuggestion;

pub const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Default)]
pub struct StatsOut {
    pub took_ms: i64,
    pub total_hits: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOut {
    pub text: String,
    pub terms: Vec<String>,
    pub operators: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub negate_first: bool,
    pub filters: Vec<SearchFilter>,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonResponse {
    pub ok: bool,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<SearchSuggestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<SearchHistoryEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popular: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            schema_version: SCHEMA_VERSION.to_string(),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            schema_version: SCHEMA_VERSION.to_string(),
            error: Some(ErrorOut {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
                hint: None,
            }),
            ..Default::default()
        }
    }

    pub fn with_query(
        mut self,
        text: &str,
        parsed: &ParsedQuery,
        filters: &[SearchFilter],
        limit: usize,
    ) -> Self {
        self.query = Some(QueryOut {
            text: text.to_string(),
            terms: parsed.terms.clone(),
            operators: parsed
                .operators
                .iter()
                .map(|op| op.keyword().to_string())
                .collect(),
            negate_first: parsed.negate_first,
            filters: filters.to_vec(),
            limit: limit as i64,
        });
        self
    }

    pub fn with_outcome(self, outcome: &SearchOutcome, limit: usize, records: &[Value]) -> Self {
        let results = outcome
            .results
            .iter()
            .map(|r| {
                let mut value = serde_json::to_value(r).unwrap_or(Value::Null);
                if let (Some(obj), Some(record)) = (value.as_object_mut(), records.get(r.source))
                {
                    obj.insert("metadata".into(), record.clone());
                }
                value
            })
            .collect();
        self.with_query(&outcome.query, &outcome.parsed, &outcome.filters, limit)
            .with_results(results)
            .with_stats(StatsOut {
                took_ms: outcome.took_ms,
                total_hits: outcome.total_hits as i64,
                history_count: None,
            })
    }

    pub fn with_results(mut self, results: Vec<Value>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<SearchSuggestion>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn with_history(mut self, history: Vec<SearchHistoryEntry>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_popular(mut self, popular: Vec<String>) -> Self {
        self.popular = Some(popular);
        self
    }

    pub fn with_stats(mut self, stats: StatsOut) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn print_json(resp: &JsonResponse) -> Result<()> {
    let text = serde_json::to_string_pretty(resp)?;
    println!("{text}");
    Ok(())
}

pub fn print_results(outcome: &SearchOutcome) {
    for result in &outcome.results {
        println!(
            "{:.3}\t{}\t{}/{}\t{}",
            result.relevance_score,
            result.title,
            result.category,
            result.kind,
            result.algorithm.as_label()
        );
    }
    if outcome.results.len() < outcome.total_hits {
        println!(
            "({} of {} hits shown)",
            outcome.results.len(),
            outcome.total_hits
        );
    }
}

pub fn print_suggestions(suggestions: &[SearchSuggestion]) {
    for suggestion in suggestions {
        println!("{}\t{}", suggestion.category.as_label(), suggestion.text);
    }
}

pub fn print_history(entries: &[SearchHistoryEntry]) {
    for entry in entries {
        let ts = entry.timestamp.format(&Rfc3339).unwrap_or_default();
        println!(
            "{}\t{}\t{}\t{}",
            entry.id, ts, entry.results_count, entry.query
        );
    }
}
