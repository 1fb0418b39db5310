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

use std::borrow::Cow;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::matching::Algorithm;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_KIND: &str = "item";

/// The view of a caller's data item that the search core reads.
///
/// Only `id`, `field` and `search_text` are required; the remaining accessors
/// are derived from `field` with the documented defaults.
pub trait Record {
    fn id(&self) -> Option<String>;

    fn field(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Serialized form of the whole record, used for full-text containment.
    fn search_text(&self) -> String;

    fn title(&self) -> Cow<'_, str> {
        self.field("title").unwrap_or_default()
    }

    fn description(&self) -> Option<Cow<'_, str>> {
        self.field("description").filter(|d| !d.is_empty())
    }

    fn category(&self) -> Cow<'_, str> {
        self.field("category")
            .filter(|c| !c.is_empty())
            .unwrap_or(Cow::Borrowed(DEFAULT_CATEGORY))
    }

    fn kind(&self) -> Cow<'_, str> {
        self.field("type")
            .filter(|k| !k.is_empty())
            .unwrap_or(Cow::Borrowed(DEFAULT_KIND))
    }

    fn tags(&self) -> Vec<String> {
        Vec::new()
    }

    fn timestamp(&self) -> Option<OffsetDateTime> {
        self.field("timestamp")
            .and_then(|ts| OffsetDateTime::parse(&ts, &Rfc3339).ok())
    }
}

impl Record for Value {
    fn id(&self) -> Option<String> {
        match self.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    fn search_text(&self) -> String {
        self.to_string()
    }

    fn tags(&self) -> Vec<String> {
        self.get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub relevance_score: f32,
    /// Index of the matched record in the caller's data slice.
    pub source: usize,
    pub tags: Vec<String>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
    pub algorithm: Algorithm,
}

impl SearchResult {
    pub fn from_record<R: Record + ?Sized>(
        record: &R,
        index: usize,
        algorithm: Algorithm,
        score: f32,
    ) -> Self {
        let id = record
            .id()
            .unwrap_or_else(|| format!("{}-{index}", algorithm.as_label()));
        Self {
            id,
            title: record.title().into_owned(),
            description: record.description().map(Cow::into_owned),
            category: record.category().into_owned(),
            kind: record.kind().into_owned(),
            relevance_score: score.clamp(0.0, 1.0),
            source: index,
            tags: record.tags(),
            timestamp: record.timestamp(),
            algorithm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Recent,
    Suggestion,
    Filter,
    Operator,
}

/// Display grouping of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuggestionCategory {
    Recent,
    Popular,
    Filter,
    Operator,
    Data,
}

impl SuggestionCategory {
    pub fn as_label(self) -> &'static str {
        match self {
            SuggestionCategory::Recent => "recent",
            SuggestionCategory::Popular => "popular",
            SuggestionCategory::Filter => "filter",
            SuggestionCategory::Operator => "operator",
            SuggestionCategory::Data => "data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSuggestion {
    pub id: String,
    pub text: String,
    pub category: SuggestionCategory,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Facet a filter constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterFacet {
    Category,
    Type,
}

impl FilterFacet {
    pub fn as_label(self) -> &'static str {
        match self {
            FilterFacet::Category => "category",
            FilterFacet::Type => "type",
        }
    }

    fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "category" => Some(FilterFacet::Category),
            "type" => Some(FilterFacet::Type),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub id: String,
    pub label: String,
    pub value: String,
    pub category: FilterFacet,
    pub removable: bool,
}

impl SearchFilter {
    pub fn new(facet: FilterFacet, value: &str) -> Self {
        let label = match facet {
            FilterFacet::Category => format!("Category: {value}"),
            FilterFacet::Type => format!("Type: {value}"),
        };
        Self {
            id: format!("{}:{}", facet.as_label(), value.to_lowercase()),
            label,
            value: value.to_string(),
            category: facet,
            removable: true,
        }
    }

    /// Parses a `category:value` or `type:value` query token.
    pub fn parse_token(token: &str) -> Option<Self> {
        let (facet, value) = token.split_once(':')?;
        let facet = FilterFacet::parse(facet)?;
        if value.is_empty() {
            return None;
        }
        Some(Self::new(facet, value))
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let actual = match self.category {
            FilterFacet::Category => record.category(),
            FilterFacet::Type => record.kind(),
        };
        actual.to_lowercase() == self.value.to_lowercase()
    }
}

/// Drops the filter with `id`; returns whether one was removed.
pub fn remove_filter(filters: &mut Vec<SearchFilter>, id: &str) -> bool {
    let before = filters.len();
    filters.retain(|f| f.id != id);
    filters.len() != before
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub results_count: usize,
    #[serde(default)]
    pub filters: Vec<SearchFilter>,
}
