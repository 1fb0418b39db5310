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

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use sha2::Digest;
use sha2::Sha256;
use time::OffsetDateTime;

use crate::model::SearchFilter;
use crate::model::SearchHistoryEntry;
use crate::store::PersistentStore;

pub const HISTORY_KEY: &str = "universal-search-history";
pub const MAX_HISTORY: usize = 50;

static ENTRY_SEQ: AtomicU64 = AtomicU64::new(0);

/// Bounded, deduplicated log of past queries, most recent first.
///
/// All state lives behind one mutex. Mutations persist while the lock is
/// held, so writes for the history key never interleave.
pub struct HistoryStore<S: PersistentStore> {
    store: S,
    entries: Mutex<Vec<SearchHistoryEntry>>,
}

impl<S: PersistentStore> HistoryStore<S> {
    /// Loads persisted history. Unreadable or corrupt data yields an empty
    /// history and a warning.
    pub fn open(store: S) -> Self {
        let entries = load_entries(&store);
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn entries(&self) -> MutexGuard<'_, Vec<SearchHistoryEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a query at the front of the history, replacing any previous
    /// entry with the identical query. Blank queries are ignored.
    pub fn add_search(
        &self,
        query: &str,
        results_count: usize,
        filters: Vec<SearchFilter>,
    ) -> Option<SearchHistoryEntry> {
        if query.trim().is_empty() {
            return None;
        }

        let timestamp = OffsetDateTime::now_utc();
        let entry = SearchHistoryEntry {
            id: entry_id(query, timestamp),
            query: query.to_string(),
            timestamp,
            results_count,
            filters,
        };

        let mut entries = self.entries();
        entries.retain(|e| e.query != query);
        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY);
        self.persist(&entries);
        Some(entry)
    }

    pub fn get_history(&self) -> Vec<SearchHistoryEntry> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn get_recent_queries(&self, limit: usize) -> Vec<SearchHistoryEntry> {
        self.entries().iter().take(limit).cloned().collect()
    }

    /// Most frequent query strings, ties in first-seen order.
    pub fn get_popular_queries(&self, limit: usize) -> Vec<String> {
        let entries = self.entries();
        let mut order: Vec<(&str, usize)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for entry in entries.iter() {
            match slots.get(entry.query.as_str()) {
                Some(&slot) => order[slot].1 += 1,
                None => {
                    slots.insert(entry.query.as_str(), order.len());
                    order.push((entry.query.as_str(), 1));
                }
            }
        }
        order.sort_by(|a, b| b.1.cmp(&a.1));
        order
            .into_iter()
            .take(limit)
            .map(|(query, _)| query.to_string())
            .collect()
    }

    /// Entries whose query contains `query` or is contained in it,
    /// case-insensitively. A blank query returns the most recent entries.
    pub fn get_suggestions_from_history(
        &self,
        query: &str,
        limit: usize,
    ) -> Vec<SearchHistoryEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.get_recent_queries(limit);
        }
        self.entries()
            .iter()
            .filter(|e| {
                let hay = e.query.to_lowercase();
                hay.contains(&needle) || needle.contains(&hay)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn clear_history(&self) {
        let mut entries = self.entries();
        entries.clear();
        self.persist(&entries);
    }

    /// Removes the entry with `id`; returns whether one existed.
    pub fn remove_history_item(&self, id: &str) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;
        if removed {
            self.persist(&entries);
        }
        removed
    }

    fn persist(&self, entries: &[SearchHistoryEntry]) {
        let text = match serde_json::to_string(entries) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize search history");
                return;
            }
        };
        if let Err(err) = self.store.set(HISTORY_KEY, &text) {
            tracing::warn!(error = %err, "failed to save search history");
        }
    }
}

fn load_entries<S: PersistentStore>(store: &S) -> Vec<SearchHistoryEntry> {
    let text = match store.get(HISTORY_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load search history; starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<SearchHistoryEntry>>(&text) {
        Ok(mut entries) => {
            let mut seen = HashSet::new();
            entries.retain(|e| seen.insert(e.query.clone()));
            entries.truncate(MAX_HISTORY);
            tracing::debug!(entries = entries.len(), "loaded search history");
            entries
        }
        Err(err) => {
            tracing::warn!(error = %err, "corrupt search history; starting empty");
            Vec::new()
        }
    }
}

fn entry_id(query: &str, timestamp: OffsetDateTime) -> String {
    let seq = ENTRY_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(timestamp.unix_timestamp_nanos().to_le_bytes());
    hasher.update(seq.to_le_bytes());
    hex::encode(&hasher.finalize()[..8])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::FilterFacet;
    use crate::store::MemoryStore;
    use crate::store::StoreError;
    use crate::store::StoreResult;

    struct FailingStore;

    impl PersistentStore for FailingStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::ReadOnly)
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::ReadOnly)
        }
    }

    fn queries(entries: &[SearchHistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.query.as_str()).collect()
    }

    #[test]
    fn bounded_to_max_history() {
        let history = HistoryStore::open(MemoryStore::new());
        for i in 0..60 {
            history.add_search(&format!("query {i}"), i, Vec::new());
        }
        let entries = history.get_history();
        assert_eq!(entries.len(), MAX_HISTORY);
        assert_eq!(entries[0].query, "query 59");
        assert_eq!(entries[49].query, "query 10");
        assert!(entries.iter().all(|e| e.query != "query 9"));
    }

    #[test]
    fn re_adding_moves_to_front() {
        let history = HistoryStore::open(MemoryStore::new());
        history.add_search("ac unit", 3, Vec::new());
        history.add_search("fan", 1, Vec::new());
        history.add_search("ac unit", 7, Vec::new());
        let entries = history.get_history();
        assert_eq!(queries(&entries), vec!["ac unit", "fan"]);
        assert_eq!(entries[0].results_count, 7);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let history = HistoryStore::open(MemoryStore::new());
        history.add_search("AC", 1, Vec::new());
        history.add_search("ac", 1, Vec::new());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn blank_queries_are_ignored() {
        let history = HistoryStore::open(MemoryStore::new());
        assert!(history.add_search("   ", 0, Vec::new()).is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let filters = vec![SearchFilter::new(FilterFacet::Category, "hvac")];
        {
            let history = HistoryStore::open(SharedStore(store.clone()));
            history.add_search("ac unit", 3, filters.clone());
            history.add_search("fan", 1, Vec::new());
        }
        let reloaded = HistoryStore::open(SharedStore(store.clone()));
        let entries = reloaded.get_history();
        assert_eq!(queries(&entries), vec!["fan", "ac unit"]);
        assert_eq!(entries[1].filters, filters);

        let raw = store.get(HISTORY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value[0]["timestamp"].is_string());
        assert_eq!(value[1]["resultsCount"], 3);
    }

    #[test]
    fn duplicate_queries_collapse_on_load() {
        let store = MemoryStore::new();
        let blob = r#"[
            {"id": "a1", "query": "fan", "timestamp": "2024-05-03T00:00:00Z", "resultsCount": 4},
            {"id": "b1", "query": "pump", "timestamp": "2024-05-02T00:00:00Z", "resultsCount": 2},
            {"id": "a0", "query": "fan", "timestamp": "2024-05-01T00:00:00Z", "resultsCount": 9}
        ]"#;
        store.set(HISTORY_KEY, blob).unwrap();

        let history = HistoryStore::open(store);
        let entries = history.get_history();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1"]);
        assert_eq!(entries[0].results_count, 4);
    }

    #[test]
    fn corrupt_data_resets_to_empty() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();
        let history = HistoryStore::open(store);
        assert!(history.is_empty());
        history.add_search("fan", 1, Vec::new());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn failing_store_keeps_memory_authoritative() {
        let history = HistoryStore::open(FailingStore);
        history.add_search("fan", 1, Vec::new());
        history.add_search("heater", 2, Vec::new());
        assert_eq!(history.len(), 2);
        history.clear_history();
        assert!(history.is_empty());
    }

    #[test]
    fn recent_and_popular() {
        let history = HistoryStore::open(MemoryStore::new());
        for q in ["a", "b", "c", "d"] {
            history.add_search(q, 0, Vec::new());
        }
        assert_eq!(queries(&history.get_recent_queries(2)), vec!["d", "c"]);
        assert_eq!(history.get_popular_queries(3), vec!["d", "c", "b"]);
    }

    #[test]
    fn suggestions_match_both_directions() {
        let history = HistoryStore::open(MemoryStore::new());
        history.add_search("portable fan", 1, Vec::new());
        history.add_search("AC", 1, Vec::new());
        history.add_search("heater", 1, Vec::new());

        let hits = history.get_suggestions_from_history("Fan", 5);
        assert_eq!(queries(&hits), vec!["portable fan"]);

        let hits = history.get_suggestions_from_history("ac unit", 5);
        assert_eq!(queries(&hits), vec!["AC"]);

        let hits = history.get_suggestions_from_history("", 2);
        assert_eq!(queries(&hits), vec!["heater", "AC"]);
    }

    #[test]
    fn remove_and_clear() {
        let history = HistoryStore::open(MemoryStore::new());
        let fan = history.add_search("fan", 1, Vec::new()).unwrap();
        history.add_search("heater", 1, Vec::new());
        assert!(history.remove_history_item(&fan.id));
        assert!(!history.remove_history_item(&fan.id));
        assert_eq!(queries(&history.get_history()), vec!["heater"]);

        history.clear_history();
        assert!(history.is_empty());
        let raw = history.store().get(HISTORY_KEY).unwrap();
        assert_eq!(raw.as_deref(), Some("[]"));
    }

    #[test]
    fn concurrent_adds_stay_bounded() {
        let history = Arc::new(HistoryStore::open(MemoryStore::new()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for i in 0..30 {
                        history.add_search(&format!("t{t}-{i}"), i, Vec::new());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("join");
        }
        assert_eq!(history.len(), MAX_HISTORY);
        let persisted: Vec<SearchHistoryEntry> =
            serde_json::from_str(&history.store().get(HISTORY_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, history.get_history());
    }

    struct SharedStore(Arc<MemoryStore>);

    impl PersistentStore for SharedStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            self.0.set(key, value)
        }
    }
}
