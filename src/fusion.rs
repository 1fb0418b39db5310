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
use std::collections::HashMap;

use crate::model::SearchResult;

/// Merges result sets from several algorithms into one ranked list.
///
/// Entries sharing an `id` collapse into the one with the highest score; on
/// equal scores the first seen entry is kept. The output is sorted by score
/// descending and ties keep first-insertion order.
pub fn fuse(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<SearchResult> = Vec::new();

    for result in results {
        match slots.get(&result.id) {
            Some(&slot) => {
                if result.relevance_score > items[slot].relevance_score {
                    items[slot] = result;
                }
            }
            None => {
                slots.insert(result.id.clone(), items.len());
                items.push(result);
            }
        }
    }

    sort_by_score(&mut items);
    items
}

/// Stable descending sort on relevance score.
pub fn sort_by_score(items: &mut [SearchResult]) {
    items.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
}
