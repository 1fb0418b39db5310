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

//! Universal search over caller-supplied records: multi-algorithm matching,
//! result fusion, boolean query logic, persistent history and autocomplete.

pub mod config;
pub mod data;
pub mod engine;
pub mod fusion;
pub mod history;
pub mod logic;
pub mod matching;
pub mod model;
pub mod output;
pub mod scene;
pub mod store;
pub mod suggest;
