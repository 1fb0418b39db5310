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

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct LoadedData {
    pub records: Vec<Value>,
    pub warnings: Vec<String>,
}

pub fn load_records(path: &Path) -> Result<LoadedData> {
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_records(file).with_context(|| format!("read records from {}", path.display()))
}

/// Reads a JSON array of objects, or one JSON object per line.
pub fn read_records(reader: impl Read) -> Result<LoadedData> {
    let mut reader = BufReader::new(reader);
    let mut text = String::new();
    reader.read_to_string(&mut text).context("read input")?;

    if text.trim_start().starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(&text).context("parse JSON array")?;
        let mut loaded = LoadedData::default();
        for (idx, value) in values.into_iter().enumerate() {
            push_record(&mut loaded, value, || format!("item {idx}"));
        }
        return Ok(loaded);
    }

    let mut loaded = LoadedData::default();
    for (idx, line) in text.as_bytes().lines().enumerate() {
        let line = line.context("read line")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&line) {
            Ok(value) => push_record(&mut loaded, value, || format!("line {}", idx + 1)),
            Err(err) => loaded
                .warnings
                .push(format!("line {}: invalid JSON: {err}", idx + 1)),
        }
    }
    Ok(loaded)
}

fn push_record(loaded: &mut LoadedData, value: Value, location: impl FnOnce() -> String) {
    if value.is_object() {
        loaded.records.push(value);
    } else {
        loaded
            .warnings
            .push(format!("{}: skipped non-object record", location()));
    }
}
