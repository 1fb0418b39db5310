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

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::engine::DEFAULT_FIELDS;
use crate::engine::SearchOptions;
use crate::matching::Algorithm;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history_path: PathBuf,
    pub fields: Vec<String>,
    pub algorithms: Vec<String>,
    pub max_results: usize,
    pub suggestion_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("history.db"),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            algorithms: Algorithm::ALL
                .iter()
                .map(|a| a.as_label().to_string())
                .collect(),
            max_results: 50,
            suggestion_limit: 8,
        }
    }
}

impl Config {
    pub fn search_options(&self) -> Result<SearchOptions> {
        let algorithms = parse_algorithms(&self.algorithms)?;
        let fields = if self.fields.is_empty() {
            DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
        } else {
            self.fields.clone()
        };
        Ok(SearchOptions {
            fields,
            algorithms,
            limit: self.max_results,
        })
    }
}

pub fn parse_algorithms(names: &[String]) -> Result<Vec<Algorithm>> {
    let mut algorithms = Vec::new();
    for name in names {
        let algorithm =
            Algorithm::parse(name).ok_or_else(|| anyhow::anyhow!("unknown algorithm {name}"))?;
        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }
    if algorithms.is_empty() {
        anyhow::bail!("at least one algorithm must be enabled");
    }
    Ok(algorithms)
}

#[derive(Debug, Clone)]
pub struct ConfigCtx {
    pub dir: Option<PathBuf>,
    pub config: Config,
}

impl ConfigCtx {
    pub fn load() -> Result<Self> {
        let config = load_global_config()?;
        Ok(Self {
            dir: global_config_path().and_then(|p| p.parent().map(Path::to_path_buf)),
            config,
        })
    }

    /// Resolves the history database; relative paths live in the config dir.
    pub fn history_path(&self) -> PathBuf {
        let path = &self.config.history_path;
        match &self.dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.clone(),
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("unisearch").join("unisearch.toml"))
}

pub fn load_global_config() -> Result<Config> {
    let Some(path) = global_config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }
    read_config(&path)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: Config = toml::from_str(&text).context("parse unisearch.toml")?;
    parse_algorithms(&config.algorithms)
        .with_context(|| format!("invalid algorithms in {}", path.display()))?;
    Ok(config)
}
