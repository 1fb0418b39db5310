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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(
    name = "unisearch",
    version,
    about = "Universal search over JSON records with query history"
)]
pub struct Cli {
    /// History database (overrides the configured path)
    #[arg(long, global = true)]
    pub history: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search records
    Search(SearchArgs),

    /// Autocomplete suggestions for a partial query
    Suggest(SuggestArgs),

    /// Show how a query is split into terms, operators and filters
    Parse(ParseArgs),

    /// Inspect or edit the query history
    History(HistoryArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// JSON array or JSONL file of records
    #[arg(long)]
    pub data: PathBuf,

    /// Field to match (repeatable)
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Matching algorithm (repeatable)
    #[arg(long = "algorithm")]
    pub algorithms: Vec<String>,

    /// Maximum results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Do not record the query in history
    #[arg(long)]
    pub no_history: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Partial query text
    #[arg(default_value = "")]
    pub query: String,

    /// JSON array or JSONL file of records
    #[arg(long)]
    pub data: PathBuf,

    /// Maximum suggestions
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Query text
    pub query: String,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List recent queries
    List {
        /// Maximum entries
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// List the most frequent queries
    Popular {
        /// Maximum entries
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove one entry by id
    Rm {
        /// Entry id
        id: String,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove all entries
    Clear {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn json(&self) -> bool {
        match self {
            Commands::Search(args) => args.json,
            Commands::Suggest(args) => args.json,
            Commands::Parse(args) => args.json,
            Commands::History(args) => match &args.command {
                HistoryCommands::List { json, .. }
                | HistoryCommands::Popular { json, .. }
                | HistoryCommands::Rm { json, .. }
                | HistoryCommands::Clear { json } => *json,
            },
        }
    }
}
