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

mod cli;

use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use unisearch::config;
use unisearch::config::ConfigCtx;
use unisearch::data;
use unisearch::engine::SearchEngine;
use unisearch::engine::extract_filters;
use unisearch::history::HistoryStore;
use unisearch::logic;
use unisearch::output;
use unisearch::output::JsonResponse;
use unisearch::output::StatsOut;
use unisearch::output::print_json;
use unisearch::store::SqliteStore;
use unisearch::store::StoreMode;
use unisearch::suggest::SuggestionEngine;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::HistoryCommands;
use crate::cli::ParseArgs;
use crate::cli::SearchArgs;
use crate::cli::SuggestArgs;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.command.json();
    let result = match &cli.command {
        Commands::Search(args) => cmd_search(cli.history.as_deref(), args),
        Commands::Suggest(args) => cmd_suggest(cli.history.as_deref(), args),
        Commands::Parse(args) => cmd_parse(args),
        Commands::History(args) => cmd_history(cli.history.as_deref(), &args.command),
    };
    handle_result(result, json)
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let resp = JsonResponse::error("error", &format!("{err:#}"));
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn history_path(ctx: &ConfigCtx, flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.history_path())
}

fn open_history(path: &Path, mode: StoreMode) -> Result<HistoryStore<SqliteStore>> {
    let store = SqliteStore::open(path, mode)?;
    tracing::debug!(path = %store.path().display(), "opened history store");
    Ok(HistoryStore::open(store))
}

fn cmd_search(history_flag: Option<&Path>, args: &SearchArgs) -> Result<()> {
    let ctx = ConfigCtx::load()?;
    let loaded = data::load_records(&args.data)?;
    let mut warnings = loaded.warnings;

    let mut options = ctx.config.search_options()?;
    if !args.fields.is_empty() {
        options.fields = args.fields.clone();
    }
    if !args.algorithms.is_empty() {
        options.algorithms = config::parse_algorithms(&args.algorithms)?;
    }
    if let Some(limit) = args.limit {
        options.limit = limit;
    }
    let limit = options.limit;
    let engine = SearchEngine::new(options);

    let outcome = if args.no_history {
        engine.search(&args.query, &loaded.records)
    } else {
        match open_history(&history_path(&ctx, history_flag), StoreMode::ReadWrite) {
            Ok(history) => engine.search_and_record(&history, &args.query, &loaded.records),
            Err(err) => {
                tracing::warn!(error = %err, "history unavailable; query not recorded");
                warnings.push(format!("history unavailable: {err}"));
                engine.search(&args.query, &loaded.records)
            }
        }
    };

    if args.json {
        let resp = JsonResponse::ok()
            .with_outcome(&outcome, limit, &loaded.records)
            .with_warnings(warnings);
        print_json(&resp)?;
    } else {
        output::print_results(&outcome);
        for warn in warnings {
            eprintln!("warning: {warn}");
        }
    }
    Ok(())
}

fn cmd_suggest(history_flag: Option<&Path>, args: &SuggestArgs) -> Result<()> {
    let ctx = ConfigCtx::load()?;
    let loaded = data::load_records(&args.data)?;
    let history = open_history(&history_path(&ctx, history_flag), StoreMode::ReadOnly)?;
    let limit = args.limit.unwrap_or(ctx.config.suggestion_limit);

    let engine = SuggestionEngine::new(&history, &loaded.records);
    let suggestions = engine.get_suggestions(&args.query, limit);

    if args.json {
        let resp = JsonResponse::ok()
            .with_suggestions(suggestions)
            .with_warnings(loaded.warnings);
        print_json(&resp)?;
    } else {
        output::print_suggestions(&suggestions);
    }
    Ok(())
}

fn cmd_parse(args: &ParseArgs) -> Result<()> {
    let (text, filters) = extract_filters(&args.query);
    let parsed = logic::parse(&text);

    if args.json {
        let resp = JsonResponse::ok().with_query(args.query.trim(), &parsed, &filters, 0);
        print_json(&resp)?;
    } else {
        for (idx, term) in parsed.terms.iter().enumerate() {
            if idx == 0 && parsed.negate_first {
                println!("term\tNOT {term}");
            } else {
                println!("term\t{term}");
            }
        }
        for op in &parsed.operators {
            println!("operator\t{}", op.keyword());
        }
        for filter in &filters {
            println!("filter\t{}", filter.id);
        }
    }
    Ok(())
}

fn cmd_history(history_flag: Option<&Path>, command: &HistoryCommands) -> Result<()> {
    let ctx = ConfigCtx::load()?;
    let path = history_path(&ctx, history_flag);

    match command {
        HistoryCommands::List { limit, json } => {
            let history = open_history(&path, StoreMode::ReadOnly)?;
            let entries = history.get_recent_queries(*limit);
            if *json {
                let resp = JsonResponse::ok()
                    .with_stats(history_stats(&history))
                    .with_history(entries);
                print_json(&resp)?;
            } else {
                output::print_history(&entries);
            }
        }
        HistoryCommands::Popular { limit, json } => {
            let history = open_history(&path, StoreMode::ReadOnly)?;
            let popular = history.get_popular_queries(*limit);
            if *json {
                let resp = JsonResponse::ok()
                    .with_stats(history_stats(&history))
                    .with_popular(popular);
                print_json(&resp)?;
            } else {
                for query in popular {
                    println!("{query}");
                }
            }
        }
        HistoryCommands::Rm { id, json } => {
            let history = open_history(&path, StoreMode::ReadWrite)?;
            if !history.remove_history_item(id) {
                anyhow::bail!("no history entry with id {id}");
            }
            if *json {
                print_json(&JsonResponse::ok().with_stats(history_stats(&history)))?;
            } else {
                println!("Removed {id}");
            }
        }
        HistoryCommands::Clear { json } => {
            let history = open_history(&path, StoreMode::ReadWrite)?;
            history.clear_history();
            if *json {
                print_json(&JsonResponse::ok().with_stats(history_stats(&history)))?;
            } else {
                println!("History cleared");
            }
        }
    }
    Ok(())
}

fn history_stats(history: &HistoryStore<SqliteStore>) -> StatsOut {
    StatsOut {
        took_ms: 0,
        total_hits: 0,
        history_count: Some(history.len() as i64),
    }
}
