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

use std::collections::HashSet;

use serde::Serialize;

use crate::model::Record;
use crate::model::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    And,
    Or,
    Not,
    Xor,
}

impl LogicOperator {
    pub const ALL: [LogicOperator; 4] = [
        LogicOperator::And,
        LogicOperator::Or,
        LogicOperator::Not,
        LogicOperator::Xor,
    ];

    pub fn id(self) -> &'static str {
        match self {
            LogicOperator::And => "and",
            LogicOperator::Or => "or",
            LogicOperator::Not => "not",
            LogicOperator::Xor => "xor",
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            LogicOperator::And => "AND",
            LogicOperator::Or => "OR",
            LogicOperator::Not => "NOT",
            LogicOperator::Xor => "XOR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LogicOperator::And => "&",
            LogicOperator::Or => "|",
            LogicOperator::Not => "!",
            LogicOperator::Xor => "^",
        }
    }

    pub fn shortcut(self) -> &'static str {
        match self {
            LogicOperator::And => "Alt+A",
            LogicOperator::Or => "Alt+O",
            LogicOperator::Not => "Alt+N",
            LogicOperator::Xor => "Alt+X",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LogicOperator::And => "Both terms must match",
            LogicOperator::Or => "Either term may match",
            LogicOperator::Not => "Exclude items matching the next term",
            LogicOperator::Xor => "Exactly one of the terms must match",
        }
    }

    /// Accepts the symbol or the case-insensitive keyword.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "&" => return Some(LogicOperator::And),
            "|" => return Some(LogicOperator::Or),
            "!" => return Some(LogicOperator::Not),
            "^" => return Some(LogicOperator::Xor),
            _ => {}
        }
        match token.to_lowercase().as_str() {
            "and" => Some(LogicOperator::And),
            "or" => Some(LogicOperator::Or),
            "not" => Some(LogicOperator::Not),
            "xor" => Some(LogicOperator::Xor),
            _ => None,
        }
    }

    pub fn combine(self, left: &HashSet<String>, right: &HashSet<String>) -> HashSet<String> {
        match self {
            LogicOperator::And => left.intersection(right).cloned().collect(),
            LogicOperator::Or => left.union(right).cloned().collect(),
            LogicOperator::Not => left.difference(right).cloned().collect(),
            LogicOperator::Xor => left.symmetric_difference(right).cloned().collect(),
        }
    }
}

/// Terms and the operators between them.
///
/// `operators[i]` always sits between `terms[i]` and `terms[i + 1]`, so
/// `operators.len() + 1 == terms.len()` whenever there is at least one term.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedQuery {
    pub terms: Vec<String>,
    pub operators: Vec<LogicOperator>,
    /// Set by a leading `NOT`: the first term excludes instead of selects.
    pub negate_first: bool,
}

impl ParsedQuery {
    pub fn has_logic(&self) -> bool {
        self.negate_first || (self.terms.len() > 1 && !self.operators.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Op(LogicOperator),
}

fn lex(input: &str) -> Vec<Token> {
    input
        .split_whitespace()
        .map(|word| match LogicOperator::parse(word) {
            Some(op) => Token::Op(op),
            None => Token::Word(word.to_string()),
        })
        .collect()
}

/// Splits a raw query into terms separated by logic operators.
///
/// Words between two operators form one term, joined by single spaces. A run
/// of operators between two terms keeps only the last one (`a AND NOT b` is
/// `a NOT b`). Trailing operators are dropped, as are leading ones except
/// `NOT`, which negates the first term.
pub fn parse(query: &str) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();
    let mut current: Vec<String> = Vec::new();
    let mut pending: Option<LogicOperator> = None;

    for token in lex(query) {
        match token {
            Token::Word(word) => {
                if current.is_empty()
                    && let Some(op) = pending.take()
                {
                    parsed.operators.push(op);
                }
                current.push(word);
            }
            Token::Op(op) => {
                flush_term(&mut parsed.terms, &mut current);
                if parsed.terms.is_empty() {
                    parsed.negate_first = op == LogicOperator::Not;
                } else {
                    pending = Some(op);
                }
            }
        }
    }
    flush_term(&mut parsed.terms, &mut current);
    if parsed.terms.is_empty() {
        parsed.negate_first = false;
    }
    parsed
}

fn flush_term(terms: &mut Vec<String>, current: &mut Vec<String>) {
    if !current.is_empty() {
        terms.push(current.join(" "));
        current.clear();
    }
}

/// Narrows `candidates` by the parsed operators.
///
/// Operators apply strictly left to right with no precedence: the running
/// set starts as the first term's matches (or every other candidate when the
/// first term is negated) and each operator combines it with the matches of
/// the following term. A term matches a candidate when the candidate's
/// serialized record contains it, case-insensitively.
pub fn apply<R: Record>(
    parsed: &ParsedQuery,
    candidates: Vec<SearchResult>,
    data: &[R],
) -> Vec<SearchResult> {
    let Some(first) = parsed.terms.first() else {
        return candidates;
    };
    if !parsed.has_logic() {
        return candidates;
    }

    let texts: Vec<String> = candidates
        .iter()
        .map(|c| {
            data.get(c.source)
                .map(|r| r.search_text().to_lowercase())
                .unwrap_or_default()
        })
        .collect();

    let term_matches = |term: &str| -> HashSet<String> {
        let term = term.to_lowercase();
        candidates
            .iter()
            .zip(&texts)
            .filter(|(_, text)| text.contains(&term))
            .map(|(c, _)| c.id.clone())
            .collect()
    };

    let mut running = term_matches(first);
    if parsed.negate_first {
        let all: HashSet<String> = candidates.iter().map(|c| c.id.clone()).collect();
        running = LogicOperator::Not.combine(&all, &running);
    }
    for (idx, op) in parsed.operators.iter().enumerate() {
        let Some(right_term) = parsed.terms.get(idx + 1) else {
            break;
        };
        let right = term_matches(right_term);
        running = op.combine(&running, &right);
    }

    candidates
        .into_iter()
        .filter(|c| running.contains(&c.id))
        .collect()
}
