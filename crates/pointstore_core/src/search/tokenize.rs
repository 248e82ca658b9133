//! Free-text tokenizer feeding the point search index.
//!
//! # Responsibility
//! - Turn arbitrary content strings into a deduplicated token list.
//!
//! # Invariants
//! - Pure and total: any input string yields a (possibly empty) token list.
//! - Token order follows first occurrence in the input.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W+").expect("valid token split regex"));

/// Tokenizes text: lowercase, split on runs of non-word characters, drop
/// empty fragments, deduplicate preserving first-occurrence order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for fragment in NON_WORD_RE.split(&lowered) {
        if fragment.is_empty() {
            continue;
        }
        if seen.insert(fragment.to_string()) {
            tokens.push(fragment.to_string());
        }
    }

    tokens
}
