//! Keyword, tag and category frequencies over fetched items.

mod report;
mod tokenize;

pub use report::{CategoryShare, KeywordAnalyzer, KeywordReport, TermCount};
pub use tokenize::{extract_keywords, is_stop_word, DEFAULT_MIN_LENGTH};
