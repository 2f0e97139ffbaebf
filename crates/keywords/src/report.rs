use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendscout_protocol::CandidateItem;

use crate::tokenize::{extract_keywords, DEFAULT_MIN_LENGTH};

const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    /// Share of analyzed items, 0..=100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    /// Serialized as RFC 3339 UTC.
    pub generated_at: DateTime<Utc>,
    pub total_items: usize,
    pub top_keywords: Vec<TermCount>,
    pub top_tags: Vec<TermCount>,
    pub top_categories: Vec<CategoryShare>,
}

impl KeywordReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Term counter that remembers first-occurrence order for tie breaking.
#[derive(Debug, Default)]
struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<TermCount>,
}

impl FrequencyTable {
    fn add(&mut self, term: String) {
        if let Some(&pos) = self.index.get(&term) {
            self.entries[pos].count += 1;
            return;
        }
        self.index.insert(term.clone(), self.entries.len());
        self.entries.push(TermCount { term, count: 1 });
    }

    fn extend(&mut self, terms: impl IntoIterator<Item = String>) {
        for term in terms {
            self.add(term);
        }
    }

    /// Most common first; equal counts keep first-occurrence order.
    fn top(mut self, limit: usize) -> Vec<TermCount> {
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
        self.entries.truncate(limit);
        self.entries
    }
}

/// Keyword, tag and category frequencies over a batch of fetched items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordAnalyzer {
    pub min_length: usize,
    pub top_keywords: usize,
    pub top_tags: usize,
    pub top_categories: usize,
}

impl Default for KeywordAnalyzer {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            top_keywords: 50,
            top_tags: 50,
            top_categories: 10,
        }
    }
}

impl KeywordAnalyzer {
    #[must_use]
    pub fn analyze(&self, items: &[CandidateItem]) -> KeywordReport {
        self.analyze_at(items, Utc::now())
    }

    #[must_use]
    pub fn analyze_at(&self, items: &[CandidateItem], generated_at: DateTime<Utc>) -> KeywordReport {
        let mut keywords = FrequencyTable::default();
        let mut tags = FrequencyTable::default();
        let mut categories = FrequencyTable::default();

        for item in items {
            keywords.extend(extract_keywords(&item.title, self.min_length));
            if let Some(description) = item.description.as_deref() {
                keywords.extend(extract_keywords(description, self.min_length));
            }
            tags.extend(item.tags.iter().map(|tag| tag.to_lowercase()));
            let category = item
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(UNKNOWN_CATEGORY);
            categories.add(category.to_string());
        }

        let total_items = items.len();
        log::debug!(
            "Analyzed {total_items} items: {} distinct keywords, {} distinct tags, {} categories",
            keywords.entries.len(),
            tags.entries.len(),
            categories.entries.len()
        );

        let top_categories = categories
            .top(self.top_categories)
            .into_iter()
            .map(|TermCount { term, count }| CategoryShare {
                category: term,
                count,
                percentage: count as f64 / total_items as f64 * 100.0,
            })
            .collect();

        KeywordReport {
            generated_at,
            total_items,
            top_keywords: keywords.top(self.top_keywords),
            top_tags: tags.top(self.top_tags),
            top_categories,
        }
    }
}
