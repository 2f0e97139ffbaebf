use trendscout_protocol::{CandidateItem, CountRange, DurationBracket, FilterSpec, Platform, SearchMode};

use crate::planner::FetchSource;
use crate::window::{TimeBounds, YEAR_MS};

/// Client-side predicates the upstream cannot express.
///
/// Built once per call from the `FilterSpec`; every predicate is inactive when its field holds the
/// default value. Predicates are conjunctive, duration brackets are OR'ed within the set.
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    platform: Option<Platform>,
    excluded_categories: Vec<String>,
    views: CountRange,
    subscribers: CountRange,
    language: Option<String>,
    country: Option<String>,
    created_after_ms: Option<u64>,
    durations: Vec<DurationBracket>,
    uploads: TimeBounds,
}

impl FilterPipeline {
    #[must_use]
    pub fn new(spec: &FilterSpec, now_ms: u64) -> Self {
        let created_after_ms = spec
            .channels
            .channel_age
            .max_years()
            .map(|years| now_ms.saturating_sub(years * YEAR_MS));
        // Duration brackets belong to the item filter block.
        let durations = match spec.mode {
            SearchMode::Item => spec.items.durations.clone(),
            SearchMode::Channel => Vec::new(),
        };
        // Channel search results carry the channel's own dates, not an upload date.
        let uploads = match FetchSource::for_spec(spec) {
            FetchSource::ChannelSearch => TimeBounds::default(),
            FetchSource::ItemSearch | FetchSource::Trending => TimeBounds::for_uploads(spec, now_ms),
        };

        Self {
            platform: spec.platform,
            excluded_categories: spec.items.excluded_categories.excluded_ids(),
            views: spec.items.views,
            subscribers: spec.channels.subscribers,
            language: spec.language_code().map(str::to_ascii_lowercase),
            country: spec.country_code().map(str::to_ascii_lowercase),
            created_after_ms,
            durations,
            uploads,
        }
    }

    /// Keeps the items that pass every active predicate, in their original order.
    #[must_use]
    pub fn apply(&self, batch: Vec<CandidateItem>) -> Vec<CandidateItem> {
        batch.into_iter().filter(|item| self.accepts(item)).collect()
    }

    #[must_use]
    pub fn accepts(&self, item: &CandidateItem) -> bool {
        self.platform_matches(item)
            && self.category_allowed(item)
            && self.views.contains(item.view_count)
            && self.subscribers.contains(item.subscriber_count.unwrap_or(0))
            && self.language_matches(item)
            && self.country_matches(item)
            && self.channel_young_enough(item)
            && self.duration_matches(item)
            && self.uploaded_in_window(item)
    }

    fn platform_matches(&self, item: &CandidateItem) -> bool {
        self.platform.map_or(true, |p| item.platform == p)
    }

    fn category_allowed(&self, item: &CandidateItem) -> bool {
        match item.category.as_deref() {
            Some(category) => !self.excluded_categories.iter().any(|id| id == category),
            None => true,
        }
    }

    /// `en` matches `en`, `EN-us` and `en_GB`.
    fn language_matches(&self, item: &CandidateItem) -> bool {
        let Some(wanted) = self.language.as_deref() else {
            return true;
        };
        item.language
            .as_deref()
            .map(|lang| lang.trim().to_ascii_lowercase())
            .is_some_and(|lang| lang.starts_with(wanted))
    }

    fn country_matches(&self, item: &CandidateItem) -> bool {
        let Some(wanted) = self.country.as_deref() else {
            return true;
        };
        item.country
            .as_deref()
            .is_some_and(|country| country.trim().eq_ignore_ascii_case(wanted))
    }

    /// Channels with an unknown creation date pass.
    fn channel_young_enough(&self, item: &CandidateItem) -> bool {
        match (self.created_after_ms, item.channel_created_at_ms()) {
            (Some(after), Some(created)) => created >= after,
            _ => true,
        }
    }

    fn duration_matches(&self, item: &CandidateItem) -> bool {
        if self.durations.is_empty() {
            return true;
        }
        item.duration_secs
            .is_some_and(|secs| self.durations.iter().any(|bracket| bracket.contains(secs)))
    }

    fn uploaded_in_window(&self, item: &CandidateItem) -> bool {
        self.uploads.contains(item.uploaded_at_ms)
    }
}
