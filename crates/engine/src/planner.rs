use trendscout_protocol::{ChannelAge, FilterSpec, SearchMode, UploadWindow};

use crate::config::EngineConfig;
use crate::window::has_parseable_bound;

/// Which upstream operation serves a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Channel mode with keywords: results are already channel-shaped.
    ChannelSearch,
    ItemSearch,
    Trending,
}

impl FetchSource {
    #[must_use]
    pub fn for_spec(spec: &FilterSpec) -> Self {
        let has_keywords = !spec.keyword_terms().is_empty();
        match (spec.mode, has_keywords) {
            (SearchMode::Channel, true) => Self::ChannelSearch,
            (_, true) => Self::ItemSearch,
            (_, false) => Self::Trending,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChannelSearch => "channel_search",
            Self::ItemSearch => "item_search",
            Self::Trending => "trending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub source: FetchSource,
    /// Hard ceiling on upstream calls for one invocation.
    pub safety_page_budget: u32,
    pub over_fetch_multiplier: usize,
    /// Pool size at which the fetch loop stops.
    pub effective_pool_target: usize,
    /// Channels must be derived by grouping items.
    pub groups_channels: bool,
}

impl FetchPlan {
    #[must_use]
    pub fn for_spec(spec: &FilterSpec, config: &EngineConfig) -> Self {
        let source = FetchSource::for_spec(spec);
        let active = active_restrictive_filters(spec);
        let tiers = &config.budget;
        let safety_page_budget = if active >= tiers.high_from {
            tiers.high_calls
        } else if active >= tiers.medium_from {
            tiers.medium_calls
        } else {
            tiers.low_calls
        };

        let groups_channels = spec.mode == SearchMode::Channel && source != FetchSource::ChannelSearch;
        let over_fetch_multiplier = match spec.mode {
            SearchMode::Item => 1,
            SearchMode::Channel => {
                let m = &config.multipliers;
                let base = if groups_channels { m.grouped } else { m.direct };
                if channel_filters_active(spec) {
                    base.saturating_mul(m.channel_filter_factor)
                } else {
                    base
                }
            }
        };

        let plan = Self {
            source,
            safety_page_budget,
            over_fetch_multiplier,
            effective_pool_target: spec.effective_page_size().saturating_mul(over_fetch_multiplier),
            groups_channels,
        };
        log::debug!(
            "Fetch plan: source={} active_filters={active} budget={} multiplier={} target={}",
            source.as_str(),
            plan.safety_page_budget,
            plan.over_fetch_multiplier,
            plan.effective_pool_target
        );
        plan
    }
}

/// Number of independently restrictive filters; drives the call budget tier.
#[must_use]
pub fn active_restrictive_filters(spec: &FilterSpec) -> usize {
    let items = &spec.items;
    let channels = &spec.channels;
    // Mirrors what the client-side stages actually enforce for this mode and source.
    let item_mode = spec.mode == SearchMode::Item;
    let upload_window = match items.upload_window {
        UploadWindow::AnyTime => false,
        UploadWindow::Custom => has_parseable_bound(&items.custom_range),
        _ => true,
    };
    let uploads_filtered = FetchSource::for_spec(spec) != FetchSource::ChannelSearch
        && (upload_window || items.trending_24h);
    [
        item_mode && !items.durations.is_empty(),
        !items.views.is_full(),
        !channels.subscribers.is_full(),
        uploads_filtered,
        channels.channel_age != ChannelAge::Any,
        has_parseable_bound(&channels.created) || !channels.video_count.is_full(),
        spec.country_code().is_some(),
    ]
    .into_iter()
    .filter(|active| *active)
    .count()
}

/// Channel-level filters whose selectivity compounds with grouping.
#[must_use]
pub fn channel_filters_active(spec: &FilterSpec) -> bool {
    let channels = &spec.channels;
    has_parseable_bound(&channels.created) || !channels.video_count.is_full() || !channels.subscribers.is_full()
}
