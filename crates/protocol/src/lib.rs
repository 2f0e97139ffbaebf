//! Wire types shared between the UI layer, the aggregation engine and upstream clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod filter;
pub mod upstream;

pub use filter::{
    CategoryExclusions, ChannelAge, ChannelFilters, CountRange, DateRange, DurationBracket,
    FilterSpec, ItemFilters, KeywordMatch, MonetizationFilter, MonetizationState, Platform,
    SearchMode, SortKey, UploadWindow,
};
pub use upstream::{
    ChannelSearchRequest, ItemSearchRequest, TrendingRequest, UpstreamBatch, UpstreamClient,
    UpstreamError, UpstreamErrorClass, UpstreamOrder,
};

/// Monetization facts reported for a channel.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct Monetization {
    pub enabled: bool,
    /// When monetization started, if the upstream exposes it.
    #[serde(default)]
    pub since_ms: Option<u64>,
}

/// Channel-only fields. Present on channel-shaped results and, where the upstream
/// knows them, on items as facts about the item's channel.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct ChannelDetails {
    #[serde(default)]
    pub created_at_ms: Option<u64>,
    #[serde(default)]
    pub monetization: Option<Monetization>,
    #[serde(default)]
    pub average_video_length_secs: Option<u64>,
    #[serde(default)]
    pub total_views: Option<u64>,
    #[serde(default)]
    pub video_count: Option<u64>,
}

/// A normalized upstream result: either a single item (video) or a channel.
///
/// Produced by [`UpstreamClient`] implementations; the engine never mutates one in place.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct CandidateItem {
    pub id: String,
    pub platform: Platform,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub url: String,
    /// Stable channel identity of the creator.
    #[serde(default)]
    pub creator_id: Option<String>,
    pub creator_name: String,
    #[serde(default)]
    pub creator_avatar_url: Option<String>,
    #[serde(default)]
    pub subscriber_count: Option<u64>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub duration_secs: Option<u64>,
    pub uploaded_at_ms: u64,
    #[serde(default)]
    pub channel: Option<ChannelDetails>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CandidateItem {
    /// Platform-scoped identity used for deduplication.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{}:{}", self.platform.as_str(), self.id)
    }

    /// Channel grouping key: the creator id, or the display name when no id is known.
    #[must_use]
    pub fn channel_key(&self) -> &str {
        self.creator_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(self.creator_name.as_str())
    }

    #[must_use]
    pub fn channel_created_at_ms(&self) -> Option<u64> {
        self.channel.as_ref().and_then(|c| c.created_at_ms)
    }

    #[must_use]
    pub fn channel_video_count(&self) -> Option<u64> {
        self.channel.as_ref().and_then(|c| c.video_count)
    }
}

/// A filter the engine could not apply to every result on a page.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterWarning {
    /// Channels were derived by grouping items, so their creation date is unknown and the
    /// channel-created-date range was not enforced.
    ChannelCreatedDateUnenforced,
}

impl FilterWarning {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ChannelCreatedDateUnenforced => {
                "channel creation date filter skipped: channels were grouped from items"
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ResultPage {
    pub items: Vec<CandidateItem>,
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FilterWarning>,
}

impl ResultPage {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            warnings: Vec::new(),
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}
