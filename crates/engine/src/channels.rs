use std::collections::HashMap;

use trendscout_protocol::{
    CandidateItem, ChannelDetails, CountRange, FilterSpec, FilterWarning, MonetizationFilter,
    MonetizationState,
};

use crate::dedup::Deduplicator;
use crate::window::{TimeBounds, DAY_MS};

const MONTH_MS: u64 = 30 * DAY_MS;

/// One channel derived from the items sampled for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedChannelRecord {
    pub channel_key: String,
    /// Highest view-count item; supplies display fields and the channel-view fallback.
    pub representative: CandidateItem,
    /// Mean duration over sampled items with a known duration.
    pub average_video_length_secs: u64,
    /// Latest upload among the sampled items.
    pub last_updated_ms: u64,
    pub sampled: usize,
}

impl AggregatedChannelRecord {
    fn from_group(channel_key: String, items: Vec<CandidateItem>) -> Option<Self> {
        let durations: Vec<u64> = items.iter().filter_map(|i| i.duration_secs).collect();
        let average_video_length_secs = if durations.is_empty() {
            0
        } else {
            let total: u128 = durations.iter().map(|d| u128::from(*d)).sum();
            let count = durations.len() as u128;
            u64::try_from((total + count / 2) / count).unwrap_or(u64::MAX)
        };
        let last_updated_ms = items.iter().map(|i| i.uploaded_at_ms).max()?;
        let sampled = items.len();

        // Earliest item wins view-count ties.
        let representative = items
            .into_iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.view_count.cmp(&b.view_count).then(ib.cmp(ia)))
            .map(|(_, item)| item)?;

        Some(Self {
            channel_key,
            representative,
            average_video_length_secs,
            last_updated_ms,
            sampled,
        })
    }

    /// Reshapes the record into a channel-shaped [`CandidateItem`].
    #[must_use]
    pub fn into_candidate(self) -> CandidateItem {
        let rep = self.representative;
        let details = rep.channel.clone().unwrap_or_default();
        let view_count = details.total_views.unwrap_or(rep.view_count);
        CandidateItem {
            id: self.channel_key,
            platform: rep.platform,
            title: rep.creator_name.clone(),
            description: None,
            thumbnail_url: rep.creator_avatar_url.clone().or(rep.thumbnail_url),
            url: rep.url,
            creator_id: rep.creator_id,
            creator_name: rep.creator_name,
            creator_avatar_url: rep.creator_avatar_url,
            subscriber_count: rep.subscriber_count,
            view_count,
            like_count: None,
            comment_count: None,
            duration_secs: Some(self.average_video_length_secs),
            uploaded_at_ms: self.last_updated_ms,
            channel: Some(ChannelDetails {
                average_video_length_secs: Some(self.average_video_length_secs),
                total_views: Some(view_count),
                ..details
            }),
            country: rep.country,
            language: rep.language,
            category: rep.category,
            tags: rep.tags,
        }
    }
}

/// Groups items by channel, keeping channels in order of first appearance.
#[must_use]
pub fn group_by_channel(items: Vec<CandidateItem>) -> Vec<AggregatedChannelRecord> {
    let mut order: Vec<(String, Vec<CandidateItem>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for item in items {
        let key = item.channel_key().to_string();
        match index.get(&key) {
            Some(&pos) => order[pos].1.push(item),
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, vec![item]));
            }
        }
    }
    order
        .into_iter()
        .filter_map(|(key, items)| AggregatedChannelRecord::from_group(key, items))
        .collect()
}

/// Channel-level filters applied after grouping or pass-through.
#[derive(Debug, Clone)]
pub struct ChannelFilterStage {
    average_video_length: CountRange,
    video_count: CountRange,
    created: TimeBounds,
    monetization: MonetizationFilter,
    now_ms: u64,
}

impl ChannelFilterStage {
    #[must_use]
    pub fn new(spec: &FilterSpec, now_ms: u64) -> Self {
        let channels = &spec.channels;
        Self {
            average_video_length: channels.average_video_length,
            video_count: channels.video_count,
            created: TimeBounds::from_range("channel created range", &channels.created),
            monetization: channels.monetization,
            now_ms,
        }
    }

    /// `created_enforceable` is false for channels grouped from items: they carry no reliable
    /// creation date, so the created range is skipped and reported as a warning.
    pub fn apply(
        &self,
        channels: Vec<CandidateItem>,
        created_enforceable: bool,
        warnings: &mut Vec<FilterWarning>,
    ) -> Vec<CandidateItem> {
        let enforce_created = !self.created.is_unbounded() && created_enforceable;
        if !self.created.is_unbounded() && !created_enforceable {
            let warning = FilterWarning::ChannelCreatedDateUnenforced;
            log::warn!("{}", warning.message());
            push_unique(warnings, warning);
        }

        channels
            .into_iter()
            .filter(|channel| {
                self.average_length_matches(channel)
                    && self.video_count_matches(channel)
                    && (!enforce_created || self.created_matches(channel))
                    && self.monetization_matches(channel)
            })
            .collect()
    }

    fn average_length_matches(&self, channel: &CandidateItem) -> bool {
        if self.average_video_length.is_full() {
            return true;
        }
        channel
            .channel
            .as_ref()
            .and_then(|c| c.average_video_length_secs)
            .map_or(true, |avg| self.average_video_length.contains(avg))
    }

    fn video_count_matches(&self, channel: &CandidateItem) -> bool {
        channel
            .channel_video_count()
            .map_or(true, |count| self.video_count.contains(count))
    }

    fn created_matches(&self, channel: &CandidateItem) -> bool {
        channel
            .channel_created_at_ms()
            .map_or(true, |created| self.created.contains(created))
    }

    /// Channels without monetization facts pass. Otherwise the state must match and, with an
    /// age limit, the start must be known and fall within it.
    fn monetization_matches(&self, channel: &CandidateItem) -> bool {
        if !self.monetization.is_active() {
            return true;
        }
        let Some(m) = channel.channel.as_ref().and_then(|c| c.monetization.as_ref()) else {
            return true;
        };
        let state_ok = match self.monetization.state {
            MonetizationState::Any => true,
            MonetizationState::Monetized => m.enabled,
            MonetizationState::NotMonetized => !m.enabled,
        };
        let age_ok = match (self.monetization.max_age_months, m.since_ms) {
            (Some(months), Some(since)) => {
                m.enabled && self.now_ms.saturating_sub(since) <= u64::from(months) * MONTH_MS
            }
            (Some(_), None) => false,
            (None, _) => true,
        };
        state_ok && age_ok
    }
}

/// Turns freshly fetched items into channel-shaped results.
///
/// Direct channel-search results pass through. Otherwise items are grouped and channels already
/// emitted or buffered earlier in the session are dropped; survivors are admitted by channel
/// identity so later pages cannot repeat them.
pub(crate) fn shape_channels(
    fresh: Vec<CandidateItem>,
    groups_channels: bool,
    stage: &ChannelFilterStage,
    dedup: &mut Deduplicator<'_>,
    warnings: &mut Vec<FilterWarning>,
) -> Vec<CandidateItem> {
    if !groups_channels {
        return stage.apply(fresh, true, warnings);
    }

    let raw = fresh.len();
    let grouped: Vec<CandidateItem> = group_by_channel(fresh)
        .into_iter()
        .map(AggregatedChannelRecord::into_candidate)
        .filter(|channel| !dedup.is_known(&channel.identity()))
        .collect();
    let grouped_len = grouped.len();

    let kept: Vec<CandidateItem> = stage
        .apply(grouped, false, warnings)
        .into_iter()
        .filter(|channel| dedup.admit_identity(channel.identity()))
        .collect();
    log::debug!(
        "Grouped {raw} items into {grouped_len} new channels, {} after channel filters",
        kept.len()
    );
    kept
}

fn push_unique(warnings: &mut Vec<FilterWarning>, warning: FilterWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
