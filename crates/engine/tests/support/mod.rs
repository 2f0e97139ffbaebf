#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use trendscout_protocol::{
    CandidateItem, ChannelSearchRequest, ItemSearchRequest, Platform, TrendingRequest,
    UpstreamBatch, UpstreamClient, UpstreamError,
};

pub const NOW: u64 = 1_700_000_000_000;
pub const HOUR_MS: u64 = 3_600_000;
pub const DAY_MS: u64 = 24 * HOUR_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Items(ItemSearchRequest),
    Channels(ChannelSearchRequest),
    Trending(TrendingRequest),
}

impl Recorded {
    pub fn page_token(&self) -> Option<&str> {
        match self {
            Self::Items(r) => r.page_token.as_deref(),
            Self::Channels(r) => r.page_token.as_deref(),
            Self::Trending(r) => r.page_token.as_deref(),
        }
    }
}

/// Upstream that replays a fixed script of responses, one per call regardless of operation.
/// Once the script runs out every call returns an empty final batch.
#[derive(Default)]
pub struct ScriptedUpstream {
    script: Mutex<VecDeque<Result<UpstreamBatch, UpstreamError>>>,
    requests: Mutex<Vec<Recorded>>,
    /// Zero-based call index that never completes; cleared once hit.
    stall_at: Mutex<Option<usize>>,
}

impl ScriptedUpstream {
    pub fn new(script: impl IntoIterator<Item = Result<UpstreamBatch, UpstreamError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            stall_at: Mutex::new(None),
        }
    }

    /// Makes call number `call` (zero-based) hang forever, leaving the script untouched.
    pub fn stall_at(self, call: usize) -> Self {
        *self.stall_at.lock().expect("stall lock") = Some(call);
        self
    }

    pub fn push(&self, response: Result<UpstreamBatch, UpstreamError>) {
        self.script.lock().expect("script lock").push_back(response);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    async fn next(&self, request: Recorded) -> Result<UpstreamBatch, UpstreamError> {
        let stalls = {
            let mut requests = self.requests.lock().expect("requests lock");
            requests.push(request);
            let call = requests.len() - 1;
            let mut stall_at = self.stall_at.lock().expect("stall lock");
            let hit = *stall_at == Some(call);
            if hit {
                *stall_at = None;
            }
            hit
        };
        if stalls {
            std::future::pending::<()>().await;
        }
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Ok(UpstreamBatch::default()))
    }
}

#[async_trait]
impl UpstreamClient for ScriptedUpstream {
    async fn search_items(&self, request: ItemSearchRequest) -> Result<UpstreamBatch, UpstreamError> {
        self.next(Recorded::Items(request)).await
    }

    async fn search_channels(
        &self,
        request: ChannelSearchRequest,
    ) -> Result<UpstreamBatch, UpstreamError> {
        self.next(Recorded::Channels(request)).await
    }

    async fn trending_items(&self, request: TrendingRequest) -> Result<UpstreamBatch, UpstreamError> {
        self.next(Recorded::Trending(request)).await
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn item(id: &str, views: u64) -> CandidateItem {
    CandidateItem {
        id: id.to_string(),
        platform: Platform::Youtube,
        title: format!("Video {id}"),
        description: None,
        thumbnail_url: None,
        url: format!("https://www.youtube.com/watch?v={id}"),
        creator_id: Some(format!("UC-{id}")),
        creator_name: format!("Creator {id}"),
        creator_avatar_url: None,
        subscriber_count: Some(1_000),
        view_count: views,
        like_count: None,
        comment_count: None,
        duration_secs: Some(300),
        uploaded_at_ms: NOW - HOUR_MS,
        channel: None,
        country: None,
        language: None,
        category: None,
        tags: Vec::new(),
    }
}

pub fn item_from(id: &str, channel: &str, views: u64) -> CandidateItem {
    CandidateItem {
        creator_id: Some(channel.to_string()),
        creator_name: format!("Channel {channel}"),
        ..item(id, views)
    }
}

/// `count` items named `{prefix}{n}` with strictly decreasing views, so a views sort keeps
/// them in order.
pub fn items(prefix: &str, count: usize, top_views: u64) -> Vec<CandidateItem> {
    (0..count)
        .map(|n| item(&format!("{prefix}{n}"), top_views - n as u64))
        .collect()
}

pub fn batch(items: Vec<CandidateItem>, token: Option<&str>) -> Result<UpstreamBatch, UpstreamError> {
    Ok(UpstreamBatch::new(items, token.map(str::to_string)))
}

pub fn ids(items: &[CandidateItem]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}
