use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CandidateItem;

/// Order vocabulary understood by the upstream search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpstreamOrder {
    #[serde(rename = "relevance")]
    Relevance,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "viewCount")]
    ViewCount,
}

impl UpstreamOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
            Self::ViewCount => "viewCount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSearchRequest {
    pub query: String,
    pub page_size: u32,
    pub order: UpstreamOrder,
    pub published_after_ms: Option<u64>,
    pub page_token: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSearchRequest {
    pub query: String,
    pub page_size: u32,
    pub order: UpstreamOrder,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingRequest {
    pub page_size: u32,
    pub region: String,
    pub category: String,
    pub page_token: Option<String>,
}

/// One upstream response page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamBatch {
    pub items: Vec<CandidateItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl UpstreamBatch {
    #[must_use]
    pub fn new(items: Vec<CandidateItem>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }
}

/// Failure of a single upstream call. The engine never retries or wraps these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// No response was received (DNS, TLS, timeout, connection reset).
    #[error("Upstream unreachable: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorClass {
    Network,
    Quota,
    Other,
}

impl UpstreamError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Coarse classification for presenting a retry affordance.
    #[must_use]
    pub const fn class(&self) -> UpstreamErrorClass {
        match self.status() {
            None => UpstreamErrorClass::Network,
            Some(403 | 429) => UpstreamErrorClass::Quota,
            Some(_) => UpstreamErrorClass::Other,
        }
    }
}

/// The external content API. Implementations own rate limits, auth and transport.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn search_items(&self, request: ItemSearchRequest) -> Result<UpstreamBatch, UpstreamError>;

    async fn search_channels(
        &self,
        request: ChannelSearchRequest,
    ) -> Result<UpstreamBatch, UpstreamError>;

    async fn trending_items(&self, request: TrendingRequest) -> Result<UpstreamBatch, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status() {
        assert_eq!(
            UpstreamError::Transport("reset".to_string()).class(),
            UpstreamErrorClass::Network
        );
        for status in [403, 429] {
            let err = UpstreamError::Status {
                status,
                message: "quotaExceeded".to_string(),
            };
            assert_eq!(err.class(), UpstreamErrorClass::Quota);
        }
        let err = UpstreamError::Status {
            status: 500,
            message: "backendError".to_string(),
        };
        assert_eq!(err.class(), UpstreamErrorClass::Other);
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn order_uses_upstream_vocabulary() {
        assert_eq!(UpstreamOrder::ViewCount.as_str(), "viewCount");
        let raw = serde_json::to_string(&UpstreamOrder::ViewCount).expect("serialize order");
        assert_eq!(raw, "\"viewCount\"");
    }
}
