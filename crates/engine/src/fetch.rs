use trendscout_protocol::{
    CandidateItem, ChannelSearchRequest, FilterSpec, ItemSearchRequest, SortKey, TrendingRequest,
    UpstreamBatch, UpstreamClient, UpstreamError, UpstreamOrder,
};

use crate::config::EngineConfig;
use crate::dedup::Deduplicator;
use crate::filters::FilterPipeline;
use crate::planner::{FetchPlan, FetchSource};
use crate::window::TimeBounds;

/// Where the upstream cursor stood when the call began.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResumePoint {
    pub continuation_token: Option<String>,
    pub upstream_exhausted: bool,
}

#[derive(Debug)]
pub(crate) struct FetchOutcome {
    /// Filtered, deduplicated items in arrival order.
    pub fresh: Vec<CandidateItem>,
    pub continuation_token: Option<String>,
    pub upstream_exhausted: bool,
    pub upstream_calls: u32,
    pub budget_exhausted: bool,
}

#[must_use]
pub fn upstream_order(sort: SortKey) -> UpstreamOrder {
    match sort {
        SortKey::Date => UpstreamOrder::Date,
        SortKey::Views => UpstreamOrder::ViewCount,
        SortKey::Subscribers | SortKey::Trending => UpstreamOrder::Relevance,
    }
}

/// Sequential upstream fetch loop for one invocation.
pub(crate) struct FetchLoop<'a> {
    upstream: &'a dyn UpstreamClient,
    plan: &'a FetchPlan,
    pipeline: &'a FilterPipeline,
    page_size: u32,
    query: String,
    order: UpstreamOrder,
    published_after_ms: Option<u64>,
    language: Option<String>,
    region: String,
    category: String,
}

impl<'a> FetchLoop<'a> {
    pub(crate) fn new(
        upstream: &'a dyn UpstreamClient,
        spec: &FilterSpec,
        plan: &'a FetchPlan,
        pipeline: &'a FilterPipeline,
        config: &EngineConfig,
        now_ms: u64,
    ) -> Self {
        Self {
            upstream,
            plan,
            pipeline,
            page_size: config.upstream_page_size,
            query: spec.upstream_query().unwrap_or_default(),
            order: upstream_order(spec.sort),
            published_after_ms: TimeBounds::for_uploads(spec, now_ms).after_ms,
            language: spec.language_code().map(str::to_string),
            region: spec
                .country_code()
                .map_or_else(|| config.default_region.clone(), str::to_ascii_uppercase),
            category: spec
                .category_id()
                .map_or_else(|| config.default_category.clone(), str::to_string),
        }
    }

    /// Calls the upstream until the pool (`carried` plus fresh admissions) reaches the plan's
    /// target, the upstream runs dry, or the safety budget is spent. An upstream error aborts
    /// the loop and is returned as is.
    pub(crate) async fn run(
        &self,
        resume: ResumePoint,
        carried: usize,
        dedup: &mut Deduplicator<'_>,
    ) -> Result<FetchOutcome, UpstreamError> {
        let target = self.plan.effective_pool_target;
        let budget = self.plan.safety_page_budget;
        let source = self.plan.source.as_str();

        let mut token = resume.continuation_token;
        let mut exhausted = resume.upstream_exhausted;
        let mut fresh: Vec<CandidateItem> = Vec::new();
        let mut calls = 0u32;

        while !exhausted && carried + fresh.len() < target && calls < budget {
            let batch = self.call(token.clone()).await?;
            calls += 1;

            let received = batch.items.len();
            let filtered = self.pipeline.apply(batch.items);
            let passed = filtered.len();
            let admitted = dedup.admit(filtered);
            log::debug!(
                "Upstream call {calls}/{budget} ({source}): received={received} passed_filters={passed} new={} pool={}/{target}",
                admitted.len(),
                carried + fresh.len() + admitted.len(),
            );
            fresh.extend(admitted);

            match batch.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => token = Some(next),
                None => {
                    token = None;
                    exhausted = true;
                }
            }
        }

        let budget_exhausted = calls >= budget && !exhausted && carried + fresh.len() < target;
        if budget_exhausted {
            log::debug!("Safety budget of {budget} upstream calls spent before reaching {target}");
        }

        Ok(FetchOutcome {
            fresh,
            continuation_token: token,
            upstream_exhausted: exhausted,
            upstream_calls: calls,
            budget_exhausted,
        })
    }

    async fn call(&self, page_token: Option<String>) -> Result<UpstreamBatch, UpstreamError> {
        match self.plan.source {
            FetchSource::ChannelSearch => {
                self.upstream
                    .search_channels(ChannelSearchRequest {
                        query: self.query.clone(),
                        page_size: self.page_size,
                        order: self.order,
                        page_token,
                    })
                    .await
            }
            FetchSource::ItemSearch => {
                self.upstream
                    .search_items(ItemSearchRequest {
                        query: self.query.clone(),
                        page_size: self.page_size,
                        order: self.order,
                        published_after_ms: self.published_after_ms,
                        page_token,
                        language: self.language.clone(),
                    })
                    .await
            }
            FetchSource::Trending => {
                self.upstream
                    .trending_items(TrendingRequest {
                        page_size: self.page_size,
                        region: self.region.clone(),
                        category: self.category.clone(),
                        page_token,
                    })
                    .await
            }
        }
    }
}
