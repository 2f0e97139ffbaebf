use std::num::NonZeroUsize;
use std::time::{SystemTime, UNIX_EPOCH};

use trendscout_protocol::{
    CandidateItem, FilterSpec, ResultPage, SearchMode, UpstreamClient, UpstreamError,
};

use crate::channels::{shape_channels, ChannelFilterStage};
use crate::config::EngineConfig;
use crate::dedup::Deduplicator;
use crate::error::Result;
use crate::fetch::{FetchLoop, FetchOutcome, ResumePoint};
use crate::filters::FilterPipeline;
use crate::pager::{infer_has_more, HasMoreSignals, PageCut};
use crate::planner::FetchPlan;
use crate::query_key::QueryKey;
use crate::session::SessionStore;
use crate::sort::sort_pool;

/// Adaptive fetch/aggregate/paginate engine.
///
/// Owns the pagination sessions; callers keep one `Aggregator` for the lifetime of the UI
/// and pass the upstream client per call.
pub struct Aggregator {
    config: EngineConfig,
    sessions: SessionStore,
}

impl Aggregator {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.session_capacity).unwrap_or(NonZeroUsize::MIN);
        let sessions = SessionStore::new(capacity, config.session_ttl());
        Ok(Self { config, sessions })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Produces the next page for `spec`. `page == 1` restarts the query's session.
    ///
    /// Upstream failures are returned unchanged and leave the session as it was before the call.
    pub async fn fetch_page(
        &self,
        spec: &FilterSpec,
        upstream: &dyn UpstreamClient,
    ) -> std::result::Result<ResultPage, UpstreamError> {
        self.fetch_page_at(spec, upstream, unix_ms_now()).await
    }

    /// [`Aggregator::fetch_page`] with an explicit clock.
    pub async fn fetch_page_at(
        &self,
        spec: &FilterSpec,
        upstream: &dyn UpstreamClient,
        now_ms: u64,
    ) -> std::result::Result<ResultPage, UpstreamError> {
        let key = QueryKey::from_spec(spec);
        let page_size = spec.effective_page_size();
        if page_size != spec.page_size {
            log::warn!("Page size {} clamped to {page_size}", spec.page_size);
        }
        let plan = FetchPlan::for_spec(spec, &self.config);
        let pipeline = FilterPipeline::new(spec, now_ms);
        let channel_stage = ChannelFilterStage::new(spec, now_ms);
        let mut warnings = Vec::new();

        let mut session = self.sessions.checkout(&key, spec.is_first_page()).await;

        // The buffer was filtered under the request that produced it; client-side filters may
        // have changed since without changing the key.
        let carried: Vec<CandidateItem> = match spec.mode {
            SearchMode::Item => pipeline.apply(session.overflow().to_vec()),
            SearchMode::Channel => {
                channel_stage.apply(session.overflow().to_vec(), !plan.groups_channels, &mut warnings)
            }
        };
        let resume = ResumePoint {
            continuation_token: session.continuation_token().map(str::to_string),
            upstream_exhausted: session.upstream_exhausted(),
        };

        let (outcome, shaped, admitted) = {
            let mut dedup = Deduplicator::new(session.seen());
            let mut outcome = FetchLoop::new(upstream, spec, &plan, &pipeline, &self.config, now_ms)
                .run(resume, carried.len(), &mut dedup)
                .await?;
            let fresh = std::mem::take(&mut outcome.fresh);
            let shaped = match spec.mode {
                SearchMode::Item => fresh,
                SearchMode::Channel => shape_channels(
                    fresh,
                    plan.groups_channels,
                    &channel_stage,
                    &mut dedup,
                    &mut warnings,
                ),
            };
            (outcome, shaped, dedup.into_admitted())
        };
        let FetchOutcome {
            continuation_token,
            upstream_exhausted,
            upstream_calls,
            budget_exhausted,
            ..
        } = outcome;

        let mut pool = carried;
        pool.extend(shaped);
        sort_pool(&mut pool, spec.sort, now_ms);

        let cut = PageCut::split(pool, page_size);
        let has_more = infer_has_more(&HasMoreSignals {
            buffered: cut.overflow.len(),
            continuation_token_retained: continuation_token.is_some(),
            budget_exhausted,
            page_len: cut.page.len(),
            page_size,
            upstream_calls,
        });

        log::info!(
            "Query {key} page {}: returned={} buffered={} upstream_calls={upstream_calls}/{} has_more={has_more}",
            spec.page,
            cut.page.len(),
            cut.overflow.len(),
            plan.safety_page_budget,
        );

        session.commit(admitted, continuation_token, upstream_exhausted, cut.overflow);

        Ok(ResultPage {
            items: cut.page,
            has_more,
            warnings,
        })
    }
}

fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
