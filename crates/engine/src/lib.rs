mod aggregator;
mod channels;
mod config;
mod dedup;
mod error;
mod fetch;
mod filters;
mod pager;
mod planner;
mod query_key;
mod session;
mod sort;
mod window;

pub use aggregator::Aggregator;
pub use channels::{group_by_channel, AggregatedChannelRecord, ChannelFilterStage};
pub use config::{BudgetTiers, ChannelMultipliers, EngineConfig};
pub use dedup::Deduplicator;
pub use error::{ConfigError, Result};
pub use fetch::upstream_order;
pub use filters::FilterPipeline;
pub use pager::{infer_has_more, HasMoreSignals, PageCut};
pub use planner::{active_restrictive_filters, channel_filters_active, FetchPlan, FetchSource};
pub use query_key::QueryKey;
pub use session::{PaginationSession, SessionSnapshot, SessionStore};
pub use sort::{sort_pool, velocity};
pub use window::TimeBounds;
