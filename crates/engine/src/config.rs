use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

const MAX_UPSTREAM_PAGE_SIZE: u32 = 50;
const MAX_CALL_BUDGET: u32 = 100;

/// Upstream call budgets per filter-activity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetTiers {
    pub low_calls: u32,
    pub medium_calls: u32,
    pub high_calls: u32,
    /// Active filter count at which the medium tier starts.
    pub medium_from: usize,
    /// Active filter count at which the high tier starts.
    pub high_from: usize,
}

impl Default for BudgetTiers {
    fn default() -> Self {
        Self {
            low_calls: 3,
            medium_calls: 6,
            high_calls: 10,
            medium_from: 2,
            high_from: 4,
        }
    }
}

/// Over-fetch multipliers for channel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelMultipliers {
    /// Channels fetched directly from channel search.
    pub direct: usize,
    /// Channels derived by grouping items.
    pub grouped: usize,
    /// Applied on top of either base when channel-specific filters are active.
    pub channel_filter_factor: usize,
}

impl Default for ChannelMultipliers {
    fn default() -> Self {
        Self {
            direct: 2,
            grouped: 5,
            channel_filter_factor: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub budget: BudgetTiers,
    pub multipliers: ChannelMultipliers,
    /// Results requested per upstream call.
    pub upstream_page_size: u32,
    /// Region used for trending fetches when the request names no country.
    pub default_region: String,
    /// Category used for trending fetches when the request names none.
    pub default_category: String,
    pub session_capacity: usize,
    pub session_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: BudgetTiers::default(),
            multipliers: ChannelMultipliers::default(),
            upstream_page_size: MAX_UPSTREAM_PAGE_SIZE,
            default_region: "US".to_string(),
            default_category: "0".to_string(),
            session_capacity: 256,
            session_ttl_secs: 60 * 60,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Base config from `TRENDSCOUT_CONFIG` (or defaults), then per-field env overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`EngineConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = match env_value(&lookup, "TRENDSCOUT_CONFIG") {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(v) = env_parsed::<usize>(&lookup, "TRENDSCOUT_SESSION_CAPACITY") {
            cfg.session_capacity = v;
        }
        if let Some(v) = env_parsed::<u64>(&lookup, "TRENDSCOUT_SESSION_TTL_SECS") {
            cfg.session_ttl_secs = v;
        }
        if let Some(v) = env_parsed::<u32>(&lookup, "TRENDSCOUT_UPSTREAM_PAGE_SIZE") {
            let clamped = v.clamp(1, MAX_UPSTREAM_PAGE_SIZE);
            if clamped != v {
                log::warn!("TRENDSCOUT_UPSTREAM_PAGE_SIZE={v} clamped to {clamped}");
            }
            cfg.upstream_page_size = clamped;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_capacity == 0 {
            return Err(ConfigError::Invalid(
                "session_capacity must be at least 1".to_string(),
            ));
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "session_ttl_secs must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_UPSTREAM_PAGE_SIZE).contains(&self.upstream_page_size) {
            return Err(ConfigError::Invalid(format!(
                "upstream_page_size {} is outside 1..={MAX_UPSTREAM_PAGE_SIZE}",
                self.upstream_page_size
            )));
        }

        let b = &self.budget;
        for (name, calls) in [
            ("budget.low_calls", b.low_calls),
            ("budget.medium_calls", b.medium_calls),
            ("budget.high_calls", b.high_calls),
        ] {
            if calls == 0 || calls > MAX_CALL_BUDGET {
                return Err(ConfigError::Invalid(format!(
                    "{name} {calls} is outside 1..={MAX_CALL_BUDGET}"
                )));
            }
        }
        if b.low_calls > b.medium_calls || b.medium_calls > b.high_calls {
            return Err(ConfigError::Invalid(
                "budget tiers must not decrease (low <= medium <= high)".to_string(),
            ));
        }
        if b.medium_from > b.high_from {
            return Err(ConfigError::Invalid(
                "budget.medium_from must not exceed budget.high_from".to_string(),
            ));
        }

        let m = &self.multipliers;
        if m.direct == 0 || m.grouped == 0 || m.channel_filter_factor == 0 {
            return Err(ConfigError::Invalid(
                "channel multipliers must be at least 1".to_string(),
            ));
        }

        if self.default_region.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_region must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn env_value(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = env_value(lookup, name)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {name}={raw}: not a valid number");
            None
        }
    }
}
