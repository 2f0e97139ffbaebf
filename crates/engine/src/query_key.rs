use std::fmt;

use blake3::Hasher;
use trendscout_protocol::{FilterSpec, UploadWindow};

use crate::window::parse_date_ms;

const QUERY_KEY_VERSION: u32 = 1;

/// Signature of the upstream-shaping part of a [`FilterSpec`].
///
/// Specs that differ only in client-side filters (view ranges, durations, channel age...) map
/// to the same key and therefore share a pagination session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    #[must_use]
    pub fn from_spec(spec: &FilterSpec) -> Self {
        let canonical = canonical_query_shape(spec);
        let mut hasher = Hasher::new();
        hasher.update(canonical.as_bytes());
        let key = Self(hasher.finalize().to_hex().to_string());
        log::debug!("Query key {key} <- {canonical}");
        key
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0[..self.0.len().min(16)])
    }
}

fn canonical_query_shape(spec: &FilterSpec) -> String {
    let terms = spec.keyword_terms().join("\u{1f}");
    let platform = spec.platform.map_or("all", |p| p.as_str());
    let window = spec.items.upload_window;
    let custom_start = if window == UploadWindow::Custom {
        spec.items
            .custom_range
            .start
            .as_deref()
            .and_then(parse_date_ms)
            .map_or_else(|| "-".to_string(), |ms| ms.to_string())
    } else {
        "-".to_string()
    };
    let country = spec
        .country_code()
        .map(str::to_ascii_uppercase)
        .unwrap_or_default();
    let language = spec.language_code().unwrap_or_default();
    let category = spec.category_id().unwrap_or_default();

    format!(
        "v{QUERY_KEY_VERSION}|mode={}|platform={platform}|q={terms}|match={}|sort={}|window={}|start={custom_start}|24h={}|country={country}|lang={language}|cat={category}",
        spec.mode.as_str(),
        spec.keyword_match.as_str(),
        spec.sort.as_str(),
        window.as_str(),
        spec.items.trending_24h,
    )
}
