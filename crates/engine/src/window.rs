use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use trendscout_protocol::{DateRange, FilterSpec, UploadWindow};

pub(crate) const DAY_MS: u64 = 86_400_000;
pub(crate) const YEAR_MS: u64 = 365 * DAY_MS;

/// Half-open time interval `[after_ms, before_ms)` in unix milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeBounds {
    pub after_ms: Option<u64>,
    pub before_ms: Option<u64>,
}

impl TimeBounds {
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.after_ms.is_none() && self.before_ms.is_none()
    }

    #[must_use]
    pub fn contains(&self, ts_ms: u64) -> bool {
        self.after_ms.map_or(true, |after| ts_ms >= after)
            && self.before_ms.map_or(true, |before| ts_ms < before)
    }

    /// Inclusive user date range. A date-only end covers that whole day.
    /// Unparseable bounds are dropped with a warning.
    pub(crate) fn from_range(field: &str, range: &DateRange) -> Self {
        let after_ms = parse_bound(field, "start", range.start.as_deref()).map(|(ms, _)| ms);
        let before_ms = parse_bound(field, "end", range.end.as_deref()).map(|(ms, date_only)| {
            if date_only {
                ms.saturating_add(DAY_MS)
            } else {
                ms.saturating_add(1)
            }
        });
        Self {
            after_ms,
            before_ms,
        }
    }

    /// Upload window of an item search: the latest of the window lookback, the custom start
    /// and the 24h flag bounds it below; a custom end bounds it above.
    pub(crate) fn for_uploads(spec: &FilterSpec, now_ms: u64) -> Self {
        let items = &spec.items;
        let mut bounds = if items.upload_window == UploadWindow::Custom {
            Self::from_range("custom upload range", &items.custom_range)
        } else {
            Self::default()
        };

        let lookback = items
            .upload_window
            .lookback_days()
            .map(|days| now_ms.saturating_sub(days * DAY_MS));
        let recent = items.trending_24h.then(|| now_ms.saturating_sub(DAY_MS));

        bounds.after_ms = [bounds.after_ms, lookback, recent].into_iter().flatten().max();
        bounds
    }
}

/// True when at least one end of `range` parses; a range of typos filters nothing.
pub(crate) fn has_parseable_bound(range: &DateRange) -> bool {
    [range.start.as_deref(), range.end.as_deref()]
        .into_iter()
        .flatten()
        .any(|raw| parse_date(raw).is_some())
}

/// Parses `YYYY-MM-DD` (midnight UTC) or RFC 3339. Pre-epoch instants are rejected.
pub(crate) fn parse_date_ms(raw: &str) -> Option<u64> {
    parse_date(raw).map(|(ms, _)| ms)
}

fn parse_date(raw: &str) -> Option<(u64, bool)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return u64::try_from(dt.timestamp_millis()).ok().map(|ms| (ms, false));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let ms = Utc.from_utc_datetime(&midnight).timestamp_millis();
    u64::try_from(ms).ok().map(|ms| (ms, true))
}

fn parse_bound(field: &str, side: &str, raw: Option<&str>) -> Option<(u64, bool)> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        log::warn!("Ignoring unparseable {field} {side} '{raw}'");
    }
    parsed
}
