use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Item,
    Channel,
}

impl SearchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Channel => "channel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
}

impl Platform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
            Self::Instagram => "instagram",
        }
    }
}

/// How keyword terms combine: `any` is OR, `all` is AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatch {
    #[default]
    Any,
    All,
}

impl KeywordMatch {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
        }
    }

    /// Operator placed between terms in the upstream query string.
    #[must_use]
    pub const fn joiner(self) -> &'static str {
        match self {
            Self::Any => "|",
            Self::All => " ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Trending,
    Date,
    Views,
    Subscribers,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::Date => "date",
            Self::Views => "views",
            Self::Subscribers => "subscribers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadWindow {
    #[default]
    AnyTime,
    Today,
    ThisWeek,
    ThisMonth,
    ThreeMonths,
    ThisYear,
    /// Use [`ItemFilters::custom_range`].
    Custom,
}

impl UploadWindow {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnyTime => "any_time",
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::ThisMonth => "this_month",
            Self::ThreeMonths => "three_months",
            Self::ThisYear => "this_year",
            Self::Custom => "custom",
        }
    }

    #[must_use]
    pub const fn lookback_days(self) -> Option<u64> {
        match self {
            Self::Today => Some(1),
            Self::ThisWeek => Some(7),
            Self::ThisMonth => Some(30),
            Self::ThreeMonths => Some(90),
            Self::ThisYear => Some(365),
            Self::AnyTime | Self::Custom => None,
        }
    }
}

/// Inclusive date range. Bounds are `YYYY-MM-DD` or RFC 3339 strings as typed by the user;
/// unparseable bounds are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl DateRange {
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        fn blank(raw: Option<&String>) -> bool {
            raw.map_or(true, |v| v.trim().is_empty())
        }
        blank(self.start.as_ref()) && blank(self.end.as_ref())
    }
}

/// Inclusive count range; `max: None` means unbounded above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CountRange {
    #[serde(default)]
    pub min: u64,
    #[serde(default)]
    pub max: Option<u64>,
}

impl CountRange {
    #[must_use]
    pub const fn new(min: u64, max: Option<u64>) -> Self {
        Self { min, max }
    }

    /// True when the range covers the whole domain and therefore restricts nothing.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.min == 0 && self.max.is_none()
    }

    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

/// Canonical duration brackets. Each is a half-open interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DurationBracket {
    /// `[0, 60)`
    UnderOneMinute,
    /// `[60, 300)`
    OneToFiveMinutes,
    /// `[300, 1200)`
    FiveToTwentyMinutes,
    /// `[1200, ∞)`
    OverTwentyMinutes,
}

impl DurationBracket {
    pub const ALL: [Self; 4] = [
        Self::UnderOneMinute,
        Self::OneToFiveMinutes,
        Self::FiveToTwentyMinutes,
        Self::OverTwentyMinutes,
    ];

    #[must_use]
    pub const fn bounds(self) -> (u64, Option<u64>) {
        match self {
            Self::UnderOneMinute => (0, Some(60)),
            Self::OneToFiveMinutes => (60, Some(300)),
            Self::FiveToTwentyMinutes => (300, Some(1200)),
            Self::OverTwentyMinutes => (1200, None),
        }
    }

    #[must_use]
    pub const fn contains(self, secs: u64) -> bool {
        let (lo, hi) = self.bounds();
        match hi {
            Some(hi) => secs >= lo && secs < hi,
            None => secs >= lo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChannelAge {
    #[default]
    Any,
    UnderOneYear,
    UnderThreeYears,
    UnderFiveYears,
    UnderTenYears,
}

impl ChannelAge {
    #[must_use]
    pub const fn max_years(self) -> Option<u64> {
        match self {
            Self::Any => None,
            Self::UnderOneYear => Some(1),
            Self::UnderThreeYears => Some(3),
            Self::UnderFiveYears => Some(5),
            Self::UnderTenYears => Some(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MonetizationState {
    #[default]
    Any,
    Monetized,
    NotMonetized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct MonetizationFilter {
    #[serde(default)]
    pub state: MonetizationState,
    /// Only channels monetized within this many months.
    #[serde(default)]
    pub max_age_months: Option<u32>,
}

impl MonetizationFilter {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, MonetizationState::Any) || self.max_age_months.is_some()
    }
}

/// Category exclusion flags. Category ids follow the upstream's numeric vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CategoryExclusions {
    #[serde(default)]
    pub music: bool,
    #[serde(default)]
    pub gaming: bool,
    #[serde(default)]
    pub sports: bool,
    #[serde(default)]
    pub news: bool,
    /// Additional raw category ids to drop.
    #[serde(default)]
    pub other: Vec<String>,
}

impl CategoryExclusions {
    #[must_use]
    pub fn excluded_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = [
            (self.music, "10"),
            (self.sports, "17"),
            (self.gaming, "20"),
            (self.news, "25"),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, id)| id.to_string())
        .collect();
        for raw in &self.other {
            let id = raw.trim();
            if !id.is_empty() && !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ItemFilters {
    #[serde(default)]
    pub upload_window: UploadWindow,
    #[serde(default)]
    pub custom_range: DateRange,
    #[serde(default)]
    pub views: CountRange,
    #[serde(default)]
    pub durations: Vec<DurationBracket>,
    #[serde(default)]
    pub trending_24h: bool,
    #[serde(default)]
    pub excluded_categories: CategoryExclusions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ChannelFilters {
    #[serde(default)]
    pub subscribers: CountRange,
    #[serde(default)]
    pub video_count: CountRange,
    #[serde(default)]
    pub channel_age: ChannelAge,
    #[serde(default)]
    pub monetization: MonetizationFilter,
    /// Average video length in seconds.
    #[serde(default)]
    pub average_video_length: CountRange,
    #[serde(default)]
    pub created: DateRange,
}

/// Everything the UI asks for in one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FilterSpec {
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Comma or semicolon delimited terms.
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub keyword_match: KeywordMatch,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub items: ItemFilters,
    #[serde(default)]
    pub channels: ChannelFilters,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Upstream category used for trending fetches.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            platform: None,
            keywords: String::new(),
            keyword_match: KeywordMatch::default(),
            sort: SortKey::default(),
            items: ItemFilters::default(),
            channels: ChannelFilters::default(),
            country: None,
            language: None,
            category: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl FilterSpec {
    /// Trimmed, non-empty keyword terms in the order typed.
    #[must_use]
    pub fn keyword_terms(&self) -> Vec<&str> {
        self.keywords
            .split([',', ';'])
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .collect()
    }

    /// Upstream query string, or `None` when there are no keywords.
    #[must_use]
    pub fn upstream_query(&self) -> Option<String> {
        let terms = self.keyword_terms();
        if terms.is_empty() {
            return None;
        }
        Some(terms.join(self.keyword_match.joiner()))
    }

    #[must_use]
    pub fn is_first_page(&self) -> bool {
        self.page <= 1
    }

    /// `page_size` clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        non_blank(self.country.as_deref())
    }

    #[must_use]
    pub fn language_code(&self) -> Option<&str> {
        non_blank(self.language.as_deref())
    }

    #[must_use]
    pub fn category_id(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

const fn default_page() -> u32 {
    1
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
