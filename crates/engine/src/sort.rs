use std::cmp::Ordering;

use trendscout_protocol::{CandidateItem, SortKey};

const HOUR_MS: u64 = 3_600_000;

/// Views per hour since upload. Ages under one hour count as one hour.
#[must_use]
pub fn velocity(item: &CandidateItem, now_ms: u64) -> f64 {
    let age_ms = now_ms.saturating_sub(item.uploaded_at_ms).max(HOUR_MS);
    item.view_count as f64 / (age_ms as f64 / HOUR_MS as f64)
}

/// Orders the pool descending by `key`. The sort is stable: ties keep insertion order.
pub fn sort_pool(pool: &mut [CandidateItem], key: SortKey, now_ms: u64) {
    match key {
        SortKey::Date => pool.sort_by(|a, b| b.uploaded_at_ms.cmp(&a.uploaded_at_ms)),
        SortKey::Views => pool.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
        SortKey::Subscribers => pool.sort_by(|a, b| {
            b.subscriber_count
                .unwrap_or(0)
                .cmp(&a.subscriber_count.unwrap_or(0))
        }),
        SortKey::Trending => pool.sort_by(|a, b| {
            velocity(b, now_ms)
                .partial_cmp(&velocity(a, now_ms))
                .unwrap_or(Ordering::Equal)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trendscout_protocol::Platform;

    const NOW: u64 = 1_700_000_000_000;

    fn item(id: &str, views: u64, subs: Option<u64>, age_hours: u64) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            platform: Platform::Youtube,
            title: String::new(),
            description: None,
            thumbnail_url: None,
            url: String::new(),
            creator_id: None,
            creator_name: "c".to_string(),
            creator_avatar_url: None,
            subscriber_count: subs,
            view_count: views,
            like_count: None,
            comment_count: None,
            duration_secs: None,
            uploaded_at_ms: NOW - age_hours * HOUR_MS,
            channel: None,
            country: None,
            language: None,
            category: None,
            tags: Vec::new(),
        }
    }

    fn ids(pool: &[CandidateItem]) -> Vec<&str> {
        pool.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn views_sort_is_stable() {
        let mut pool = vec![
            item("a", 10, None, 1),
            item("b", 50, None, 1),
            item("c", 10, None, 1),
            item("d", 50, None, 1),
        ];
        sort_pool(&mut pool, SortKey::Views, NOW);
        assert_eq!(ids(&pool), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn date_sort_newest_first() {
        let mut pool = vec![item("old", 1, None, 48), item("new", 1, None, 1), item("mid", 1, None, 5)];
        sort_pool(&mut pool, SortKey::Date, NOW);
        assert_eq!(ids(&pool), vec!["new", "mid", "old"]);
    }

    #[test]
    fn subscribers_treat_hidden_as_zero() {
        let mut pool = vec![item("hidden", 1, None, 1), item("big", 1, Some(9), 1), item("small", 1, Some(1), 1)];
        sort_pool(&mut pool, SortKey::Subscribers, NOW);
        assert_eq!(ids(&pool), vec!["big", "small", "hidden"]);
    }

    #[test]
    fn trending_prefers_fast_risers() {
        let mut pool = vec![
            item("slow", 10_000, None, 100),
            item("fast", 5_000, None, 2),
            item("fresh", 50, None, 0),
        ];
        sort_pool(&mut pool, SortKey::Trending, NOW);
        assert_eq!(ids(&pool), vec!["fast", "slow", "fresh"]);
    }

    #[test]
    fn velocity_is_monotonic_in_views_and_age() {
        let base = item("a", 1_000, None, 10);
        assert!(velocity(&item("b", 2_000, None, 10), NOW) > velocity(&base, NOW));
        assert!(velocity(&item("c", 1_000, None, 20), NOW) < velocity(&base, NOW));
        // Future timestamps clamp to the one-hour floor.
        let mut future = base.clone();
        future.uploaded_at_ms = NOW + HOUR_MS;
        assert_eq!(velocity(&future, NOW), 1_000.0);
    }
}
