use trendscout_protocol::CandidateItem;

/// A sorted pool cut into the returned page and the overflow carried to the next call.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCut {
    pub page: Vec<CandidateItem>,
    pub overflow: Vec<CandidateItem>,
}

impl PageCut {
    #[must_use]
    pub fn split(mut pool: Vec<CandidateItem>, page_size: usize) -> Self {
        let overflow = if pool.len() > page_size {
            pool.split_off(page_size)
        } else {
            Vec::new()
        };
        Self {
            page: pool,
            overflow,
        }
    }
}

/// Everything [`infer_has_more`] looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HasMoreSignals {
    pub buffered: usize,
    pub continuation_token_retained: bool,
    /// The loop stopped because it ran out of calls, not because it filled the pool or the
    /// upstream ran dry.
    pub budget_exhausted: bool,
    pub page_len: usize,
    pub page_size: usize,
    pub upstream_calls: u32,
}

/// Best-effort continuation signal.
///
/// True when items are buffered, the upstream can continue, the call budget ran out (probably
/// more behind it), or a full page came back from a call that reached the upstream.
#[must_use]
pub fn infer_has_more(signals: &HasMoreSignals) -> bool {
    signals.buffered > 0
        || signals.continuation_token_retained
        || signals.budget_exhausted
        || (signals.upstream_calls > 0 && signals.page_size > 0 && signals.page_len >= signals.page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendscout_protocol::Platform;

    fn pool(n: usize) -> Vec<CandidateItem> {
        (0..n)
            .map(|i| CandidateItem {
                id: format!("v{i}"),
                platform: Platform::Youtube,
                title: String::new(),
                description: None,
                thumbnail_url: None,
                url: String::new(),
                creator_id: None,
                creator_name: "c".to_string(),
                creator_avatar_url: None,
                subscriber_count: None,
                view_count: 0,
                like_count: None,
                comment_count: None,
                duration_secs: None,
                uploaded_at_ms: 0,
                channel: None,
                country: None,
                language: None,
                category: None,
                tags: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn splits_thirty_seven_into_ten_and_twenty_seven() {
        let cut = PageCut::split(pool(37), 10);
        assert_eq!(cut.page.len(), 10);
        assert_eq!(cut.overflow.len(), 27);
        assert_eq!(cut.page[9].id, "v9");
        assert_eq!(cut.overflow[0].id, "v10");
        assert!(infer_has_more(&HasMoreSignals {
            buffered: cut.overflow.len(),
            page_len: cut.page.len(),
            page_size: 10,
            ..HasMoreSignals::default()
        }));
    }

    #[test]
    fn short_pool_has_no_overflow() {
        let cut = PageCut::split(pool(4), 10);
        assert_eq!(cut.page.len(), 4);
        assert!(cut.overflow.is_empty());
    }

    #[test]
    fn nothing_left_means_no_more() {
        assert!(!infer_has_more(&HasMoreSignals {
            page_len: 4,
            page_size: 10,
            upstream_calls: 2,
            ..HasMoreSignals::default()
        }));
    }

    #[test]
    fn each_signal_alone_implies_more() {
        let base = HasMoreSignals {
            page_len: 3,
            page_size: 10,
            ..HasMoreSignals::default()
        };
        assert!(infer_has_more(&HasMoreSignals {
            continuation_token_retained: true,
            ..base
        }));
        assert!(infer_has_more(&HasMoreSignals {
            budget_exhausted: true,
            ..base
        }));
        assert!(infer_has_more(&HasMoreSignals {
            page_len: 10,
            upstream_calls: 1,
            ..base
        }));
    }

    #[test]
    fn full_page_from_buffer_alone_is_not_enough() {
        assert!(!infer_has_more(&HasMoreSignals {
            page_len: 10,
            page_size: 10,
            upstream_calls: 0,
            ..HasMoreSignals::default()
        }));
    }
}
