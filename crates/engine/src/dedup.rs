use std::collections::HashSet;

use trendscout_protocol::CandidateItem;

/// At-most-once admission of identities within a session.
///
/// Reads the session's committed `seen` set and records new admissions separately, so nothing
/// touches the session until the call that produced them completes.
pub struct Deduplicator<'a> {
    seen: &'a HashSet<String>,
    admitted: HashSet<String>,
}

impl<'a> Deduplicator<'a> {
    #[must_use]
    pub fn new(seen: &'a HashSet<String>) -> Self {
        Self {
            seen,
            admitted: HashSet::new(),
        }
    }

    #[must_use]
    pub fn is_known(&self, identity: &str) -> bool {
        self.seen.contains(identity) || self.admitted.contains(identity)
    }

    /// Admits a single identity; false when it was already seen.
    pub fn admit_identity(&mut self, identity: String) -> bool {
        if self.seen.contains(&identity) {
            return false;
        }
        self.admitted.insert(identity)
    }

    /// Returns the items whose identity was not seen before, in batch order.
    pub fn admit(&mut self, batch: Vec<CandidateItem>) -> Vec<CandidateItem> {
        batch
            .into_iter()
            .filter(|item| self.admit_identity(item.identity()))
            .collect()
    }

    #[must_use]
    pub fn admitted_len(&self) -> usize {
        self.admitted.len()
    }

    #[must_use]
    pub fn into_admitted(self) -> HashSet<String> {
        self.admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trendscout_protocol::Platform;

    fn item(id: &str) -> CandidateItem {
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
        }
    }

    fn ids(items: &[CandidateItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn drops_previously_seen_and_in_batch_duplicates() {
        let seen: HashSet<String> = ["youtube:a".to_string()].into_iter().collect();
        let mut dedup = Deduplicator::new(&seen);
        let admitted = dedup.admit(vec![item("a"), item("b"), item("b"), item("c")]);
        assert_eq!(ids(&admitted), vec!["b", "c"]);

        let again = dedup.admit(vec![item("c"), item("d")]);
        assert_eq!(ids(&again), vec!["d"]);
        assert_eq!(dedup.admitted_len(), 3);
    }

    #[test]
    fn same_id_on_other_platform_is_distinct() {
        let seen = HashSet::new();
        let mut dedup = Deduplicator::new(&seen);
        let mut other = item("a");
        other.platform = Platform::Instagram;
        assert_eq!(dedup.admit(vec![item("a"), other]).len(), 2);
    }

    proptest! {
        #[test]
        fn admits_each_identity_at_most_once(batches in prop::collection::vec(
            prop::collection::vec(0u8..20, 0..15), 1..6)
        ) {
            let seen = HashSet::new();
            let mut dedup = Deduplicator::new(&seen);
            let mut out = Vec::new();
            for batch in batches {
                let batch = batch.into_iter().map(|n| item(&n.to_string())).collect();
                out.extend(dedup.admit(batch));
            }
            let unique: HashSet<String> = out.iter().map(CandidateItem::identity).collect();
            prop_assert_eq!(unique.len(), out.len());
            prop_assert_eq!(dedup.into_admitted(), unique);
        }
    }
}
