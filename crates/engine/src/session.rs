use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use trendscout_protocol::CandidateItem;

use crate::query_key::QueryKey;

/// Pagination state for one [`QueryKey`].
#[derive(Debug, Clone, Default)]
pub struct PaginationSession {
    continuation_token: Option<String>,
    upstream_exhausted: bool,
    seen: HashSet<String>,
    overflow: Vec<CandidateItem>,
}

impl PaginationSession {
    #[must_use]
    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    /// The upstream reported its last page for this query.
    #[must_use]
    pub const fn upstream_exhausted(&self) -> bool {
        self.upstream_exhausted
    }

    #[must_use]
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    #[must_use]
    pub fn has_seen(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    #[must_use]
    pub fn overflow(&self) -> &[CandidateItem] {
        &self.overflow
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies the outcome of one completed call. `seen` only grows; the overflow buffer is
    /// replaced because its previous contents were folded into this call's pool.
    pub(crate) fn commit(
        &mut self,
        admitted: impl IntoIterator<Item = String>,
        continuation_token: Option<String>,
        upstream_exhausted: bool,
        overflow: Vec<CandidateItem>,
    ) {
        self.seen.extend(admitted);
        self.continuation_token = continuation_token;
        self.upstream_exhausted = upstream_exhausted;
        self.overflow = overflow;
    }
}

/// Point-in-time view of a session, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub seen: usize,
    pub buffered: usize,
    pub continuation_token: Option<String>,
    pub upstream_exhausted: bool,
}

struct SessionSlot {
    session: Arc<AsyncMutex<PaginationSession>>,
    last_used: Instant,
}

impl SessionSlot {
    fn new(now: Instant) -> Self {
        Self {
            session: Arc::new(AsyncMutex::new(PaginationSession::default())),
            last_used: now,
        }
    }
}

/// Bounded LRU of pagination sessions with idle expiry.
///
/// Each session sits behind its own async mutex: a call holds the guard from checkout until
/// it commits, so calls sharing a key run one after another while other keys proceed.
pub struct SessionStore {
    slots: Mutex<LruCache<QueryKey, SessionSlot>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Waits for exclusive use of the session for `key`, creating it if missing or expired.
    /// With `reset`, the session starts over (first page requested).
    pub async fn checkout(&self, key: &QueryKey, reset: bool) -> OwnedMutexGuard<PaginationSession> {
        let session = self.slot(key);
        let mut guard = session.lock_owned().await;
        if reset {
            guard.reset();
        }
        guard
    }

    fn slot(&self, key: &QueryKey) -> Arc<AsyncMutex<PaginationSession>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let expired = slots
            .peek(key)
            .is_some_and(|slot| now.saturating_duration_since(slot.last_used) > self.ttl);
        if expired {
            slots.pop(key);
            log::debug!("Session {key} expired after {:?} idle", self.ttl);
        }

        if let Some(slot) = slots.get_mut(key) {
            slot.last_used = now;
            return Arc::clone(&slot.session);
        }

        let slot = SessionSlot::new(now);
        let session = Arc::clone(&slot.session);
        if let Some((evicted, _)) = slots.push(key.clone(), slot) {
            if &evicted != key {
                log::debug!("Session {evicted} evicted (capacity {})", slots.cap());
            }
        }
        session
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `None` when the key is unknown or a call currently holds the session.
    #[must_use]
    pub fn snapshot(&self, key: &QueryKey) -> Option<SessionSnapshot> {
        let session = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(&slots.peek(key)?.session)
        };
        let guard = session.try_lock().ok()?;
        Some(SessionSnapshot {
            seen: guard.seen.len(),
            buffered: guard.overflow.len(),
            continuation_token: guard.continuation_token.clone(),
            upstream_exhausted: guard.upstream_exhausted,
        })
    }
}
