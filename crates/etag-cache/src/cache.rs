use std::marker::PhantomData;

use crate::Tagged;

/// A point in a cache's eviction history.
///
/// Read it with [`EtagCache::epoch`] before loading the entity, then pass it
/// to [`EtagCache::put`]: an entry whose ID was evicted after that point
/// describes a superseded state and is not stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(pub u64);

/// Cache of tagged representations, keyed by entity ID and indexed by tag.
///
/// Implementations must be thread-safe.
pub trait EtagCache<T>: Send + Sync {
    /// Returns the cached entry if `tag` is currently associated with `id`.
    ///
    /// A tag associated with a different ID is a miss, even if the tag
    /// itself is known.
    fn lookup(&self, tag: &str, id: &str) -> Option<Tagged<T>>;

    /// Returns the current epoch.
    fn epoch(&self) -> Epoch;

    /// Stores the entry for `id`, replacing any previous entry, unless `id`
    /// was evicted after `read_at`. The previous tag stops resolving.
    ///
    /// Returns whether the entry was stored.
    fn put(&self, id: &str, entry: Tagged<T>, read_at: Epoch) -> bool;

    /// Removes the entry for `id` and its tag, and advances the epoch so
    /// that entries read before this call are refused.
    fn evict(&self, id: &str);

    /// Returns the number of cached entries.
    fn len(&self) -> usize;

    /// Returns true if nothing is cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if any of the tags in an `If-Match` / `If-None-Match`
    /// header value is currently associated with `id`.
    fn matches_header(&self, header: &str, id: &str) -> bool {
        crate::EntityTag::candidates(header).any(|tag| self.lookup(tag, id).is_some())
    }
}

/// Cache that stores nothing. Every lookup misses, so every conditional
/// request falls through to a full recomputation.
#[derive(Debug)]
pub struct NoopEtagCache<T> {
    _payload: PhantomData<fn() -> T>,
}

impl<T> NoopEtagCache<T> {
    /// Creates a new no-op cache.
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<T> Default for NoopEtagCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EtagCache<T> for NoopEtagCache<T> {
    fn lookup(&self, _tag: &str, _id: &str) -> Option<Tagged<T>> {
        None
    }

    fn epoch(&self) -> Epoch {
        Epoch::default()
    }

    fn put(&self, _id: &str, _entry: Tagged<T>, _read_at: Epoch) -> bool {
        false
    }

    fn evict(&self, _id: &str) {}

    fn len(&self) -> usize {
        0
    }
}
