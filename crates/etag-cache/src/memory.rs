use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{EntityTag, Epoch, EtagCache, Tagged};

#[derive(Debug)]
struct Entries<T> {
    by_id: HashMap<String, Tagged<T>>,
    by_tag: HashMap<EntityTag, String>,
    /// Last epoch at which each ID was evicted.
    evicted_at: HashMap<String, u64>,
    epoch: u64,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            by_tag: HashMap::new(),
            evicted_at: HashMap::new(),
            epoch: 0,
        }
    }
}

impl<T> Entries<T> {
    fn remove(&mut self, id: &str) -> Option<Tagged<T>> {
        let old = self.by_id.remove(id)?;
        if self.by_tag.get(&old.tag).is_some_and(|owner| owner == id) {
            self.by_tag.remove(&old.tag);
        }
        Some(old)
    }

    fn evicted_since(&self, id: &str, read_at: Epoch) -> bool {
        self.evicted_at.get(id).is_some_and(|&at| at > read_at.0)
    }
}

/// In-memory entity-tag cache.
///
/// One reader-writer lock guards both the ID index and the tag index, so the
/// two never disagree. Each eviction is stamped with a fresh epoch; a `put`
/// read before the latest eviction of its ID is dropped.
#[derive(Debug)]
pub struct InMemoryEtagCache<T> {
    entries: RwLock<Entries<T>>,
}

impl<T> InMemoryEtagCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
        }
    }
}

impl<T> Default for InMemoryEtagCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> EtagCache<T> for InMemoryEtagCache<T> {
    fn lookup(&self, tag: &str, id: &str) -> Option<Tagged<T>> {
        let entries = self.entries.read();
        let hit = entries
            .by_id
            .get(id)
            .filter(|entry| entry.tag.as_str() == tag)
            .filter(|entry| entries.by_tag.get(&entry.tag).is_some_and(|owner| owner == id))
            .cloned();

        if hit.is_some() {
            metrics::counter!("etag_cache_hits_total").increment(1);
        } else {
            metrics::counter!("etag_cache_misses_total").increment(1);
            tracing::trace!(id, tag, "etag cache miss");
        }
        hit
    }

    fn epoch(&self) -> Epoch {
        Epoch(self.entries.read().epoch)
    }

    fn put(&self, id: &str, entry: Tagged<T>, read_at: Epoch) -> bool {
        let mut entries = self.entries.write();
        if entries.evicted_since(id, read_at) {
            tracing::debug!(id, read_at = read_at.0, "dropping entry read before eviction");
            return false;
        }

        entries.remove(id);
        // A tag resolves to at most one ID; the newest owner takes it.
        if let Some(previous_owner) = entries.by_tag.insert(entry.tag.clone(), id.to_string())
            && previous_owner != id
        {
            entries.by_id.remove(&previous_owner);
        }
        entries.by_id.insert(id.to_string(), entry);
        true
    }

    fn evict(&self, id: &str) {
        let mut entries = self.entries.write();
        entries.epoch += 1;
        let epoch = entries.epoch;
        entries.evicted_at.insert(id.to_string(), epoch);

        if entries.remove(id).is_some() {
            tracing::trace!(id, epoch, "etag cache entry evicted");
        }
    }

    fn len(&self) -> usize {
        self.entries.read().by_id.len()
    }
}
