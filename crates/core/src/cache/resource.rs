use super::slot::ReclaimableSlot;
use crate::config::Retention;
use rescope_api::{ResourceDescriptor, ResourceLoader, Result, RootId, SharedContent};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

struct Inner<T> {
    name: String,
    origin: RootId,
    content: SharedContent,
    loader: Arc<dyn ResourceLoader<T>>,
    slot: ReclaimableSlot<T>,
    /// Serializes decodes and invalidation for this instance only
    load_lock: Mutex<()>,
    loads: AtomicU64,
}

/// A resource whose decoded value is loaded on first use and memoized.
///
/// Concurrent misses collapse into a single decode: the first caller runs
/// the loader while holding the instance lock, the others wait and then
/// read the stored value. Hits never take the lock.
///
/// Clones share the same slot and lock. A `CachedResource` does not borrow
/// the locator that produced it.
pub struct CachedResource<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for CachedResource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> CachedResource<T> {
    pub fn new(
        descriptor: &ResourceDescriptor,
        loader: Arc<dyn ResourceLoader<T>>,
        retention: Retention,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: descriptor.name().to_string(),
                origin: descriptor.origin(),
                content: descriptor.content().clone(),
                loader,
                slot: ReclaimableSlot::new(retention),
                load_lock: Mutex::new(()),
                loads: AtomicU64::new(0),
            }),
        }
    }

    /// The decoded value, loading it if the slot is empty or was reclaimed
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(value) = self.inner.slot.get() {
            return Ok(value);
        }

        let _guard = self
            .inner
            .load_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = self.inner.slot.get() {
            return Ok(value);
        }

        debug!("Loading {} from {}", self.inner.name, self.inner.content.describe());
        let value = self
            .inner
            .loader
            .load(self.inner.content.as_ref())
            .map(Arc::new)
            .map_err(|e| e.for_resource(&self.inner.name))?;

        self.inner.loads.fetch_add(1, Ordering::Relaxed);
        self.inner.slot.set(value.clone());
        Ok(value)
    }

    /// Drop the cached value; the next `get()` decodes again.
    ///
    /// Waits for an in-flight decode on this instance to finish first.
    pub fn invalidate(&self) {
        let _guard = self
            .inner
            .load_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.slot.clear();
    }

    /// Memory-pressure hook: drop the value without waiting for the lock
    pub fn reclaim(&self) -> bool {
        self.inner.slot.reclaim()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.slot.is_present()
    }

    /// Number of successful decodes so far
    pub fn load_count(&self) -> u64 {
        self.inner.loads.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn origin(&self) -> RootId {
        self.inner.origin
    }

    pub fn content(&self) -> &SharedContent {
        &self.inner.content
    }
}

impl<T> fmt::Debug for CachedResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedResource")
            .field("name", &self.inner.name)
            .field("origin", &self.inner.origin)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
