use crate::config::Retention;
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A value holder that may forget its value.
///
/// Reads are lock-free. The value is dropped when:
/// - [`ReclaimableSlot::reclaim`] or [`ReclaimableSlot::clear`] is called, or
/// - the retention is [`Retention::Idle`] and the value was not read for the
///   idle period; this is detected lazily by the next read.
///
/// A reclaimed slot is indistinguishable from one that was never filled.
pub struct ReclaimableSlot<T> {
    value: ArcSwapOption<T>,
    idle: Option<Duration>,
    epoch: Instant,
    /// Milliseconds since `epoch` of the last fill or read
    last_access: AtomicU64,
}

impl<T> ReclaimableSlot<T> {
    pub fn new(retention: Retention) -> Self {
        Self {
            value: ArcSwapOption::empty(),
            idle: retention.idle_timeout(),
            epoch: Instant::now(),
            last_access: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis().min(u64::MAX as u128) as u64
    }

    fn expired(&self, now: u64) -> bool {
        match self.idle {
            None => false,
            Some(idle) => {
                let last = self.last_access.load(Ordering::Acquire);
                Duration::from_millis(now.saturating_sub(last)) >= idle
            }
        }
    }

    /// Current value, or `None` if empty or reclaimed
    pub fn get(&self) -> Option<Arc<T>> {
        let current = self.value.load_full()?;
        let now = self.now_ms();

        if self.expired(now) {
            // Only drop the value we looked at; a concurrent fill wins.
            let stale = Some(current);
            let _ = self.value.compare_and_swap(&stale, None);
            return None;
        }

        if self.idle.is_some() {
            self.last_access.fetch_max(now, Ordering::AcqRel);
        }
        Some(current)
    }

    /// Whether a live value is present, without refreshing its access time
    pub fn is_present(&self) -> bool {
        self.value.load().is_some() && !self.expired(self.now_ms())
    }

    pub fn set(&self, value: Arc<T>) {
        self.last_access.store(self.now_ms(), Ordering::Release);
        self.value.store(Some(value));
    }

    pub fn clear(&self) {
        self.value.store(None);
    }

    /// Memory-pressure hook: drop the value if one is held
    pub fn reclaim(&self) -> bool {
        self.value.swap(None).is_some()
    }
}

impl<T> Default for ReclaimableSlot<T> {
    fn default() -> Self {
        Self::new(Retention::Strong)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_slot_keeps_value() {
        let slot = ReclaimableSlot::new(Retention::Strong);
        assert!(slot.get().is_none());

        slot.set(Arc::new(7));
        assert_eq!(slot.get().as_deref(), Some(&7));
        assert!(slot.is_present());

        slot.clear();
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_reclaim_reports_whether_value_was_held() {
        let slot = ReclaimableSlot::default();
        assert!(!slot.reclaim());
        slot.set(Arc::new("v"));
        assert!(slot.reclaim());
        assert!(!slot.is_present());
    }

    #[test]
    fn test_idle_value_expires() {
        let slot = ReclaimableSlot::new(Retention::idle(Duration::from_millis(30)));
        slot.set(Arc::new(1));
        assert!(slot.get().is_some());

        std::thread::sleep(Duration::from_millis(80));
        assert!(!slot.is_present());
        assert!(slot.get().is_none());
        // Expiry actually dropped the value
        slot.idle_reset_for_test();
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_reads_keep_idle_value_alive() {
        let slot = ReclaimableSlot::new(Retention::idle(Duration::from_millis(200)));
        slot.set(Arc::new(1));
        for _ in 0..5 {
            std::thread::sleep(Duration::from_millis(20));
            assert!(slot.get().is_some());
        }
    }

    impl<T> ReclaimableSlot<T> {
        fn idle_reset_for_test(&self) {
            self.last_access.store(self.now_ms(), Ordering::Release);
        }
    }
}
