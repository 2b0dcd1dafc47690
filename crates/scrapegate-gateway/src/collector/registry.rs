use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use scrapegate_core::error::{GatewayError, Result};
use scrapegate_core::{Collector, CollectorFactory};

/// Per-target slot. Initialized at most once; a failed construction leaves it
/// empty so the next caller retries.
type Slot = Arc<OnceCell<Arc<dyn Collector>>>;

/// Collector registry:
/// - `target -> Slot`
///
/// The map lock is held only while a slot is looked up, inserted or removed.
/// Construction runs inside the slot's `OnceCell`, so first-touch latency of
/// one target never stalls others, and concurrent callers for the same target
/// wait on the same construction.
pub struct CollectorRegistry {
    factory: Arc<dyn CollectorFactory>,
    slots: DashMap<String, Slot>,
}

impl CollectorRegistry {
    pub fn new(factory: Arc<dyn CollectorFactory>) -> Self {
        Self {
            factory,
            slots: DashMap::new(),
        }
    }

    /// Return the cached collector for `target`, building it on first use.
    pub async fn get_or_create(&self, target: &str) -> Result<Arc<dyn Collector>> {
        if target.is_empty() {
            return Err(GatewayError::BadRequest("target must not be empty".into()));
        }

        let slot = self.slot(target);
        let res = slot
            .get_or_try_init(|| async {
                tracing::debug!(host = %target, "constructing collector");
                self.factory
                    .create(target)
                    .await
                    .map_err(|e| e.into_collector_init(target))
            })
            .await
            .map(Arc::clone);

        if res.is_err() {
            // Drop the empty slot only if this caller is its last user: a
            // waiter still holding it will retry construction in place, and
            // later callers must join that attempt. Handles are cloned under
            // the shard lock, so the count is stable inside `remove_if`.
            self.slots.remove_if(target, |_, s| {
                Arc::ptr_eq(s, &slot) && !s.initialized() && Arc::strong_count(s) == 2
            });
        }
        res
    }

    /// Forget the collector for `target`. Unknown targets are a no-op.
    /// Returns whether an entry was removed.
    pub fn reset(&self, target: &str) -> bool {
        self.slots.remove(target).is_some()
    }

    /// Whether a constructed collector is cached for `target`.
    pub fn contains(&self, target: &str) -> bool {
        self.slots
            .get(target)
            .map(|s| s.value().initialized())
            .unwrap_or(false)
    }

    /// Number of cached, constructed collectors.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, target: &str) -> Slot {
        if let Some(s) = self.slots.get(target) {
            return Arc::clone(s.value());
        }
        let entry = self
            .slots
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()));
        Arc::clone(entry.value())
    }
}
