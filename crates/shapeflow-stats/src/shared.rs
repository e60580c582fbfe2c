//! Lock-guarded handle for hosts that produce events on several threads.
//!
//! The engine itself is single-threaded. [`SharedAnalytics`] puts one mutex
//! around the whole engine so that every record, rotation and query runs
//! with exclusive access, and no reader can observe a ledger mid-rotation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::ProductionAnalytics;
use crate::error::AnalyticsError;
use crate::intake::AnalyticsEvent;
use crate::live::StoredQuantities;
use crate::slice::ItemKey;
use crate::source::DataSource;

/// Cloneable, thread-safe handle to a [`ProductionAnalytics`].
#[derive(Debug, Clone)]
pub struct SharedAnalytics {
    inner: Arc<Mutex<ProductionAnalytics>>,
}

impl SharedAnalytics {
    pub fn new(analytics: ProductionAnalytics) -> Self {
        Self {
            inner: Arc::new(Mutex::new(analytics)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// A poisoned lock is recovered: the engine never panics between
    /// mutations, so its state is consistent even if a caller's closure did.
    pub fn with<R>(&self, f: impl FnOnce(&mut ProductionAnalytics) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn process_event(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.with(|analytics| analytics.process_event(event))
    }

    pub fn on_counter_event(
        &self,
        source: DataSource,
        key: &str,
        delta: u64,
    ) -> Result<(), AnalyticsError> {
        self.with(|analytics| analytics.on_counter_event(source, key, delta))
    }

    pub fn update<L: StoredQuantities + ?Sized>(&self, now: f64, live: &L) -> bool {
        self.with(|analytics| analytics.update(now, live))
    }

    pub fn current_rate(&self, source: DataSource, key: &str) -> Result<u64, AnalyticsError> {
        self.with(|analytics| analytics.current_rate(source, key))
    }

    pub fn past_rate(
        &self,
        source: DataSource,
        key: &str,
        offset: usize,
    ) -> Result<u64, AnalyticsError> {
        self.with(|analytics| analytics.past_rate(source, key, offset))
    }

    pub fn current_rates(
        &self,
        source: DataSource,
    ) -> Result<HashMap<ItemKey, u64>, AnalyticsError> {
        self.with(|analytics| analytics.current_rates(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::live::EmptyStore;

    fn shared() -> SharedAnalytics {
        let config = AnalyticsConfig {
            window_len: 4,
            slice_duration_secs: 1.0,
            lookback: 1,
        };
        SharedAnalytics::new(ProductionAnalytics::new(config).unwrap())
    }

    #[test]
    fn clones_share_one_engine() {
        let a = shared();
        let b = a.clone();
        a.on_counter_event(DataSource::Produced, "k", 2).unwrap();
        b.on_counter_event(DataSource::Produced, "k", 3).unwrap();
        assert!(b.update(2.0, &EmptyStore));
        assert_eq!(a.current_rate(DataSource::Produced, "k").unwrap(), 5);
    }

    #[test]
    fn threads_feed_one_engine() {
        let handle = shared();
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        handle
                            .process_event(&AnalyticsEvent::ShapeDelivered { key: "k".into() })
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        handle.with(|analytics| analytics.rotate(&EmptyStore));
        assert_eq!(handle.current_rate(DataSource::Delivered, "k").unwrap(), 1000);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let handle = shared();
        let poisoner = handle.clone();
        let result = std::thread::spawn(move || {
            poisoner.with::<()>(|_| panic!("caller panicked while holding the lock"));
        })
        .join();
        assert!(result.is_err());

        handle.on_counter_event(DataSource::Produced, "k", 1).unwrap();
        assert_eq!(handle.past_rate(DataSource::Produced, "k", 0).unwrap(), 0);
    }
}
