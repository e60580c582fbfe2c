//! The analytics engine: one ledger per data source, rotated in lock-step.

use std::collections::HashMap;

use crate::Fixed64;
use crate::config::{AnalyticsConfig, ConfigError};
use crate::error::AnalyticsError;
use crate::intake::AnalyticsEvent;
use crate::ledger::SourceLedger;
use crate::live::{EmptyStore, StoredQuantities};
use crate::slice::ItemKey;
use crate::source::{DataSource, SOURCE_COUNT, SourceKind};

/// Per-key production statistics over a sliding window of time slices.
///
/// Events are recorded into the open slice of each counter source. Calling
/// [`update`](Self::update) with the current time rotates every ledger once
/// a slice duration has elapsed. Queries only read closed slices, so a
/// half-filled open slice never shows up as a rate.
#[derive(Debug, Clone)]
pub struct ProductionAnalytics {
    config: AnalyticsConfig,
    ledgers: [SourceLedger; SOURCE_COUNT],
    /// Timestamp (seconds) of the last rotation.
    last_rotation: f64,
    rotations: u64,
    /// Slice duration as fixed point, for per-minute conversions.
    slice_duration: Fixed64,
}

impl ProductionAnalytics {
    /// Create an engine whose gauge history starts empty.
    pub fn new(config: AnalyticsConfig) -> Result<Self, ConfigError> {
        Self::with_live_state(config, &EmptyStore)
    }

    /// Create an engine whose gauge history is pre-filled with copies of
    /// `live`.
    pub fn with_live_state<L: StoredQuantities + ?Sized>(
        config: AnalyticsConfig,
        live: &L,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let ledgers =
            DataSource::ALL.map(|source| SourceLedger::new(source, config.window_len, live));
        tracing::debug!(
            window_len = config.window_len,
            slice_duration_secs = config.slice_duration_secs,
            lookback = config.lookback,
            "production analytics created"
        );
        Ok(Self::from_parts(config, ledgers, 0.0))
    }

    pub(crate) fn from_parts(
        config: AnalyticsConfig,
        ledgers: [SourceLedger; SOURCE_COUNT],
        last_rotation: f64,
    ) -> Self {
        let slice_duration = Fixed64::saturating_from_num(config.slice_duration_secs);
        Self {
            config,
            ledgers,
            last_rotation,
            rotations: 0,
            slice_duration,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Read access to one source's ledger.
    pub fn ledger(&self, source: DataSource) -> &SourceLedger {
        &self.ledgers[source.index()]
    }

    pub(crate) fn ledgers(&self) -> &[SourceLedger; SOURCE_COUNT] {
        &self.ledgers
    }

    /// Timestamp passed to the `update` call that last rotated.
    pub fn last_rotation(&self) -> f64 {
        self.last_rotation
    }

    /// Rotations performed since this engine was created or restored.
    pub fn rotation_count(&self) -> u64 {
        self.rotations
    }

    // -- Event intake -------------------------------------------------------

    /// Add `delta` to `key` in the open slice of a counter source.
    ///
    /// Routing to the gauge source is rejected without touching any slice.
    pub fn on_counter_event(
        &mut self,
        source: DataSource,
        key: &str,
        delta: u64,
    ) -> Result<(), AnalyticsError> {
        self.ledgers[source.index()]
            .record(key, delta)
            .inspect_err(|err| tracing::warn!(%err, key, "rejected analytics event"))
    }

    /// Record one typed event.
    pub fn process_event(&mut self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.on_counter_event(event.source(), event.key().as_str(), event.delta())
    }

    /// One item with `key` was produced.
    pub fn on_item_produced(&mut self, key: &str) -> Result<(), AnalyticsError> {
        self.on_counter_event(DataSource::Produced, key, 1)
    }

    /// One shape with `key` was delivered to the hub.
    pub fn on_shape_delivered(&mut self, key: &str) -> Result<(), AnalyticsError> {
        self.on_counter_event(DataSource::Delivered, key, 1)
    }

    /// `count` items were moved into storage slot `key`.
    pub fn on_item_delivered_to_storage(
        &mut self,
        key: &str,
        count: u64,
    ) -> Result<(), AnalyticsError> {
        self.on_counter_event(DataSource::DeliveredToStorage, key, count)
    }

    // -- Rotation -----------------------------------------------------------

    /// Advance the clock. Rotates every ledger when more than one slice
    /// duration has passed since the last rotation, and returns whether it
    /// did. `live` is copied into the new gauge slice.
    pub fn update<L: StoredQuantities + ?Sized>(&mut self, now: f64, live: &L) -> bool {
        if now - self.last_rotation > self.config.slice_duration_secs {
            self.last_rotation = now;
            self.rotate(live);
            true
        } else {
            false
        }
    }

    /// Close the open slice of every ledger and open a new one.
    pub fn rotate<L: StoredQuantities + ?Sized>(&mut self, live: &L) {
        for ledger in &mut self.ledgers {
            ledger.rotate(live);
        }
        self.rotations += 1;
        tracing::debug!(
            rotation = self.rotations,
            at = self.last_rotation,
            stored_keys = self.ledger(DataSource::Stored).open_slice().len(),
            "analytics slice rotated"
        );
    }

    // -- Queries ------------------------------------------------------------

    /// Value of `key` in the most recently closed slice, 0 if absent.
    pub fn current_rate(&self, source: DataSource, key: &str) -> Result<u64, AnalyticsError> {
        Ok(self.ledger(source).require(1)?.get(key))
    }

    /// Value of `key` `offset` closed slices before the most recent one.
    ///
    /// `offset` must lie in `0..=window_len - 3`.
    pub fn past_rate(
        &self,
        source: DataSource,
        key: &str,
        offset: usize,
    ) -> Result<u64, AnalyticsError> {
        let max = self.config.max_history_offset();
        if offset > max {
            return Err(AnalyticsError::OffsetOutOfRange { offset, max });
        }
        Ok(self.ledger(source).require(offset + 1)?.get(key))
    }

    /// All keys of the most recently closed slice, plus a zero entry for
    /// every key seen in the `lookback` closed slices before it.
    ///
    /// Existing values are never overwritten and keys are never removed, so
    /// a key that goes quiet for one slice stays listed.
    pub fn current_rates(
        &self,
        source: DataSource,
    ) -> Result<HashMap<ItemKey, u64>, AnalyticsError> {
        let ledger = self.ledger(source);
        let mut rates = ledger.require(1)?.to_map();
        for index in 2..self.config.lookback + 2 {
            for key in ledger.require(index)?.keys() {
                if !rates.contains_key(key) {
                    rates.insert(key.clone(), 0);
                }
            }
        }
        Ok(rates)
    }

    /// Every readable past value of `key`, oldest first. The last entry
    /// equals [`current_rate`](Self::current_rate).
    pub fn rate_history(&self, source: DataSource, key: &str) -> Result<Vec<u64>, AnalyticsError> {
        (0..=self.config.max_history_offset())
            .rev()
            .map(|offset| self.past_rate(source, key, offset))
            .collect()
    }

    /// Current rate scaled to items per minute.
    ///
    /// Only counter sources have a rate; a gauge slice holds a stock level,
    /// so asking for `Stored` fails with `SourceKindMismatch`.
    pub fn rate_per_minute(&self, source: DataSource, key: &str) -> Result<Fixed64, AnalyticsError> {
        if source.kind() != SourceKind::Counter {
            return Err(AnalyticsError::SourceKindMismatch {
                source_name: source,
                expected: SourceKind::Counter,
                actual: source.kind(),
            });
        }
        let per_slice = Fixed64::saturating_from_num(self.current_rate(source, key)?);
        Ok(per_slice
            .saturating_mul(Fixed64::from_num(60))
            .checked_div(self.slice_duration)
            .unwrap_or(Fixed64::MAX))
    }

    /// Rows for a statistics listing: highest value first, ties by key,
    /// at most `limit` rows.
    ///
    /// The gauge source lists the live stored quantities directly; counter
    /// sources list [`current_rates`](Self::current_rates).
    pub fn ranked_rates<L: StoredQuantities + ?Sized>(
        &self,
        source: DataSource,
        live: &L,
        limit: usize,
    ) -> Result<Vec<(ItemKey, u64)>, AnalyticsError> {
        let mut rows: Vec<(ItemKey, u64)> = match source.kind() {
            SourceKind::Gauge => {
                let mut rows = Vec::new();
                live.visit_stored(&mut |key, quantity| rows.push((ItemKey::from(key), quantity)));
                rows
            }
            SourceKind::Counter => self.current_rates(source)?.into_iter().collect(),
        };
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows.truncate(limit);
        Ok(rows)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
