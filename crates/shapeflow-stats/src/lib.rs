//! Production statistics for the Shapeflow simulation.
//!
//! Tracks per-key quantities (produced, delivered, delivered to storage, and
//! the sampled stored totals) as a sliding window of fixed-duration slices,
//! and answers "current rate" and "rate N slices ago" queries for dashboards
//! and progression logic.
//!
//! # Slice lifecycle
//!
//! 1. Events accumulate into the open (newest) slice of their source.
//! 2. [`ProductionAnalytics::update`] rotates every source once the slice
//!    duration has passed: the open slice closes, the oldest is evicted.
//! 3. Queries read closed slices only, so a half-filled slice is never
//!    reported as a rate.
//!
//! # Usage
//!
//! ```ignore
//! let mut analytics = ProductionAnalytics::new(AnalyticsConfig::default())?;
//! // Feed events as the simulation emits them:
//! analytics.on_item_produced("CuCuCuCu")?;
//! // Once per simulation step:
//! analytics.update(now_secs, &hub.stored_shapes);
//! // Query:
//! let rate = analytics.current_rate(DataSource::Produced, "CuCuCuCu")?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod intake;
pub mod ledger;
pub mod live;
pub mod shared;
pub mod slice;
pub mod snapshot;
pub mod source;

/// Q32.32 fixed-point, used for derived per-minute rates.
pub type Fixed64 = fixed::types::I32F32;

pub use config::{AnalyticsConfig, ConfigError};
pub use engine::ProductionAnalytics;
pub use error::AnalyticsError;
pub use intake::AnalyticsEvent;
pub use ledger::SourceLedger;
pub use live::{EmptyStore, StoredQuantities};
pub use shared::SharedAnalytics;
pub use slice::{ItemKey, Slice};
pub use snapshot::{AnalyticsSnapshot, SnapshotError};
pub use source::{DataSource, SourceKind};
