//! Typed events fed to the analytics engine by the simulation.
//!
//! The simulation owns its own signal wiring; it only needs to turn each
//! signal into an [`AnalyticsEvent`] and hand it to
//! [`ProductionAnalytics::process_event`](crate::ProductionAnalytics::process_event).

use crate::slice::ItemKey;
use crate::source::DataSource;

/// A counter event. All variants target counter sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    /// One item left a producing building.
    ItemProduced { key: ItemKey },
    /// One shape reached the hub.
    ShapeDelivered { key: ItemKey },
    /// `count` items were moved into the storage slot `key`.
    ItemDeliveredToStorage { key: ItemKey, count: u64 },
}

impl AnalyticsEvent {
    /// The ledger this event accumulates into.
    pub fn source(&self) -> DataSource {
        match self {
            AnalyticsEvent::ItemProduced { .. } => DataSource::Produced,
            AnalyticsEvent::ShapeDelivered { .. } => DataSource::Delivered,
            AnalyticsEvent::ItemDeliveredToStorage { .. } => DataSource::DeliveredToStorage,
        }
    }

    pub fn key(&self) -> &ItemKey {
        match self {
            AnalyticsEvent::ItemProduced { key }
            | AnalyticsEvent::ShapeDelivered { key }
            | AnalyticsEvent::ItemDeliveredToStorage { key, .. } => key,
        }
    }

    /// Amount added to the key's counter.
    pub fn delta(&self) -> u64 {
        match self {
            AnalyticsEvent::ItemProduced { .. } | AnalyticsEvent::ShapeDelivered { .. } => 1,
            AnalyticsEvent::ItemDeliveredToStorage { count, .. } => *count,
        }
    }
}
