//! The fixed set of data sources tracked by the analytics engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// One of the four statistics streams. The set is closed; sources are never
/// registered at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    /// Items leaving a producing building.
    Produced,
    /// Quantities currently held in storage (sampled, not accumulated).
    Stored,
    /// Shapes delivered to the hub.
    Delivered,
    /// Items moved into storage buildings.
    DeliveredToStorage,
}

/// Total number of data sources.
pub(crate) const SOURCE_COUNT: usize = 4;

impl DataSource {
    /// Every source, in dense index order.
    pub const ALL: [DataSource; SOURCE_COUNT] = [
        DataSource::Produced,
        DataSource::Stored,
        DataSource::Delivered,
        DataSource::DeliveredToStorage,
    ];

    /// How slices of this source are filled.
    pub fn kind(self) -> SourceKind {
        match self {
            DataSource::Stored => SourceKind::Gauge,
            DataSource::Produced | DataSource::Delivered | DataSource::DeliveredToStorage => {
                SourceKind::Counter
            }
        }
    }

    /// Stable name used in configuration, snapshots and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Produced => "produced",
            DataSource::Stored => "stored",
            DataSource::Delivered => "delivered",
            DataSource::DeliveredToStorage => "deliveredToStorage",
        }
    }

    /// Dense index for array lookups.
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| AnalyticsError::UnknownSource(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Counter slices accumulate event deltas; gauge slices are copies of live
/// state taken when the slice is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Counter,
    Gauge,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Counter => f.write_str("counter"),
            SourceKind::Gauge => f.write_str("gauge"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stored_is_a_gauge() {
        for source in DataSource::ALL {
            let expected = if source == DataSource::Stored {
                SourceKind::Gauge
            } else {
                SourceKind::Counter
            };
            assert_eq!(source.kind(), expected, "{source}");
        }
    }

    #[test]
    fn indices_are_dense() {
        for (i, source) in DataSource::ALL.into_iter().enumerate() {
            assert_eq!(source.index(), i);
        }
    }

    #[test]
    fn parse_known_names() {
        assert_eq!("produced".parse::<DataSource>().unwrap(), DataSource::Produced);
        assert_eq!(
            "deliveredToStorage".parse::<DataSource>().unwrap(),
            DataSource::DeliveredToStorage
        );
        for source in DataSource::ALL {
            assert_eq!(source.as_str().parse::<DataSource>().unwrap(), source);
        }
    }

    #[test]
    fn parse_unknown_name_fails() {
        let err = "consumed".parse::<DataSource>().unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownSource(ref name) if name == "consumed"));
    }
}
