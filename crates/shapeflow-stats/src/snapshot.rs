//! Export and import of ledger contents.
//!
//! Where the bytes end up (save files, network, ...) is the host's business.
//! This module only turns an engine into a versioned [`AnalyticsSnapshot`]
//! and back, with `bitcode` as the binary encoding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{AnalyticsConfig, ConfigError};
use crate::engine::ProductionAnalytics;
use crate::ledger::SourceLedger;
use crate::slice::{ItemKey, Slice};
use crate::source::{DataSource, SOURCE_COUNT};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying an analytics snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x5F1A_0001;

/// Current format version. Increment when breaking the layout.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from exporting or importing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version {0} (this build reads {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("data source '{source_name}' holds {found} slices, window length is {expected}")]
    WindowMismatch {
        source_name: DataSource,
        expected: usize,
        found: usize,
    },
    #[error("data source '{0}' missing from snapshot")]
    MissingSource(DataSource),
    #[error("data source '{0}' appears more than once in snapshot")]
    DuplicateSource(DataSource),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Snapshot layout
// ---------------------------------------------------------------------------

/// Header checked before any ledger is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// One source's slices, oldest first. The last entry is the open slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub source: DataSource,
    pub slices: Vec<HashMap<ItemKey, u64>>,
}

/// Every ledger of an engine, as ordered key → count maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub header: SnapshotHeader,
    pub window_len: usize,
    pub last_rotation: f64,
    pub ledgers: Vec<LedgerSnapshot>,
}

impl AnalyticsSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bitcode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode and check the header. Ledger shapes are checked on restore.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Engine export / import
// ---------------------------------------------------------------------------

impl ProductionAnalytics {
    /// Copy every ledger into a snapshot.
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let ledgers = self
            .ledgers()
            .iter()
            .map(|ledger| LedgerSnapshot {
                source: ledger.source(),
                slices: ledger.iter().map(Slice::to_map).collect(),
            })
            .collect();
        AnalyticsSnapshot {
            header: SnapshotHeader::new(),
            window_len: self.config().window_len,
            last_rotation: self.last_rotation(),
            ledgers,
        }
    }

    /// Rebuild an engine from a snapshot taken with the same window length.
    ///
    /// Every source must be present exactly once, with exactly `window_len`
    /// slices.
    pub fn restore(
        config: AnalyticsConfig,
        snapshot: AnalyticsSnapshot,
    ) -> Result<Self, SnapshotError> {
        snapshot.header.validate()?;
        config.validate()?;

        let mut by_source: HashMap<DataSource, Vec<HashMap<ItemKey, u64>>> =
            HashMap::with_capacity(SOURCE_COUNT);
        for ledger in snapshot.ledgers {
            if by_source.insert(ledger.source, ledger.slices).is_some() {
                return Err(SnapshotError::DuplicateSource(ledger.source));
            }
        }

        let mut ledgers = Vec::with_capacity(DataSource::ALL.len());
        for source in DataSource::ALL {
            let slices = by_source
                .remove(&source)
                .ok_or(SnapshotError::MissingSource(source))?;
            if slices.len() != config.window_len {
                return Err(SnapshotError::WindowMismatch {
                    source_name: source,
                    expected: config.window_len,
                    found: slices.len(),
                });
            }
            let slices = slices.into_iter().map(Slice::from_map).collect();
            ledgers.push(SourceLedger::from_slices(source, slices));
        }

        let ledgers: [SourceLedger; SOURCE_COUNT] = ledgers
            .try_into()
            .map_err(|_| SnapshotError::MissingSource(DataSource::Produced))?;
        tracing::debug!(
            window_len = config.window_len,
            last_rotation = snapshot.last_rotation,
            "production analytics restored"
        );
        Ok(Self::from_parts(config, ledgers, snapshot.last_rotation))
    }

    /// Encode the engine with `bitcode`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        self.snapshot().to_bytes()
    }

    /// Decode an engine previously encoded with [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(config: AnalyticsConfig, data: &[u8]) -> Result<Self, SnapshotError> {
        Self::restore(config, AnalyticsSnapshot::from_bytes(data)?)
    }
}
