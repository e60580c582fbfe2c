use crate::source::{DataSource, SourceKind};

/// Errors returned by event intake and rate queries.
///
/// None of these leave the engine partially mutated: the failing call is
/// rejected before any slice is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
    /// A source name outside the fixed set.
    #[error("unknown data source: {0}")]
    UnknownSource(String),

    /// `past_rate` offset outside `[0, max]`.
    #[error("history offset {offset} out of range (max {max})")]
    OffsetOutOfRange { offset: usize, max: usize },

    /// A counter event routed to a gauge source (or the reverse).
    #[error("data source '{source_name}' is a {actual} source, expected {expected}")]
    SourceKindMismatch {
        source_name: DataSource,
        expected: SourceKind,
        actual: SourceKind,
    },

    /// The ledger does not hold a slice that far back.
    #[error("data source '{source_name}' holds {available} slices, slice {requested} requested")]
    WindowNotFilled {
        source_name: DataSource,
        available: usize,
        requested: usize,
    },
}
