//! Fixed-capacity ring of slices for one data source.

use crate::config::MIN_WINDOW_LEN;
use crate::error::AnalyticsError;
use crate::live::StoredQuantities;
use crate::slice::Slice;
use crate::source::{DataSource, SourceKind};

/// The sliding window of slices for one data source.
///
/// Always holds exactly `window_len` slices. The newest slice is the only
/// open (writable) one; every other slice is closed and never changes.
/// Slices are addressed from the tail: `0` is the open slice, `1` the most
/// recently closed, and so on.
///
/// # Rotation
///
/// [`rotate`](Self::rotate) overwrites the oldest slot with a fresh open
/// slice and advances the head, so eviction and insertion happen in one
/// step and the window length never changes.
#[derive(Debug, Clone)]
pub struct SourceLedger {
    source: DataSource,
    slices: Vec<Slice>,
    /// Position of the open slice in `slices`.
    head: usize,
}

impl SourceLedger {
    /// Create a ledger pre-filled with `window_len` slices. Gauge ledgers copy
    /// `live` into every slot; counter ledgers start empty.
    ///
    /// # Panics
    ///
    /// Panics if `window_len` is below [`MIN_WINDOW_LEN`]: a shorter window
    /// has no closed slice left to read once the open one is excluded.
    pub fn new<L: StoredQuantities + ?Sized>(
        source: DataSource,
        window_len: usize,
        live: &L,
    ) -> Self {
        assert!(
            window_len >= MIN_WINDOW_LEN,
            "SourceLedger window must be >= {MIN_WINDOW_LEN}, got {window_len}"
        );
        let template = match source.kind() {
            SourceKind::Counter => Slice::new(),
            SourceKind::Gauge => Slice::from_live(live),
        };
        Self {
            source,
            slices: vec![template; window_len],
            head: window_len - 1,
        }
    }

    /// Rebuild a ledger from slices ordered oldest to newest. The last slice
    /// becomes the open one.
    pub(crate) fn from_slices(source: DataSource, slices: Vec<Slice>) -> Self {
        let head = slices.len().saturating_sub(1);
        Self {
            source,
            slices,
            head,
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Number of slices held. Equal to the window length at all times.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Add `delta` to `key` in the open slice.
    ///
    /// Fails for gauge ledgers, whose slices are only ever copies of live
    /// state.
    pub fn record(&mut self, key: &str, delta: u64) -> Result<(), AnalyticsError> {
        if self.kind() != SourceKind::Counter {
            return Err(AnalyticsError::SourceKindMismatch {
                source_name: self.source,
                expected: SourceKind::Counter,
                actual: self.kind(),
            });
        }
        self.slices[self.head].record(key, delta);
        Ok(())
    }

    /// Close the open slice and open a new one, evicting the oldest.
    ///
    /// `live` is only read for gauge ledgers.
    pub fn rotate<L: StoredQuantities + ?Sized>(&mut self, live: &L) {
        let fresh = match self.kind() {
            SourceKind::Counter => Slice::new(),
            SourceKind::Gauge => Slice::from_live(live),
        };
        self.head = (self.head + 1) % self.slices.len();
        self.slices[self.head] = fresh;
    }

    /// Slice `index` steps back from the tail (`0` = open slice).
    pub fn nth_from_tail(&self, index: usize) -> Option<&Slice> {
        let len = self.slices.len();
        if index >= len {
            return None;
        }
        Some(&self.slices[(self.head + len - index) % len])
    }

    /// Slice `index` steps back from the tail, or `WindowNotFilled`.
    pub(crate) fn require(&self, index: usize) -> Result<&Slice, AnalyticsError> {
        self.nth_from_tail(index)
            .ok_or(AnalyticsError::WindowNotFilled {
                source_name: self.source,
                available: self.slices.len(),
                requested: index,
            })
    }

    /// The open slice.
    pub fn open_slice(&self) -> &Slice {
        &self.slices[self.head]
    }

    /// Iterate slices from oldest to newest (the open slice last).
    pub fn iter(&self) -> LedgerIter<'_> {
        LedgerIter {
            ledger: self,
            remaining: self.slices.len(),
        }
    }
}

/// Iterator over [`SourceLedger`] slices, oldest to newest.
pub struct LedgerIter<'a> {
    ledger: &'a SourceLedger,
    remaining: usize,
}

impl<'a> Iterator for LedgerIter<'a> {
    type Item = &'a Slice;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.ledger.nth_from_tail(self.remaining)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LedgerIter<'_> {}
