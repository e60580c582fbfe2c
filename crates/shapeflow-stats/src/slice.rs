//! Keys and per-interval slices.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::live::StoredQuantities;

// ---------------------------------------------------------------------------
// ItemKey
// ---------------------------------------------------------------------------

/// Opaque identifier for a tracked quantity (a shape hash, a storage slot
/// id, ...). Only compared and hashed, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for ItemKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for ItemKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ItemKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Slice
// ---------------------------------------------------------------------------

/// Accumulated (or sampled) values for one slice interval.
///
/// Counter slices start empty and grow via [`record`](Self::record). Gauge
/// slices are built once with [`from_live`](Self::from_live) and never
/// touched again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slice {
    values: HashMap<ItemKey, u64>,
}

impl Slice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the live store into a fresh slice. Nothing borrowed from `live`
    /// is retained.
    pub fn from_live<L: StoredQuantities + ?Sized>(live: &L) -> Self {
        let mut values = HashMap::new();
        live.visit_stored(&mut |key, quantity| {
            values.insert(ItemKey::from(key), quantity);
        });
        Self { values }
    }

    /// Add `delta` to the entry for `key`, creating it if needed.
    pub fn record(&mut self, key: &str, delta: u64) {
        match self.values.get_mut(key) {
            Some(value) => *value = value.saturating_add(delta),
            None => {
                self.values.insert(ItemKey::from(key), delta);
            }
        }
    }

    /// Value for `key`, or 0 when absent.
    pub fn get(&self, key: &str) -> u64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, ItemKey, u64> {
        self.values.iter()
    }

    pub fn keys(&self) -> hash_map::Keys<'_, ItemKey, u64> {
        self.values.keys()
    }

    /// Owned copy of the underlying map.
    pub fn to_map(&self) -> HashMap<ItemKey, u64> {
        self.values.clone()
    }

    pub(crate) fn from_map(values: HashMap<ItemKey, u64>) -> Self {
        Self { values }
    }
}

impl<'a> IntoIterator for &'a Slice {
    type Item = (&'a ItemKey, &'a u64);
    type IntoIter = hash_map::Iter<'a, ItemKey, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
