//! Read-only view of the host's live stored quantities.
//!
//! The gauge source samples this view once per rotation. The engine copies
//! what it visits and never holds on to the store itself.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::slice::Slice;

/// A source of `(key, quantity)` pairs describing what is currently stored.
pub trait StoredQuantities {
    /// Call `visit` once per stored key.
    fn visit_stored(&self, visit: &mut dyn FnMut(&str, u64));
}

/// A store that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl StoredQuantities for EmptyStore {
    fn visit_stored(&self, _visit: &mut dyn FnMut(&str, u64)) {}
}

impl<K: AsRef<str>, S: BuildHasher> StoredQuantities for HashMap<K, u64, S> {
    fn visit_stored(&self, visit: &mut dyn FnMut(&str, u64)) {
        for (key, quantity) in self {
            visit(key.as_ref(), *quantity);
        }
    }
}

impl<K: AsRef<str>> StoredQuantities for BTreeMap<K, u64> {
    fn visit_stored(&self, visit: &mut dyn FnMut(&str, u64)) {
        for (key, quantity) in self {
            visit(key.as_ref(), *quantity);
        }
    }
}

impl<K: AsRef<str>> StoredQuantities for [(K, u64)] {
    fn visit_stored(&self, visit: &mut dyn FnMut(&str, u64)) {
        for (key, quantity) in self {
            visit(key.as_ref(), *quantity);
        }
    }
}

impl StoredQuantities for Slice {
    fn visit_stored(&self, visit: &mut dyn FnMut(&str, u64)) {
        for (key, quantity) in self {
            visit(key.as_str(), *quantity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<L: StoredQuantities + ?Sized>(live: &L) -> BTreeMap<String, u64> {
        let mut out = BTreeMap::new();
        live.visit_stored(&mut |key, quantity| {
            out.insert(key.to_owned(), quantity);
        });
        out
    }

    #[test]
    fn empty_store_visits_nothing() {
        assert!(collect(&EmptyStore).is_empty());
    }

    #[test]
    fn pair_slice_visits_every_entry() {
        let pairs = vec![("a", 1u64), ("b", 2)];
        let seen = collect(pairs.as_slice());
        assert_eq!(seen.len(), 2);
        assert_eq!(seen["b"], 2);
    }

    #[test]
    fn string_keyed_hash_map() {
        let mut store: HashMap<String, u64> = HashMap::new();
        store.insert("CuCuCuCu".to_owned(), 40);
        assert_eq!(collect(&store)["CuCuCuCu"], 40);
    }
}
