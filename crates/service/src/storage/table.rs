use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rows keyed by a store-assigned id, iterated in id order.
///
/// Ids start at 1 and are never handed out twice, even after deletes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Table<V> {
    next_id: u64,
    rows: BTreeMap<u64, V>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self { next_id: 1, rows: BTreeMap::new() }
    }
}

impl<V> Table<V> {
    /// Allocate the next id and store the row built from it. The id is
    /// always above every stored key, even if a loaded snapshot carries a
    /// stale counter.
    pub fn insert_with(&mut self, make: impl FnOnce(u64) -> V) -> &V {
        let above_rows = self.rows.last_key_value().map_or(1, |(k, _)| k + 1);
        let id = self.next_id.max(above_rows);
        self.next_id = id + 1;
        self.rows.insert(id, make(id));
        &self.rows[&id]
    }

    pub fn get(&self, id: u64) -> Option<&V> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut V> {
        self.rows.get_mut(&id)
    }

    pub fn remove(&mut self, id: u64) -> Option<V> {
        self.rows.remove(&id)
    }

    /// Drop the row with the smallest id.
    pub fn pop_oldest(&mut self) -> Option<V> {
        self.rows.pop_first().map(|(_, v)| v)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&V) -> bool) {
        self.rows.retain(|_, v| keep(v));
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.rows.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.rows.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
