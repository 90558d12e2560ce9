//! String-keyed tables for class methods and instance fields.

use super::text::{VoxString, fast_hasher};
use ahash::RandomState;
use hashbrown::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use vox_core::{ObjectId, Value};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}

/// Table key built from a heap string.
///
/// Carries the string's precomputed hash and shares its bytes. `name` is the
/// heap handle of the string the key came from, kept so the collector can
/// mark it; it takes no part in equality.
#[derive(Clone, Debug)]
pub struct TableKey {
    hash: u64,
    chars: Rc<Vec<u8>>,
    name: ObjectId,
}

impl TableKey {
    pub fn new(name: ObjectId, s: &VoxString) -> Self {
        Self { hash: s.hash(), chars: s.shared_chars(), name }
    }

    #[inline]
    pub fn name(&self) -> ObjectId {
        self.name
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: compare hash first
        if self.hash != other.hash {
            return false;
        }
        if Rc::ptr_eq(&self.chars, &other.chars) {
            return true;
        }
        // Hash collision or a non-interned duplicate
        self.chars.as_slice() == other.chars.as_slice()
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Unordered map from string keys to values.
#[derive(Clone, Debug)]
pub struct Table {
    map: FastHashMap<TableKey, Value>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self { map: fast_map_new() }
    }

    #[inline]
    pub fn get(&self, key: &TableKey) -> Option<Value> {
        self.map.get(key).copied()
    }

    /// Inserts or overwrites, returning the previous value.
    pub fn insert(&mut self, key: TableKey, value: Value) -> Option<Value> {
        self.map.insert(key, value)
    }

    pub fn remove(&mut self, key: &TableKey) -> Option<Value> {
        self.map.remove(key)
    }

    pub fn contains_key(&self, key: &TableKey) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, Value)> {
        self.map.iter().map(|(k, v)| (k, *v))
    }
}
