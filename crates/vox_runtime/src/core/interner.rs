//! String interning table.
//!
//! Maps content to a single string object so equal literals can share one
//! allocation. The table holds its strings weakly: before a sweep the
//! collector calls `remove_unmarked` so no entry outlives its object.

use super::heap::Heap;
use super::table::{FastHashMap, fast_map_new};
use super::text::hash_bytes;
use smallvec::SmallVec;
use vox_core::{ObjResult, ObjectId};

/// Strings bucketed by hash; colliding contents share a bucket.
pub struct StringTable {
    buckets: FastHashMap<u64, SmallVec<[ObjectId; 1]>>,
    len: usize,
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTable {
    pub fn new() -> Self {
        Self { buckets: fast_map_new(), len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Looks up an interned string with the given content.
    pub fn find(&self, heap: &Heap, chars: &[u8], hash: u64) -> Option<ObjectId> {
        self.buckets.get(&hash)?.iter().copied().find(|&id| {
            heap.as_string(id)
                .is_ok_and(|s| s.hash() == hash && s.as_bytes() == chars)
        })
    }

    /// Returns the interned string for `chars`, copying it into a new string
    /// on first sight.
    pub fn intern(&mut self, heap: &mut Heap, chars: &[u8]) -> ObjResult<ObjectId> {
        let hash = hash_bytes(chars);
        if let Some(id) = self.find(heap, chars, hash) {
            return Ok(id);
        }
        let id = heap.copy_string(chars)?;
        self.insert(hash, id);
        Ok(id)
    }

    /// Like `intern`, but hands `chars` to the new string instead of copying.
    /// The buffer is dropped when the content is already interned.
    pub fn intern_owned(&mut self, heap: &mut Heap, chars: Vec<u8>) -> ObjResult<ObjectId> {
        let hash = hash_bytes(&chars);
        if let Some(id) = self.find(heap, &chars, hash) {
            return Ok(id);
        }
        let id = heap.new_string(chars)?;
        self.insert(hash, id);
        Ok(id)
    }

    fn insert(&mut self, hash: u64, id: ObjectId) {
        self.buckets.entry(hash).or_default().push(id);
        self.len += 1;
    }

    /// Drops every entry whose string is unmarked or already freed. Returns
    /// how many were removed.
    pub fn remove_unmarked(&mut self, heap: &Heap) -> usize {
        let mut removed = 0;
        self.buckets.retain(|_, ids| {
            let before = ids.len();
            ids.retain(|id| heap.is_marked(*id));
            removed += before - ids.len();
            !ids.is_empty()
        });
        self.len -= removed;
        removed
    }
}
