//! Language-level equality.

use super::heap::{Heap, HeapObject};
use vox_core::{ObjResult, Value};

impl Heap {
    /// Equality as the language sees it.
    ///
    /// Booleans and numbers compare by payload, numbers with IEEE-754 rules
    /// (`NaN != NaN` even for one allocation, `0.0 == -0.0`). Strings compare
    /// by content. Every other kind compares by identity. A freed handle on
    /// either side is `DanglingHandle`.
    pub fn values_equal(&self, a: Value, b: Value) -> ObjResult<bool> {
        let x = a.as_obj_id().map(|id| self.get(id)).transpose()?;
        let y = b.as_obj_id().map(|id| self.get(id)).transpose()?;
        Ok(match (x, y) {
            (None, None) => true,
            (Some(HeapObject::Bool(x)), Some(HeapObject::Bool(y))) => x == y,
            (Some(HeapObject::Number(x)), Some(HeapObject::Number(y))) => x == y,
            (Some(HeapObject::String(x)), Some(HeapObject::String(y))) => x.content_eq(y),
            (Some(_), Some(_)) => a == b,
            _ => false,
        })
    }
}
