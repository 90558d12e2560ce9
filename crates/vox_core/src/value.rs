//! Runtime value representation.
//!
//! Every Vox value lives on the heap, booleans and numbers included, so a
//! value is nothing more than a nullable handle. The kind of the referenced
//! object is only known to the heap that owns it.

use crate::gc::ObjectId;
use std::fmt;

/// Nullable reference to a heap object.
///
/// `==` on `Value` is handle identity. Language-level equality needs the heap
/// and lives there as `values_equal`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Value(Option<ObjectId>);

impl Value {
    pub const NULL: Value = Value(None);

    #[inline(always)]
    pub fn obj(id: ObjectId) -> Self {
        Self(Some(id))
    }

    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    #[inline(always)]
    pub fn is_obj(&self) -> bool {
        self.0.is_some()
    }

    #[inline(always)]
    pub fn as_obj_id(&self) -> Option<ObjectId> {
        self.0
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::obj(id)
    }
}

impl From<Option<ObjectId>> for Value {
    fn from(id: Option<ObjectId>) -> Self {
        Value(id)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "Null"),
            Some(id) => write!(f, "Obj({})", id),
        }
    }
}
