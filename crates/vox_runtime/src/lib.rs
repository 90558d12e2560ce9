//! Vox heap object model.

#![allow(clippy::new_without_default)]
#![allow(clippy::len_without_is_empty)]

pub mod config;
pub mod core;
mod call;
mod display;

pub use vox_core::{ObjError, ObjHeader, ObjResult, ObjType, ObjectId, Value};

// Re-exports from core/
pub use crate::core::heap;
pub use crate::core::heap::{Heap, HeapObject, HeapSlot, HeapStats};
pub use crate::core::class::{BoundMethod, Class, Instance};
pub use crate::core::function::{Closure, Function, Native, NativeFn};
pub use crate::core::interner::StringTable;
pub use crate::core::table::{Table, TableKey};
pub use crate::core::text::{VoxString, hash_bytes};
pub use crate::core::upvalue::{OpenUpvalues, Upvalue, UpvalueState};
pub use crate::core::value_array::ValueArray;

pub use call::{CallFrame, CallOutcome};
pub use config::HeapConfig;
