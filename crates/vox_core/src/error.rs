//! Errors surfaced by the object model.

use crate::gc::{ObjType, ObjectId};
use thiserror::Error;

pub type ObjResult<T> = Result<T, ObjError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjError {
    /// The heap could not grow. Fatal to the caller; never retried.
    #[error("Out of memory: cannot allocate {requested} more slot(s)")]
    OutOfMemory { requested: usize },

    /// A checked narrowing found a different kind (or null).
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ObjType, found: &'static str },

    #[error("Undefined method '{method}' on class {class}")]
    MethodNotFound { class: String, method: String },

    #[error("No constructor defined for class {class} or its superclasses")]
    ConstructorNotFound { class: String },

    #[error("Upvalue {upvalue} is already closed")]
    InvalidUpvalueTransition { upvalue: ObjectId },

    #[error("Handle {id} refers to a freed object")]
    DanglingHandle { id: ObjectId },

    #[error("Stack slot {slot} is out of range for a stack of {len} value(s)")]
    StackSlotOutOfRange { slot: usize, len: usize },

    #[error("Upvalue index {index} is out of range for a closure with {count} upvalue(s)")]
    UpvalueIndexOutOfRange { index: usize, count: usize },

    #[error("Expected {expected} argument(s) but got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Can only call functions and classes, not {found}")]
    NotCallable { found: &'static str },
}

impl ObjError {
    pub fn type_mismatch(expected: ObjType, found: Option<ObjType>) -> Self {
        ObjError::TypeMismatch {
            expected,
            found: found.map_or("null", ObjType::name),
        }
    }
}
