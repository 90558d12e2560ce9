//! Core types for the Vox object model.
//!
//! This crate holds the types every other layer of the runtime agrees on:
//! - `ObjectId` - Handle to a heap slot
//! - `ObjType` / `ObjHeader` - Kind tag and collector header of a heap object
//! - `Value` - Nullable reference to a heap object
//! - `ObjError` - Typed failures of the object model

pub mod error;
pub mod gc;
pub mod value;

pub use error::{ObjError, ObjResult};
pub use gc::{ObjHeader, ObjType, ObjectId};
pub use value::Value;
