//! Core object model.
//!
//! - `Heap` - Arena of every live object, with the collector's hooks
//! - `VoxString` / `StringTable` - Hashed byte strings and their interning table
//! - `Function` / `Closure` / `Upvalue` - Compiled code and captured variables
//! - `Class` / `Instance` / `BoundMethod` - Single-inheritance objects
//! - `Table` - String-keyed storage for methods and fields
//! - `ValueArray` - Growable constant pool

pub mod class;
pub mod equal;
pub mod function;
pub mod heap;
pub mod interner;
pub mod table;
pub mod text;
pub mod upvalue;
pub mod value_array;
