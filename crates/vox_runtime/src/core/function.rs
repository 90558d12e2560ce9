//! Compiled functions, closures and host callbacks.

use super::heap::Heap;
use super::value_array::ValueArray;
use std::fmt;
use vox_core::{ObjResult, ObjectId, Value};

/// Compiled code produced by the compiler.
///
/// `code` and `lines` grow together through [`Function::write`], so every
/// bytecode offset has exactly one source line.
#[derive(Clone, Debug, Default)]
pub struct Function {
    pub name: Option<ObjectId>,
    pub arity: u8,
    pub upvalue_count: usize,
    code: Vec<u8>,
    lines: Vec<u32>,
    pub constants: ValueArray,
}

impl Function {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: ObjectId, arity: u8) -> Self {
        Self { name: Some(name), arity, ..Self::default() }
    }

    pub fn write(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Adds a constant to the pool and returns its index.
    pub fn add_constant(&mut self, value: Value) -> ObjResult<usize> {
        self.constants.push(value)
    }

    #[inline]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    #[inline]
    pub fn code_count(&self) -> usize {
        self.code.len()
    }

    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    pub fn lines(&self) -> &[u32] {
        &self.lines
    }
}

/// A function paired with the upvalues it captured.
///
/// `upvalues` is sized to the function's `upvalue_count` at construction; the
/// interpreter fills the entries in as it captures.
#[derive(Clone, Debug)]
pub struct Closure {
    pub function: ObjectId,
    pub upvalues: Box<[Option<ObjectId>]>,
}

impl Closure {
    pub fn new(function: ObjectId, upvalue_count: usize) -> Self {
        Self { function, upvalues: vec![None; upvalue_count].into_boxed_slice() }
    }
}

/// Host callback. The argument count is `args.len()`.
pub type NativeFn = fn(&mut Heap, &[Value]) -> ObjResult<Value>;

#[derive(Clone, Copy)]
pub struct Native {
    pub function: NativeFn,
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native({:p})", self.function as *const ())
    }
}
