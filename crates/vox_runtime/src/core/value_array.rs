//! Growable value buffer used as a function's constant pool.

use vox_core::{ObjError, ObjResult, Value};

const MIN_CAPACITY: usize = 8;

/// Append-only array whose capacity doubles when full.
#[derive(Clone, Debug, Default)]
pub struct ValueArray {
    values: Vec<Value>,
}

impl ValueArray {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends `value` and returns its index.
    pub fn push(&mut self, value: Value) -> ObjResult<usize> {
        if self.values.len() == self.values.capacity() {
            self.grow()?;
        }
        self.values.push(value);
        Ok(self.values.len() - 1)
    }

    /// Doubles capacity, or sets it to `MIN_CAPACITY` for an empty array.
    pub fn grow(&mut self) -> ObjResult<()> {
        let cap = self.values.capacity();
        let new_cap = if cap < MIN_CAPACITY { MIN_CAPACITY } else { cap * 2 };
        let additional = new_cap - self.values.len();
        self.values
            .try_reserve_exact(additional)
            .map_err(|_| ObjError::OutOfMemory { requested: additional })
    }

    /// Releases the buffer, leaving an empty array.
    pub fn free(&mut self) {
        self.values = Vec::new();
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.values.get(index).copied()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.values.iter().copied()
    }
}
