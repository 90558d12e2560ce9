//! Captured variables.
//!
//! An upvalue starts open, aliasing a slot of the interpreter's value stack
//! by index. When the frame owning that slot is about to be popped, the
//! upvalue is closed: the slot's current value is copied into the cell and
//! the stack is never consulted again.

use super::heap::{Heap, HeapObject};
use vox_core::{ObjError, ObjResult, ObjectId, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpvalueState {
    /// Aliases the absolute stack slot.
    Open(usize),
    Closed(Value),
}

#[derive(Clone, Debug)]
pub struct Upvalue {
    pub state: UpvalueState,
    /// Next entry in the open-upvalue list. Cleared on close.
    pub next: Option<ObjectId>,
}

impl Upvalue {
    pub fn new(slot: usize) -> Self {
        Self { state: UpvalueState::Open(slot), next: None }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, UpvalueState::Open(_))
    }
}

/// Head of the open-upvalue list, sorted from the deepest stack slot down.
///
/// Owned by the interpreter's frame management; there is at most one open
/// upvalue per stack slot.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenUpvalues {
    head: Option<ObjectId>,
}

impl OpenUpvalues {
    pub fn new() -> Self {
        Self { head: None }
    }

    pub fn head(&self) -> Option<ObjectId> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

fn read_slot(stack: &[Value], slot: usize) -> ObjResult<Value> {
    stack
        .get(slot)
        .copied()
        .ok_or(ObjError::StackSlotOutOfRange { slot, len: stack.len() })
}

impl Heap {
    pub fn new_upvalue(&mut self, slot: usize) -> ObjResult<ObjectId> {
        self.alloc(HeapObject::Upvalue(Upvalue::new(slot)))
    }

    /// Reads through the upvalue: the aliased slot while open, the owned
    /// value once closed.
    pub fn upvalue_get(&self, id: ObjectId, stack: &[Value]) -> ObjResult<Value> {
        match self.as_upvalue(id)?.state {
            UpvalueState::Open(slot) => read_slot(stack, slot),
            UpvalueState::Closed(value) => Ok(value),
        }
    }

    pub fn upvalue_set(&mut self, id: ObjectId, stack: &mut [Value], value: Value) -> ObjResult<()> {
        let upvalue = self.as_upvalue_mut(id)?;
        match &mut upvalue.state {
            UpvalueState::Open(slot) => {
                let len = stack.len();
                let cell = stack
                    .get_mut(*slot)
                    .ok_or(ObjError::StackSlotOutOfRange { slot: *slot, len })?;
                *cell = value;
            }
            UpvalueState::Closed(closed) => *closed = value,
        }
        Ok(())
    }

    /// Hoists the aliased slot's value into the upvalue and unlinks it from
    /// `open`, if it is linked there. A failed close leaves both untouched.
    pub fn close_upvalue(&mut self, open: &mut OpenUpvalues, id: ObjectId, stack: &[Value]) -> ObjResult<()> {
        let upvalue = self.as_upvalue(id)?;
        let UpvalueState::Open(slot) = upvalue.state else {
            return Err(ObjError::InvalidUpvalueTransition { upvalue: id });
        };
        let value = read_slot(stack, slot)?;
        self.unlink_upvalue(open, id)?;
        self.as_upvalue_mut(id)?.state = UpvalueState::Closed(value);
        log::trace!("close upvalue {} from slot {}", id, slot);
        Ok(())
    }

    fn unlink_upvalue(&mut self, open: &mut OpenUpvalues, id: ObjectId) -> ObjResult<()> {
        let next = self.as_upvalue(id)?.next;
        if open.head == Some(id) {
            open.head = next;
        } else {
            let mut cur = open.head;
            while let Some(cur_id) = cur {
                let cur_next = self.as_upvalue(cur_id)?.next;
                if cur_next == Some(id) {
                    self.as_upvalue_mut(cur_id)?.next = next;
                    break;
                }
                cur = cur_next;
            }
        }
        self.as_upvalue_mut(id)?.next = None;
        Ok(())
    }

    /// Returns the open upvalue for `slot`, creating and linking one if the
    /// slot has not been captured yet.
    pub fn capture_upvalue(&mut self, open: &mut OpenUpvalues, slot: usize) -> ObjResult<ObjectId> {
        let mut prev: Option<ObjectId> = None;
        let mut cur = open.head;
        while let Some(id) = cur {
            let upvalue = self.as_upvalue(id)?;
            let UpvalueState::Open(cur_slot) = upvalue.state else {
                return Err(ObjError::InvalidUpvalueTransition { upvalue: id });
            };
            if cur_slot == slot {
                return Ok(id);
            }
            if cur_slot < slot {
                break;
            }
            prev = cur;
            cur = upvalue.next;
        }

        let created = self.new_upvalue(slot)?;
        self.as_upvalue_mut(created)?.next = cur;
        match prev {
            Some(prev) => self.as_upvalue_mut(prev)?.next = Some(created),
            None => open.head = Some(created),
        }
        Ok(created)
    }

    /// Closes every open upvalue aliasing `from_slot` or above. Returns how
    /// many were closed.
    pub fn close_upvalues(
        &mut self,
        open: &mut OpenUpvalues,
        stack: &[Value],
        from_slot: usize,
    ) -> ObjResult<usize> {
        let mut closed = 0;
        while let Some(id) = open.head {
            let upvalue = self.as_upvalue(id)?;
            let UpvalueState::Open(slot) = upvalue.state else {
                return Err(ObjError::InvalidUpvalueTransition { upvalue: id });
            };
            if slot < from_slot {
                break;
            }
            self.close_upvalue(open, id, stack)?;
            closed += 1;
        }
        Ok(closed)
    }
}
