//! Heap management.
//!
//! Every object lives in a slot of one arena and is addressed by its
//! `ObjectId`. The arena is the allocation registry: walking its occupied
//! slots enumerates every live object, and freed slots are recycled through a
//! free list under a fresh generation. Marking and sweeping are driven from
//! outside; the heap only exposes the mark bits, the per-object references
//! and `free`.

use super::class::{BoundMethod, Class, Instance};
use super::function::{Closure, Function, Native, NativeFn};
use super::text::VoxString;
use super::upvalue::{Upvalue, UpvalueState};
use crate::config::HeapConfig;
use std::fmt;
use vox_core::{ObjError, ObjHeader, ObjResult, ObjType, ObjectId, Value};

#[derive(Clone, Debug)]
pub enum HeapObject {
    Bool(bool),
    BoundMethod(BoundMethod),
    Class(Box<Class>),
    Closure(Closure),
    Function(Box<Function>),
    Instance(Instance),
    Native(Native),
    Number(f64),
    String(VoxString),
    Upvalue(Upvalue),
}

impl HeapObject {
    pub fn kind(&self) -> ObjType {
        match self {
            HeapObject::Bool(_) => ObjType::Bool,
            HeapObject::BoundMethod(_) => ObjType::BoundMethod,
            HeapObject::Class(_) => ObjType::Class,
            HeapObject::Closure(_) => ObjType::Closure,
            HeapObject::Function(_) => ObjType::Function,
            HeapObject::Instance(_) => ObjType::Instance,
            HeapObject::Native(_) => ObjType::Native,
            HeapObject::Number(_) => ObjType::Number,
            HeapObject::String(_) => ObjType::String,
            HeapObject::Upvalue(_) => ObjType::Upvalue,
        }
    }
}

/// Header and payload of one allocation.
#[derive(Clone, Debug)]
pub struct HeapSlot {
    pub header: ObjHeader,
    pub obj: HeapObject,
}

/// One arena position. `generation` outlives the object so stale handles to
/// a recycled slot are rejected.
#[derive(Debug)]
struct Entry {
    generation: u32,
    slot: Option<HeapSlot>,
}

impl Entry {
    fn vacate(&mut self) -> Option<HeapSlot> {
        let slot = self.slot.take()?;
        self.generation = self.generation.wrapping_add(1);
        Some(slot)
    }
}

pub struct Heap {
    objects: Vec<Entry>,
    free_list: Vec<usize>,
    live: usize,
    alloc_total: u64,
    free_total: u64,
    config: HeapConfig,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! narrow {
    ($as_ref:ident, $variant:ident, $ty:ty) => {
        pub fn $as_ref(&self, id: ObjectId) -> ObjResult<&$ty> {
            match self.get(id)? {
                HeapObject::$variant(inner) => {
                    let inner: &$ty = inner;
                    Ok(inner)
                }
                other => Err(ObjError::type_mismatch(ObjType::$variant, Some(other.kind()))),
            }
        }
    };
    ($as_ref:ident, $as_mut:ident, $variant:ident, $ty:ty) => {
        narrow!($as_ref, $variant, $ty);

        pub fn $as_mut(&mut self, id: ObjectId) -> ObjResult<&mut $ty> {
            match self.get_mut(id)? {
                HeapObject::$variant(inner) => {
                    let inner: &mut $ty = inner;
                    Ok(inner)
                }
                other => Err(ObjError::type_mismatch(ObjType::$variant, Some(other.kind()))),
            }
        }
    };
}

impl Heap {
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            objects: Vec::with_capacity(config.initial_capacity),
            free_list: Vec::new(),
            live: 0,
            alloc_total: 0,
            free_total: 0,
            config,
        }
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Registers `obj` in the heap with a cleared mark bit.
    pub fn alloc(&mut self, obj: HeapObject) -> ObjResult<ObjectId> {
        if let Some(max) = self.config.max_objects {
            if self.live >= max {
                log::warn!("heap limit of {} objects reached", max);
                return Err(ObjError::OutOfMemory { requested: 1 });
            }
        }
        let kind = obj.kind();
        let slot = HeapSlot { header: ObjHeader::new(kind), obj };

        let id = if let Some(idx) = self.free_list.pop() {
            let entry = &mut self.objects[idx];
            entry.slot = Some(slot);
            ObjectId::new(idx, entry.generation)
        } else {
            self.objects
                .try_reserve(1)
                .map_err(|_| ObjError::OutOfMemory { requested: 1 })?;
            self.objects.push(Entry { generation: 0, slot: Some(slot) });
            ObjectId::new(self.objects.len() - 1, 0)
        };

        self.live += 1;
        self.alloc_total += 1;
        log::trace!("alloc {} {}", id, kind);
        Ok(id)
    }

    pub fn slot(&self, id: ObjectId) -> ObjResult<&HeapSlot> {
        self.objects
            .get(id.index())
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.slot.as_ref())
            .ok_or(ObjError::DanglingHandle { id })
    }

    fn slot_mut(&mut self, id: ObjectId) -> ObjResult<&mut HeapSlot> {
        self.objects
            .get_mut(id.index())
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.slot.as_mut())
            .ok_or(ObjError::DanglingHandle { id })
    }

    pub fn get(&self, id: ObjectId) -> ObjResult<&HeapObject> {
        Ok(&self.slot(id)?.obj)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> ObjResult<&mut HeapObject> {
        Ok(&mut self.slot_mut(id)?.obj)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.slot(id).is_ok()
    }

    /// Kind of the referenced object, `None` for null.
    pub fn type_of(&self, value: Value) -> ObjResult<Option<ObjType>> {
        match value.as_obj_id() {
            None => Ok(None),
            Some(id) => Ok(Some(self.slot(id)?.header.kind)),
        }
    }

    /// True when `value` is a live object of `kind`. Null is never any kind.
    pub fn is_kind(&self, value: Value, kind: ObjType) -> bool {
        matches!(self.type_of(value), Ok(Some(k)) if k == kind)
    }

    /// Narrows `value` to a handle of `kind`.
    pub fn expect_kind(&self, value: Value, kind: ObjType) -> ObjResult<ObjectId> {
        match self.type_of(value)? {
            Some(found) if found == kind => value
                .as_obj_id()
                .ok_or(ObjError::type_mismatch(kind, None)),
            found => Err(ObjError::type_mismatch(kind, found)),
        }
    }

    // ------------------------------------------------------------------
    // Checked narrowing
    // ------------------------------------------------------------------

    // Strings, functions, natives and bound methods are immutable once
    // allocated, so they only get shared accessors.
    narrow!(as_bound_method, BoundMethod, BoundMethod);
    narrow!(as_class, as_class_mut, Class, Class);
    narrow!(as_closure, as_closure_mut, Closure, Closure);
    narrow!(as_function, Function, Function);
    narrow!(as_instance, as_instance_mut, Instance, Instance);
    narrow!(as_native, Native, Native);
    narrow!(as_string, String, VoxString);
    narrow!(as_upvalue, as_upvalue_mut, Upvalue, Upvalue);

    pub fn as_bool(&self, value: Value) -> ObjResult<bool> {
        let id = self.expect_kind(value, ObjType::Bool)?;
        match self.get(id)? {
            HeapObject::Bool(b) => Ok(*b),
            other => Err(ObjError::type_mismatch(ObjType::Bool, Some(other.kind()))),
        }
    }

    pub fn as_number(&self, value: Value) -> ObjResult<f64> {
        let id = self.expect_kind(value, ObjType::Number)?;
        match self.get(id)? {
            HeapObject::Number(n) => Ok(*n),
            other => Err(ObjError::type_mismatch(ObjType::Number, Some(other.kind()))),
        }
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn new_bool(&mut self, value: bool) -> ObjResult<ObjectId> {
        self.alloc(HeapObject::Bool(value))
    }

    pub fn new_number(&mut self, value: f64) -> ObjResult<ObjectId> {
        self.alloc(HeapObject::Number(value))
    }

    /// Creates a string that takes ownership of `chars`.
    pub fn new_string(&mut self, chars: Vec<u8>) -> ObjResult<ObjectId> {
        self.alloc(HeapObject::String(VoxString::from_vec(chars)))
    }

    /// Creates a string holding a copy of `chars`.
    pub fn copy_string(&mut self, chars: &[u8]) -> ObjResult<ObjectId> {
        self.alloc(HeapObject::String(VoxString::from_bytes(chars)))
    }

    pub fn new_function(&mut self, function: Function) -> ObjResult<ObjectId> {
        if let Some(name) = function.name {
            self.as_string(name)?;
        }
        self.alloc(HeapObject::Function(Box::new(function)))
    }

    pub fn new_native(&mut self, function: NativeFn) -> ObjResult<ObjectId> {
        self.alloc(HeapObject::Native(Native { function }))
    }

    /// Wraps `function` in a closure with an empty upvalue array sized to
    /// the function's `upvalue_count`.
    pub fn new_closure(&mut self, function: ObjectId) -> ObjResult<ObjectId> {
        let upvalue_count = self.as_function(function)?.upvalue_count;
        self.alloc(HeapObject::Closure(Closure::new(function, upvalue_count)))
    }

    pub fn set_closure_upvalue(&mut self, closure: ObjectId, index: usize, upvalue: ObjectId) -> ObjResult<()> {
        self.as_upvalue(upvalue)?;
        let closure = self.as_closure_mut(closure)?;
        let count = closure.upvalues.len();
        let cell = closure
            .upvalues
            .get_mut(index)
            .ok_or(ObjError::UpvalueIndexOutOfRange { index, count })?;
        *cell = Some(upvalue);
        Ok(())
    }

    pub fn closure_upvalue(&self, closure: ObjectId, index: usize) -> ObjResult<Option<ObjectId>> {
        let closure = self.as_closure(closure)?;
        closure
            .upvalues
            .get(index)
            .copied()
            .ok_or(ObjError::UpvalueIndexOutOfRange { index, count: closure.upvalues.len() })
    }

    // ------------------------------------------------------------------
    // Collector hooks
    // ------------------------------------------------------------------

    pub fn is_marked(&self, id: ObjectId) -> bool {
        self.slot(id).is_ok_and(|s| s.header.marked)
    }

    pub fn set_marked(&mut self, id: ObjectId, marked: bool) -> ObjResult<()> {
        self.slot_mut(id)?.header.marked = marked;
        Ok(())
    }

    pub fn clear_marks(&mut self) {
        for slot in self.objects.iter_mut().filter_map(|e| e.slot.as_mut()) {
            slot.header.marked = false;
        }
    }

    /// Pushes every object directly referenced by `id` onto `out`.
    ///
    /// Open upvalues contribute nothing: the slot they alias belongs to the
    /// stack, which the collector scans as a root.
    pub fn trace_refs(&self, id: ObjectId, out: &mut Vec<ObjectId>) -> ObjResult<()> {
        fn push_value(out: &mut Vec<ObjectId>, value: Value) {
            if let Some(id) = value.as_obj_id() {
                out.push(id);
            }
        }

        match self.get(id)? {
            HeapObject::Bool(_)
            | HeapObject::Native(_)
            | HeapObject::Number(_)
            | HeapObject::String(_) => {}
            HeapObject::BoundMethod(bound) => {
                push_value(out, bound.receiver);
                out.push(bound.method);
            }
            HeapObject::Class(class) => {
                out.push(class.name);
                out.extend(class.superclass);
                push_value(out, class.constructor);
                for (key, value) in class.methods.iter() {
                    out.push(key.name());
                    push_value(out, value);
                }
            }
            HeapObject::Closure(closure) => {
                out.push(closure.function);
                out.extend(closure.upvalues.iter().flatten().copied());
            }
            HeapObject::Function(function) => {
                out.extend(function.name);
                for value in function.constants.iter() {
                    push_value(out, value);
                }
            }
            HeapObject::Instance(instance) => {
                out.push(instance.klass);
                for (key, value) in instance.fields.iter() {
                    out.push(key.name());
                    push_value(out, value);
                }
            }
            HeapObject::Upvalue(upvalue) => {
                if let UpvalueState::Closed(value) = upvalue.state {
                    push_value(out, value);
                }
            }
        }
        Ok(())
    }

    /// Releases one object and recycles its slot.
    pub fn free(&mut self, id: ObjectId) -> ObjResult<()> {
        let slot = self
            .objects
            .get_mut(id.index())
            .filter(|e| e.generation == id.generation())
            .and_then(Entry::vacate)
            .ok_or(ObjError::DanglingHandle { id })?;
        self.free_list.push(id.index());
        self.live -= 1;
        self.free_total += 1;
        log::trace!("free {} {}", id, slot.header.kind);
        Ok(())
    }

    /// Frees every unmarked object and clears the marks of the survivors.
    /// Returns the number of objects freed.
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for (idx, entry) in self.objects.iter_mut().enumerate() {
            let Some(slot) = entry.slot.as_mut() else {
                continue;
            };
            if slot.header.marked {
                slot.header.marked = false;
                continue;
            }
            entry.vacate();
            self.free_list.push(idx);
            freed += 1;
        }
        self.live -= freed;
        self.free_total += freed as u64;
        log::debug!("sweep freed {} objects, {} live", freed, self.live);
        freed
    }

    /// Live objects in slot order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &HeapSlot)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| e.slot.as_ref().map(|s| (ObjectId::new(idx, e.generation), s)))
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Frees every object. The heap stays usable but starts from empty;
    /// handles from before the teardown stay dangling.
    pub fn teardown(&mut self) -> usize {
        let freed = self.live;
        self.free_list.clear();
        for (idx, entry) in self.objects.iter_mut().enumerate() {
            entry.vacate();
            self.free_list.push(idx);
        }
        self.live = 0;
        self.free_total += freed as u64;
        log::debug!("teardown freed {} objects", freed);
        freed
    }

    pub fn stats(&self) -> HeapStats {
        let mut by_kind = [0usize; ObjType::COUNT];
        for (_, slot) in self.objects() {
            by_kind[slot.header.kind.index()] += 1;
        }
        HeapStats {
            live: self.live,
            allocated: self.alloc_total,
            freed: self.free_total,
            slots: self.objects.len(),
            free_slots: self.free_list.len(),
            by_kind,
        }
    }
}

/// Snapshot of heap occupancy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapStats {
    pub live: usize,
    /// Successful allocations over the heap's lifetime.
    pub allocated: u64,
    pub freed: u64,
    pub slots: usize,
    pub free_slots: usize,
    pub by_kind: [usize; ObjType::COUNT],
}

impl HeapStats {
    pub fn count(&self, kind: ObjType) -> usize {
        self.by_kind[kind.index()]
    }
}

impl fmt::Display for HeapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Heap Stats ===")?;
        for kind in ObjType::ALL {
            writeln!(f, "{:<13} {:>8}", kind.name(), self.count(kind))?;
        }
        writeln!(f, "--------------------------")?;
        writeln!(f, "Live:         {:>8}", self.live)?;
        writeln!(f, "Allocated:    {:>8}", self.allocated)?;
        writeln!(f, "Freed:        {:>8}", self.freed)?;
        write!(f, "Slots:        {:>8} ({} free)", self.slots, self.free_slots)
    }
}
