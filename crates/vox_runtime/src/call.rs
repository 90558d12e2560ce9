//! Call binding.
//!
//! Turns "call this value with these arguments" into what the interpreter
//! needs next: either a frame to push or, for natives and constructor-less
//! classes, the finished result.

use crate::core::heap::Heap;
use smallvec::SmallVec;
use vox_core::{ObjError, ObjResult, ObjType, ObjectId, Value};

/// A frame ready to run.
///
/// `slots[0]` is the receiver for methods and constructors, and the callee
/// closure itself for plain calls. Arguments follow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallFrame {
    pub closure: ObjectId,
    pub slots: SmallVec<[Value; 8]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Frame(CallFrame),
    Value(Value),
}

impl Heap {
    pub fn is_callable(&self, value: Value) -> bool {
        matches!(
            self.type_of(value),
            Ok(Some(ObjType::Closure | ObjType::BoundMethod | ObjType::Class | ObjType::Native))
        )
    }

    pub fn call_value(&mut self, callee: Value, args: &[Value]) -> ObjResult<CallOutcome> {
        let Some(id) = callee.as_obj_id() else {
            return Err(ObjError::NotCallable { found: "null" });
        };
        match self.slot(id)?.header.kind {
            ObjType::Closure => self.bind_frame(id, callee, args).map(CallOutcome::Frame),
            ObjType::BoundMethod => {
                let bound = *self.as_bound_method(id)?;
                self.bind_frame(bound.method, bound.receiver, args)
                    .map(CallOutcome::Frame)
            }
            ObjType::Class => self.instantiate(id, args),
            ObjType::Native => {
                let native = self.as_native(id)?.function;
                native(self, args).map(CallOutcome::Value)
            }
            other => Err(ObjError::NotCallable { found: other.name() }),
        }
    }

    fn bind_frame(&self, closure: ObjectId, slot_zero: Value, args: &[Value]) -> ObjResult<CallFrame> {
        let function = self.as_closure(closure)?.function;
        let arity = self.as_function(function)?.arity as usize;
        if args.len() != arity {
            return Err(ObjError::ArityMismatch { expected: arity, got: args.len() });
        }
        let mut slots: SmallVec<[Value; 8]> = SmallVec::with_capacity(args.len() + 1);
        slots.push(slot_zero);
        slots.extend(args.iter().copied());
        Ok(CallFrame { closure, slots })
    }

    /// Creates an instance and binds the constructor, if the chain has one,
    /// with the instance as receiver.
    fn instantiate(&mut self, class: ObjectId, args: &[Value]) -> ObjResult<CallOutcome> {
        let instance = Value::obj(self.new_instance(class)?);
        match self.find_constructor(class) {
            Ok(constructor) => {
                let closure = self.expect_kind(constructor, ObjType::Closure)?;
                self.bind_frame(closure, instance, args).map(CallOutcome::Frame)
            }
            Err(ObjError::ConstructorNotFound { .. }) if args.is_empty() => {
                Ok(CallOutcome::Value(instance))
            }
            Err(ObjError::ConstructorNotFound { .. }) => {
                Err(ObjError::ArityMismatch { expected: 0, got: args.len() })
            }
            Err(err) => Err(err),
        }
    }
}
