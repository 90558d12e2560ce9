//! Classes, instances and bound methods.

use super::heap::{Heap, HeapObject};
use super::table::{Table, TableKey};
use vox_core::{ObjError, ObjResult, ObjType, ObjectId, Value};

#[derive(Clone, Debug)]
pub struct Class {
    pub name: ObjectId,
    pub superclass: Option<ObjectId>,
    pub constructor: Value,
    pub methods: Table,
}

#[derive(Clone, Debug)]
pub struct Instance {
    pub klass: ObjectId,
    pub fields: Table,
}

/// A closure paired with the receiver it was looked up on.
#[derive(Clone, Copy, Debug)]
pub struct BoundMethod {
    pub receiver: Value,
    pub method: ObjectId,
}

impl Heap {
    /// Creates a class. `name` must be a string and `superclass`, if given,
    /// an existing class; the chain is acyclic because a superclass always
    /// exists before its subclasses.
    pub fn new_class(&mut self, name: ObjectId, superclass: Option<ObjectId>) -> ObjResult<ObjectId> {
        self.as_string(name)?;
        if let Some(superclass) = superclass {
            self.as_class(superclass)?;
        }
        self.alloc(HeapObject::Class(Box::new(Class {
            name,
            superclass,
            constructor: Value::NULL,
            methods: Table::new(),
        })))
    }

    pub fn new_instance(&mut self, klass: ObjectId) -> ObjResult<ObjectId> {
        self.as_class(klass)?;
        self.alloc(HeapObject::Instance(Instance { klass, fields: Table::new() }))
    }

    /// Pairs `receiver` with the closure `method`. Nothing is invoked.
    pub fn new_bound_method(&mut self, receiver: Value, method: ObjectId) -> ObjResult<ObjectId> {
        self.as_closure(method)?;
        self.alloc(HeapObject::BoundMethod(BoundMethod { receiver, method }))
    }

    /// Builds a table key from the string object `name`.
    pub fn table_key(&self, name: ObjectId) -> ObjResult<TableKey> {
        Ok(TableKey::new(name, self.as_string(name)?))
    }

    pub fn define_method(&mut self, class: ObjectId, name: ObjectId, method: Value) -> ObjResult<()> {
        let key = self.table_key(name)?;
        self.as_class_mut(class)?.methods.insert(key, method);
        Ok(())
    }

    pub fn set_constructor(&mut self, class: ObjectId, constructor: Value) -> ObjResult<()> {
        self.as_class_mut(class)?.constructor = constructor;
        Ok(())
    }

    /// Resolves `name` on `class`, then up the superclass chain. The nearest
    /// definition wins.
    pub fn find_method(&self, class: ObjectId, name: ObjectId) -> ObjResult<Value> {
        let key = self.table_key(name)?;
        let mut cur = class;
        loop {
            let klass = self.as_class(cur)?;
            if let Some(method) = klass.methods.get(&key) {
                return Ok(method);
            }
            match klass.superclass {
                Some(superclass) => cur = superclass,
                None => {
                    return Err(ObjError::MethodNotFound {
                        class: self.class_name(class)?,
                        method: String::from_utf8_lossy(key.as_bytes()).into_owned(),
                    });
                }
            }
        }
    }

    /// Resolves the constructor slot along the superclass chain.
    pub fn find_constructor(&self, class: ObjectId) -> ObjResult<Value> {
        let mut cur = class;
        loop {
            let klass = self.as_class(cur)?;
            if !klass.constructor.is_null() {
                return Ok(klass.constructor);
            }
            match klass.superclass {
                Some(superclass) => cur = superclass,
                None => {
                    return Err(ObjError::ConstructorNotFound { class: self.class_name(class)? });
                }
            }
        }
    }

    pub fn class_name(&self, class: ObjectId) -> ObjResult<String> {
        let name = self.as_class(class)?.name;
        Ok(self.as_string(name)?.to_str_lossy().into_owned())
    }

    /// Reads an instance-local field. Fields are never inherited, so a miss
    /// is `None` regardless of what the class defines.
    pub fn get_field(&self, instance: ObjectId, name: ObjectId) -> ObjResult<Option<Value>> {
        let key = self.table_key(name)?;
        Ok(self.as_instance(instance)?.fields.get(&key))
    }

    /// Sets a field, returning the value it replaced.
    pub fn set_field(&mut self, instance: ObjectId, name: ObjectId, value: Value) -> ObjResult<Option<Value>> {
        let key = self.table_key(name)?;
        Ok(self.as_instance_mut(instance)?.fields.insert(key, value))
    }

    /// Looks `name` up on the receiver's class chain and binds it to the
    /// receiver.
    pub fn bind_method(&mut self, receiver: Value, name: ObjectId) -> ObjResult<ObjectId> {
        let Some(id) = receiver.as_obj_id() else {
            return Err(ObjError::type_mismatch(ObjType::Instance, None));
        };
        let klass = self.as_instance(id)?.klass;
        let method = self.find_method(klass, name)?;
        let closure = self.expect_kind(method, ObjType::Closure)?;
        self.new_bound_method(receiver, closure)
    }

    /// Property access: an instance field shadows a method of the same name.
    pub fn get_property(&mut self, instance: ObjectId, name: ObjectId) -> ObjResult<Value> {
        if let Some(value) = self.get_field(instance, name)? {
            return Ok(value);
        }
        let bound = self.bind_method(Value::obj(instance), name)?;
        Ok(Value::obj(bound))
    }
}
