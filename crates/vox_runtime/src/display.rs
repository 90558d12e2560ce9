//! Printable rendering of values.

use crate::core::heap::{Heap, HeapObject};
use vox_core::{ObjectId, Value};

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        if n == 0.0 && n.is_sign_negative() {
            return "-0".to_string();
        }
        let mut buf = itoa::Buffer::new();
        return buf.format(n as i64).to_string();
    }
    let mut buf = ryu::Buffer::new();
    buf.format_finite(n).to_string()
}

impl Heap {
    pub fn format_value(&self, value: Value) -> String {
        match value.as_obj_id() {
            None => "null".to_string(),
            Some(id) => self.format_object(id),
        }
    }

    fn format_object(&self, id: ObjectId) -> String {
        let Ok(obj) = self.get(id) else {
            return format!("<freed {}>", id);
        };
        match obj {
            HeapObject::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            HeapObject::Number(n) => format_number(*n),
            HeapObject::String(s) => s.to_str_lossy().into_owned(),
            HeapObject::Function(_) => self.format_function(id),
            HeapObject::Closure(closure) => self.format_function(closure.function),
            HeapObject::BoundMethod(bound) => self.format_object(bound.method),
            HeapObject::Class(class) => self.format_object(class.name),
            HeapObject::Instance(instance) => match self.class_name(instance.klass) {
                Ok(name) => format!("<{} instance>", name),
                Err(_) => "<instance>".to_string(),
            },
            HeapObject::Native(_) => "<native fn>".to_string(),
            HeapObject::Upvalue(_) => "upvalue".to_string(),
        }
    }

    fn format_function(&self, function: ObjectId) -> String {
        match self.as_function(function).map(|f| f.name) {
            Ok(Some(name)) => format!("<fn {}>", self.format_object(name)),
            Ok(None) => "<script>".to_string(),
            Err(_) => "<fn>".to_string(),
        }
    }
}
