use vox_runtime::{CallOutcome, Function, Heap, ObjError, ObjResult, ObjectId, Value};

fn closure(heap: &mut Heap, name: &str, arity: u8) -> ObjectId {
    let name = heap.copy_string(name.as_bytes()).unwrap();
    let function = heap.new_function(Function::named(name, arity)).unwrap();
    heap.new_closure(function).unwrap()
}

fn class(heap: &mut Heap, name: &str) -> ObjectId {
    let name = heap.copy_string(name.as_bytes()).unwrap();
    heap.new_class(name, None).unwrap()
}

fn frame(outcome: CallOutcome) -> vox_runtime::CallFrame {
    match outcome {
        CallOutcome::Frame(frame) => frame,
        CallOutcome::Value(v) => panic!("expected a frame, got {v:?}"),
    }
}

#[test]
fn plain_closure_call_puts_the_closure_in_slot_zero() {
    let mut heap = Heap::new();
    let f = closure(&mut heap, "f", 1);
    let arg = Value::obj(heap.new_number(1.0).unwrap());

    let frame = frame(heap.call_value(Value::obj(f), &[arg]).unwrap());
    assert_eq!(frame.closure, f);
    assert_eq!(frame.slots.as_slice(), &[Value::obj(f), arg]);
}

#[test]
fn bound_method_call_puts_the_receiver_in_slot_zero() {
    let mut heap = Heap::new();
    let klass = class(&mut heap, "Point");
    let receiver = Value::obj(heap.new_instance(klass).unwrap());
    let m = closure(&mut heap, "norm", 0);
    let bound = heap.new_bound_method(receiver, m).unwrap();

    let frame = frame(heap.call_value(Value::obj(bound), &[]).unwrap());
    assert_eq!(frame.closure, m);
    assert_eq!(frame.slots.as_slice(), &[receiver]);
}

#[test]
fn wrong_argument_count_is_rejected() {
    let mut heap = Heap::new();
    let f = closure(&mut heap, "f", 2);
    assert_eq!(
        heap.call_value(Value::obj(f), &[Value::NULL]).unwrap_err(),
        ObjError::ArityMismatch { expected: 2, got: 1 }
    );
}

#[test]
fn class_with_constructor_binds_a_fresh_instance() {
    let mut heap = Heap::new();
    let klass = class(&mut heap, "Point");
    let init = closure(&mut heap, "init", 2);
    heap.set_constructor(klass, Value::obj(init)).unwrap();
    let x = Value::obj(heap.new_number(1.0).unwrap());
    let y = Value::obj(heap.new_number(2.0).unwrap());

    let frame = frame(heap.call_value(Value::obj(klass), &[x, y]).unwrap());
    assert_eq!(frame.closure, init);
    assert_eq!(frame.slots.len(), 3);
    assert_eq!(&frame.slots[1..], &[x, y]);
    let instance = heap.as_instance(frame.slots[0].as_obj_id().unwrap()).unwrap();
    assert_eq!(instance.klass, klass);
}

#[test]
fn class_without_constructor_returns_the_instance() {
    let mut heap = Heap::new();
    let klass = class(&mut heap, "Empty");

    let CallOutcome::Value(v) = heap.call_value(Value::obj(klass), &[]).unwrap() else {
        panic!("expected a value");
    };
    assert_eq!(heap.format_value(v), "<Empty instance>");

    assert_eq!(
        heap.call_value(Value::obj(klass), &[Value::NULL]).unwrap_err(),
        ObjError::ArityMismatch { expected: 0, got: 1 }
    );
}

fn sum(heap: &mut Heap, args: &[Value]) -> ObjResult<Value> {
    let mut total = 0.0;
    for arg in args {
        total += heap.as_number(*arg)?;
    }
    Ok(Value::obj(heap.new_number(total)?))
}

#[test]
fn natives_run_immediately() {
    let mut heap = Heap::new();
    let native = heap.new_native(sum).unwrap();
    let a = Value::obj(heap.new_number(2.0).unwrap());
    let b = Value::obj(heap.new_number(3.5).unwrap());

    let CallOutcome::Value(v) = heap.call_value(Value::obj(native), &[a, b]).unwrap() else {
        panic!("expected a value");
    };
    assert_eq!(heap.as_number(v).unwrap(), 5.5);

    assert!(matches!(
        heap.call_value(Value::obj(native), &[Value::NULL]),
        Err(ObjError::TypeMismatch { .. })
    ));
}

#[test]
fn non_callables_are_rejected() {
    let mut heap = Heap::new();
    let n = heap.new_number(1.0).unwrap();
    let s = heap.copy_string(b"s").unwrap();

    assert!(!heap.is_callable(Value::NULL));
    assert!(!heap.is_callable(Value::obj(n)));
    assert_eq!(
        heap.call_value(Value::NULL, &[]).unwrap_err(),
        ObjError::NotCallable { found: "null" }
    );
    assert_eq!(
        heap.call_value(Value::obj(s), &[]).unwrap_err().to_string(),
        "Can only call functions and classes, not string"
    );
}
