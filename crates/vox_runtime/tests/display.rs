use vox_runtime::{Function, Heap, Value};

fn show(heap: &mut Heap, n: f64) -> String {
    let id = heap.new_number(n).unwrap();
    heap.format_value(Value::obj(id))
}

#[test]
fn numbers_render_like_the_language_prints_them() {
    let mut heap = Heap::new();
    assert_eq!(show(&mut heap, 3.0), "3");
    assert_eq!(show(&mut heap, -12.0), "-12");
    assert_eq!(show(&mut heap, 2.5), "2.5");
    assert_eq!(show(&mut heap, -0.0), "-0");
    assert_eq!(show(&mut heap, f64::NAN), "nan");
    assert_eq!(show(&mut heap, f64::NEG_INFINITY), "-inf");
}

#[test]
fn objects_render_by_kind() {
    let mut heap = Heap::new();
    let t = heap.new_bool(true).unwrap();
    let s = heap.copy_string(b"hello").unwrap();
    let name = heap.copy_string(b"add").unwrap();
    let f = heap.new_function(Function::named(name, 2)).unwrap();
    let script = heap.new_function(Function::new()).unwrap();
    let c = heap.new_closure(f).unwrap();
    let class_name = heap.copy_string(b"Point").unwrap();
    let klass = heap.new_class(class_name, None).unwrap();

    assert_eq!(heap.format_value(Value::NULL), "null");
    assert_eq!(heap.format_value(Value::obj(t)), "true");
    assert_eq!(heap.format_value(Value::obj(s)), "hello");
    assert_eq!(heap.format_value(Value::obj(f)), "<fn add>");
    assert_eq!(heap.format_value(Value::obj(script)), "<script>");
    assert_eq!(heap.format_value(Value::obj(c)), "<fn add>");
    assert_eq!(heap.format_value(Value::obj(klass)), "Point");
}
