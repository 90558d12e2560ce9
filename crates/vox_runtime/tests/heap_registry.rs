use proptest::prelude::*;
use vox_runtime::{Function, Heap, HeapConfig, ObjError, ObjType, ObjectId, OpenUpvalues, Value};

#[test]
fn constructors_register_with_cleared_mark() {
    let mut heap = Heap::new();
    let b = heap.new_bool(true).unwrap();
    let n = heap.new_number(1.5).unwrap();
    let s = heap.copy_string(b"hi").unwrap();
    let f = heap.new_function(Function::new()).unwrap();
    let c = heap.new_closure(f).unwrap();
    let u = heap.new_upvalue(0).unwrap();

    let expected = [
        (b, ObjType::Bool),
        (n, ObjType::Number),
        (s, ObjType::String),
        (f, ObjType::Function),
        (c, ObjType::Closure),
        (u, ObjType::Upvalue),
    ];
    for (id, kind) in expected {
        let slot = heap.slot(id).unwrap();
        assert_eq!(slot.header.kind, kind);
        assert!(!slot.header.marked);
        assert_eq!(heap.type_of(Value::obj(id)).unwrap(), Some(kind));
    }
    assert_eq!(heap.len(), expected.len());
    assert_eq!(heap.objects().count(), expected.len());
}

#[test]
fn null_has_no_kind() {
    let heap = Heap::new();
    assert_eq!(heap.type_of(Value::NULL).unwrap(), None);
    assert!(!heap.is_kind(Value::NULL, ObjType::Bool));
}

#[test]
fn narrowing_the_wrong_kind_is_reported() {
    let mut heap = Heap::new();
    let n = heap.new_number(3.0).unwrap();
    let err = heap.as_string(n).unwrap_err();
    assert_eq!(
        err,
        ObjError::TypeMismatch { expected: ObjType::String, found: "number" }
    );
    let err = heap.as_number(Value::NULL).unwrap_err();
    assert_eq!(
        err,
        ObjError::TypeMismatch { expected: ObjType::Number, found: "null" }
    );
    assert_eq!(heap.as_number(Value::obj(n)).unwrap(), 3.0);
}

#[test]
fn freed_handles_are_dangling_and_slots_are_reused() {
    let mut heap = Heap::new();
    let a = heap.new_bool(false).unwrap();
    let _b = heap.new_bool(true).unwrap();
    heap.free(a).unwrap();

    assert_eq!(heap.get(a).unwrap_err(), ObjError::DanglingHandle { id: a });
    assert_eq!(heap.free(a).unwrap_err(), ObjError::DanglingHandle { id: a });

    let c = heap.new_number(7.0).unwrap();
    assert_eq!(c.index(), a.index());
    assert_ne!(c, a);
    assert_eq!(heap.len(), 2);

    // The recycled slot does not resurrect the old handle.
    assert_eq!(heap.get(a).unwrap_err(), ObjError::DanglingHandle { id: a });
    assert_eq!(heap.as_number(Value::obj(a)).unwrap_err(), ObjError::DanglingHandle { id: a });
    assert_eq!(heap.as_number(Value::obj(c)).unwrap(), 7.0);
}

#[test]
fn stale_string_handle_does_not_reach_its_successor() {
    let mut heap = Heap::new();
    let name = heap.copy_string(b"name").unwrap();
    heap.free(name).unwrap();
    let n = heap.new_number(1.0).unwrap();

    assert_eq!(n.index(), name.index());
    assert!(!heap.contains(name));
    assert_eq!(heap.type_of(Value::obj(name)).unwrap_err(), ObjError::DanglingHandle { id: name });
    assert_eq!(heap.set_marked(name, true).unwrap_err(), ObjError::DanglingHandle { id: name });
    assert_eq!(heap.free(name).unwrap_err(), ObjError::DanglingHandle { id: name });
    assert!(heap.contains(n));
}

#[test]
fn swept_and_torn_down_handles_stay_dangling() {
    let mut heap = Heap::new();
    let swept = heap.new_bool(true).unwrap();
    heap.sweep();
    let reused = heap.new_bool(false).unwrap();
    assert_eq!(reused.index(), swept.index());
    assert!(!heap.contains(swept));

    heap.teardown();
    let after = heap.new_bool(true).unwrap();
    assert!(!heap.contains(reused));
    assert!(heap.contains(after));
    assert_eq!(heap.len(), 1);
}

#[test]
fn object_limit_surfaces_out_of_memory() {
    let mut heap = Heap::with_config(HeapConfig::default().with_max_objects(2));
    heap.new_bool(true).unwrap();
    heap.new_bool(false).unwrap();
    assert_eq!(
        heap.new_number(0.0).unwrap_err(),
        ObjError::OutOfMemory { requested: 1 }
    );
    assert_eq!(heap.len(), 2);
}

#[test]
fn sweep_frees_unmarked_and_clears_survivor_marks() {
    let mut heap = Heap::new();
    let keep = heap.copy_string(b"keep").unwrap();
    let drop = heap.copy_string(b"drop").unwrap();
    heap.set_marked(keep, true).unwrap();

    assert_eq!(heap.sweep(), 1);
    assert!(heap.contains(keep));
    assert!(!heap.contains(drop));
    assert!(!heap.is_marked(keep));
}

#[test]
fn trace_refs_reports_children() {
    let mut heap = Heap::new();
    let name = heap.copy_string(b"f").unwrap();
    let k = heap.new_number(1.0).unwrap();
    let mut function = Function::named(name, 0);
    function.upvalue_count = 1;
    function.add_constant(Value::obj(k)).unwrap();
    let f = heap.new_function(function).unwrap();
    let closure = heap.new_closure(f).unwrap();
    let up = heap.new_upvalue(0).unwrap();
    heap.set_closure_upvalue(closure, 0, up).unwrap();

    let mut out = Vec::new();
    heap.trace_refs(f, &mut out).unwrap();
    assert_eq!(out, vec![name, k]);

    out.clear();
    heap.trace_refs(closure, &mut out).unwrap();
    assert_eq!(out, vec![f, up]);

    out.clear();
    heap.trace_refs(up, &mut out).unwrap();
    assert!(out.is_empty(), "open upvalues alias the stack, which is a root");

    heap.close_upvalue(&mut OpenUpvalues::new(), up, &[Value::obj(k)]).unwrap();
    heap.trace_refs(up, &mut out).unwrap();
    assert_eq!(out, vec![k]);
}

#[test]
fn teardown_frees_everything() {
    let mut heap = Heap::new();
    for i in 0..10 {
        heap.new_number(i as f64).unwrap();
    }
    assert_eq!(heap.teardown(), 10);
    assert!(heap.is_empty());
    assert_eq!(heap.objects().count(), 0);
    assert_eq!(heap.stats().freed, 10);
}

#[test]
fn heaps_are_independent() {
    let mut a = Heap::new();
    let mut b = Heap::new();
    a.new_bool(true).unwrap();
    a.new_bool(true).unwrap();
    b.new_number(1.0).unwrap();
    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 1);
    assert_eq!(a.stats().count(ObjType::Bool), 2);
    assert_eq!(b.stats().count(ObjType::Bool), 0);
}

#[test]
fn stats_display_lists_every_kind() {
    let mut heap = Heap::new();
    heap.copy_string(b"x").unwrap();
    let text = heap.stats().to_string();
    for kind in ObjType::ALL {
        assert!(text.contains(kind.name()), "missing {kind} in {text}");
    }
}

proptest! {
    #[test]
    fn live_count_is_allocations_minus_frees(
        marks in proptest::collection::vec(any::<bool>(), 0..200),
    ) {
        let mut heap = Heap::new();
        let ids: Vec<ObjectId> = marks
            .iter()
            .enumerate()
            .map(|(i, _)| heap.new_number(i as f64).unwrap())
            .collect();
        for (id, keep) in ids.iter().zip(&marks) {
            heap.set_marked(*id, *keep).unwrap();
        }

        let freed = heap.sweep();
        let kept = marks.iter().filter(|k| **k).count();
        prop_assert_eq!(freed, marks.len() - kept);
        prop_assert_eq!(heap.len(), kept);
        prop_assert_eq!(heap.objects().count(), kept);

        let stats = heap.stats();
        prop_assert_eq!(stats.allocated - stats.freed, heap.len() as u64);
    }
}
