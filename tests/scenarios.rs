use spark_props::{decls, Decl, PropError, PropKey, PropKind, Reactor, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn counted<F>(calls: &Rc<Cell<u32>>, f: F) -> impl Fn(&Reactor<i64>) -> Result<i64, PropError> + 'static
where
    F: Fn(&Reactor<i64>) -> Result<i64, PropError> + 'static,
{
    let calls = calls.clone();
    move |r: &Reactor<i64>| {
        calls.set(calls.get() + 1);
        f(r)
    }
}

#[test]
fn read_twice_computes_once() {
    let calls = Rc::new(Cell::new(0));
    let r = Reactor::<i64>::builder()
        .stored("x", 2)
        .derived("double", counted(&calls, |r| Ok(r.get("x")? * 2)))
        .build()
        .unwrap();

    assert_eq!(r.get("double").unwrap(), 4);
    assert_eq!(r.get("double").unwrap(), 4);
    assert_eq!(calls.get(), 1);

    r.set("x", 5).unwrap();
    assert_eq!(r.get("double").unwrap(), 10);
    assert_eq!(calls.get(), 2);
}

#[test]
fn diamond_recomputes_bottom_once_per_read() {
    //      a
    //     / \
    //    b   c
    //     \ /
    //      d
    let d_calls = Rc::new(Cell::new(0));
    let r = Reactor::<i64>::builder()
        .stored("a", 1)
        .derived("b", |r| Ok(r.get("a")? + 10))
        .derived("c", |r| Ok(r.get("a")? * 10))
        .derived("d", counted(&d_calls, |r| Ok(r.get("b")? + r.get("c")?)))
        .build()
        .unwrap();

    assert_eq!(r.get("d").unwrap(), 21);
    r.set("a", 2).unwrap();
    assert_eq!(r.get("d").unwrap(), 32);
    assert_eq!(d_calls.get(), 2);
}

#[test]
fn growing_dependency_set_is_discovered() {
    let r = Reactor::<Value>::new(decls! {
        flag = false,
        x = 1,
        conditional => |r: &Reactor<Value>| {
            if r.get("flag")?.as_bool()? { r.get("x") } else { Ok(Value::Int(0)) }
        },
    })
    .unwrap();

    assert_eq!(r.get("conditional").unwrap(), Value::Int(0));
    assert_eq!(r.dependents("x").unwrap(), Vec::<PropKey>::new());

    r.set("flag", true).unwrap();
    assert_eq!(r.get("conditional").unwrap(), Value::Int(1));

    r.set("x", 42).unwrap();
    assert_eq!(r.get("conditional").unwrap(), Value::Int(42));
}

#[test]
fn derived_of_derived_registered_through_cache_hit() {
    // `inner` is already cached when `outer` first reads it; the edge must
    // still form.
    let r = Reactor::<i64>::builder()
        .stored("x", 3)
        .derived("inner", |r| Ok(r.get("x")? + 1))
        .derived("outer", |r| Ok(r.get("inner")? * 2))
        .build()
        .unwrap();

    assert_eq!(r.get("inner").unwrap(), 4);
    assert_eq!(r.get("outer").unwrap(), 8);
    assert_eq!(r.dependents("inner").unwrap(), vec![PropKey::new("outer")]);

    r.set("x", 10).unwrap();
    assert_eq!(r.get("outer").unwrap(), 22);
}

#[test]
fn observer_sees_every_write_in_order() {
    let r = Reactor::<i64>::builder().stored("x", 0).build().unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second"] {
        let log = log.clone();
        let reader = r.prop("x").unwrap();
        r.try_observe("x", move || {
            log.borrow_mut().push((tag, reader.read()?));
            Ok(())
        });
    }

    r.set("x", 1).unwrap();
    r.set("x", 2).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
    );
}

#[test]
fn writing_derived_has_no_effect() {
    let r = Reactor::<i64>::new([
        ("x", Decl::stored(1)),
        ("y", Decl::derived(|r: &Reactor<i64>| Ok(r.get("x")? + 1))),
    ])
    .unwrap();

    assert_eq!(r.kind("y").unwrap(), PropKind::Derived);
    assert!(matches!(r.set("y", 100), Err(PropError::ReadOnly(_))));
    assert_eq!(r.get("y").unwrap(), 2);
}

#[test]
fn keys_and_snapshot_follow_declaration_order() {
    let r = Reactor::<Value>::new(decls! {
        name = "No One",
        placeholder = "Choose your house!",
        shout => |r: &Reactor<Value>| Ok(r.get("name")?.as_str()?.to_uppercase().into()),
    })
    .unwrap();

    let keys: Vec<&str> = r.keys().map(PropKey::as_str).collect();
    assert_eq!(keys, vec!["name", "placeholder", "shout"]);

    let snapshot = r.snapshot().unwrap();
    assert_eq!(snapshot["shout"], Value::from("NO ONE"));
    assert!(r.contains("placeholder"));
    assert!(!r.contains("house"));
}
