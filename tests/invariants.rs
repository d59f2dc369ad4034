//! Property-based invariant tests for the reactor.
//!
//! 1. Memoization: repeated reads without writes evaluate once.
//! 2. Invalidation reaches every link of a derived chain.
//! 3. Stale edges are pruned: a branch that stops reading `x` stops
//!    being invalidated by `x`.
//! 4. Observers fire in registration order, once per write.
//! 5. Writes to derived properties never change what they read back.

use proptest::prelude::*;
use spark_props::{PropError, Reactor};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ── Helpers ─────────────────────────────────────────────────────────────

fn chain(len: usize, seed: i64) -> Reactor<i64> {
    let mut builder = Reactor::<i64>::builder().stored("d0", seed);
    for i in 1..=len {
        let prev = format!("d{}", i - 1);
        builder = builder.derived(format!("d{i}"), move |r| Ok(r.get(&prev)? + 1));
    }
    builder.build().unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    SetFlag(bool),
    SetX(i64),
    Read,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::SetFlag),
        (-1000i64..1000).prop_map(Op::SetX),
        Just(Op::Read),
    ]
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn memoized_until_written(seed in any::<i32>(), reads in 1usize..20) {
        let calls = Rc::new(Cell::new(0u32));
        let r = {
            let calls = calls.clone();
            Reactor::<i64>::builder()
                .stored("x", seed)
                .derived("double", move |r| {
                    calls.set(calls.get() + 1);
                    Ok(r.get("x")? * 2)
                })
                .build()
                .unwrap()
        };

        for _ in 0..reads {
            prop_assert_eq!(r.get("double").unwrap(), seed as i64 * 2);
        }
        prop_assert_eq!(calls.get(), 1);
    }

    #[test]
    fn chain_invalidates_every_link(len in 1usize..12, seed in -100i64..100, next in -100i64..100) {
        let r = chain(len, seed);
        let last = format!("d{len}");
        prop_assert_eq!(r.get(&last).unwrap(), seed + len as i64);

        r.set("d0", next).unwrap();
        for i in 1..=len {
            let key = format!("d{i}");
            prop_assert!(!r.is_fresh(&key).unwrap());
        }
        prop_assert_eq!(r.get(&last).unwrap(), next + len as i64);
    }

    #[test]
    fn stale_branches_are_pruned(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let calls = Rc::new(Cell::new(0u32));
        let r = {
            let calls = calls.clone();
            Reactor::<i64>::builder()
                .stored("flag", 1)
                .stored("x", 0)
                .derived("conditional", move |r| {
                    calls.set(calls.get() + 1);
                    if r.get("flag")? != 0 { r.get("x") } else { Ok(0) }
                })
                .build()
                .unwrap()
        };

        // Model of the cache: flag value seen by the last evaluation, and
        // whether the cache is still valid.
        let mut flag = true;
        let mut x = 0i64;
        let mut evaluated_with: Option<bool> = None;
        let mut fresh = false;
        let mut expected_calls = 0u32;

        for op in ops {
            match op {
                Op::SetFlag(v) => {
                    flag = v;
                    r.set("flag", i64::from(v)).unwrap();
                    if evaluated_with.is_some() {
                        fresh = false;
                    }
                }
                Op::SetX(v) => {
                    x = v;
                    r.set("x", v).unwrap();
                    if evaluated_with == Some(true) {
                        fresh = false;
                    }
                }
                Op::Read => {
                    if !fresh {
                        expected_calls += 1;
                        evaluated_with = Some(flag);
                        fresh = true;
                    }
                    let expected = if flag { x } else { 0 };
                    prop_assert_eq!(r.get("conditional").unwrap(), expected);
                }
            }
            prop_assert_eq!(r.is_fresh("conditional").unwrap(), fresh);
            prop_assert_eq!(calls.get(), expected_calls);
        }
    }

    #[test]
    fn observers_fire_in_registration_order(observers in 1usize..10, writes in 1usize..6) {
        let r = Reactor::<i64>::builder().stored("x", 0).build().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..observers {
            let log = log.clone();
            r.observe("x", move || log.borrow_mut().push(i));
        }

        for w in 0..writes {
            r.set("x", w as i64).unwrap();
        }

        let expected: Vec<usize> = (0..writes).flat_map(|_| 0..observers).collect();
        prop_assert_eq!(&*log.borrow(), &expected);
    }

    #[test]
    fn derived_writes_are_inert(seed in -1000i64..1000, junk in any::<i64>()) {
        let r = Reactor::<i64>::builder()
            .stored("x", seed)
            .derived("negated", |r| Ok(-r.get("x")?))
            .build()
            .unwrap();

        let before = r.get("negated").unwrap();
        prop_assert!(matches!(r.set("negated", junk), Err(PropError::ReadOnly(_))));
        prop_assert_eq!(r.get("negated").unwrap(), before);
        prop_assert_eq!(r.evaluations("negated").unwrap(), 1);
    }
}
