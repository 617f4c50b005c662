#![forbid(unsafe_code)]

//! Property tests for the variable store.

use std::collections::HashMap;

use folio_harness::CallProbe;
use folio_runtime::{Subscription, VariableBinding, VariableStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Set(usize, i64),
    Subscribe(usize),
    Unsubscribe(usize),
}

const KEYS: [&str; 4] = ["hexagon_sides", "fibonacci_seed", "circle_diameter", "amplitude"];

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..KEYS.len(), any::<i64>()).prop_map(|(k, v)| Op::Set(k, v)),
        1 => (0..KEYS.len()).prop_map(Op::Subscribe),
        1 => any::<usize>().prop_map(Op::Unsubscribe),
    ]
}

proptest! {
    /// Reading any unset key returns the caller's fallback and does not seed it.
    #[test]
    fn unset_reads_return_fallback(key in "[a-z_]{1,16}", fallback in any::<i64>()) {
        let store = VariableStore::new();
        prop_assert_eq!(store.get(&key, fallback), fallback);
        prop_assert!(!store.contains(&key));
        prop_assert_eq!(store.version(&key), 0);
    }

    /// After any write sequence, each key holds its last written value.
    #[test]
    fn last_write_wins(writes in prop::collection::vec((0..KEYS.len(), any::<i64>()), 0..64)) {
        let store = VariableStore::new();
        let mut expected = HashMap::new();
        for (k, v) in &writes {
            store.set(KEYS[*k], *v);
            expected.insert(KEYS[*k], *v);
        }
        for key in KEYS {
            let got = store.get_value(key).and_then(|v| v.as_int());
            prop_assert_eq!(got, expected.get(key).copied());
        }
        prop_assert_eq!(store.write_count(), writes.len() as u64);
    }

    /// Initialization never overwrites keys that already hold a value.
    #[test]
    fn initialize_preserves_existing(
        existing in prop::collection::vec((0..KEYS.len(), any::<i64>()), 0..8),
        defaults in prop::collection::vec(any::<i64>(), KEYS.len()),
    ) {
        let store = VariableStore::new();
        let mut before = HashMap::new();
        for (k, v) in &existing {
            store.set(KEYS[*k], *v);
            before.insert(KEYS[*k], *v);
        }

        let seeded = store.initialize(KEYS.iter().copied().zip(defaults.iter().copied()));
        prop_assert_eq!(seeded, KEYS.len() - before.len());

        for (i, key) in KEYS.iter().enumerate() {
            let want = before.get(key).copied().unwrap_or(defaults[i]);
            prop_assert_eq!(store.get(key, 0_i64), want);
        }
    }

    /// Every live subscription of a key is notified exactly once per write to
    /// that key, and never after it unsubscribes.
    #[test]
    fn notifications_exactly_once(ops in prop::collection::vec(op(), 0..96)) {
        let store = VariableStore::new();
        let mut live: Vec<(usize, CallProbe, Subscription)> = Vec::new();
        let mut retired: Vec<(CallProbe, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    let before: Vec<usize> = live.iter().map(|(_, p, _)| p.calls()).collect();
                    store.set(KEYS[k], v);
                    for ((key, probe, _), calls) in live.iter().zip(before) {
                        let delta = probe.calls() - calls;
                        prop_assert_eq!(delta, usize::from(*key == k));
                    }
                    for (probe, calls) in &retired {
                        prop_assert_eq!(probe.calls(), *calls);
                    }
                }
                Op::Subscribe(k) => {
                    let probe = CallProbe::new();
                    let sub = probe.attach(&store, KEYS[k]);
                    live.push((k, probe, sub));
                }
                Op::Unsubscribe(i) => {
                    if !live.is_empty() {
                        let (_, probe, sub) = live.remove(i % live.len());
                        sub.unsubscribe();
                        sub.unsubscribe();
                        let calls = probe.calls();
                        retired.push((probe, calls));
                    }
                }
            }
        }

        for (k, key) in KEYS.iter().enumerate() {
            let expected = live.iter().filter(|(lk, _, _)| *lk == k).count();
            prop_assert_eq!(store.subscriber_count(key), expected);
        }
    }

    /// Bindings of one key always agree with each other and with the store.
    #[test]
    fn bindings_converge(writes in prop::collection::vec(any::<i64>(), 1..32), fallback in any::<i64>()) {
        let store = VariableStore::new();
        let a = VariableBinding::new(&store, "fibonacci_seed", fallback);
        let b = VariableBinding::new(&store, "fibonacci_seed", fallback);
        let set_a = a.setter();

        for (i, v) in writes.iter().enumerate() {
            if i % 2 == 0 { set_a.set(*v) } else { b.set(*v) }
            prop_assert_eq!(a.get(), *v);
            prop_assert_eq!(b.get(), *v);
            prop_assert_eq!(store.get("fibonacci_seed", fallback), *v);
        }
        prop_assert_eq!(a.updates(), writes.len() as u64);
    }
}
