#![forbid(unsafe_code)]

//! Session-scoped keyed variable store with change notification.
//!
//! # Design
//!
//! [`VariableStore`] is a cheap, clonable handle to shared interior state.
//! Clones observe and mutate the same variables. Each key owns a list of
//! subscribers; [`set`](VariableStore::set) commits the value and then walks a
//! snapshot of that list, calling each live subscriber once.
//!
//! # Invariants
//!
//! 1. A key has at most one value; reads of unset keys return the fallback and
//!    leave the store untouched.
//! 2. A subscriber observes the committed value: the write is visible to
//!    `get` from inside the callback.
//! 3. The interior `RefCell` is never borrowed while callbacks run.
//! 4. A [`Subscription`] is released on drop, so every teardown path of its
//!    owner unsubscribes.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Typed read mismatch | Key written with another type | Fallback returned, `warn!` logged |
//! | Runaway write chain | Subscriber writes back into the store | Notification skipped past [`MAX_DISPATCH_DEPTH`], value still committed |
//! | Callback panic | Bug in subscriber | Panic propagates; store state and depth counter stay consistent |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use tracing::{debug, trace, warn};

use super::value::{StoreValue, Value};

/// Maximum nesting of notification passes triggered from inside callbacks.
pub const MAX_DISPATCH_DEPTH: usize = 32;

thread_local! {
    static SESSION: VariableStore = VariableStore::new();
}

struct Subscriber {
    id: u64,
    active: Rc<Cell<bool>>,
    callback: Box<dyn Fn(&Value)>,
}

#[derive(Default)]
struct StoreInner {
    values: AHashMap<String, Value>,
    versions: AHashMap<String, u64>,
    subscribers: AHashMap<String, Vec<Rc<Subscriber>>>,
    next_id: u64,
    writes: u64,
}

impl StoreInner {
    fn commit(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_owned(), value);
        *self.versions.entry(key.to_owned()).or_insert(0) += 1;
        self.writes += 1;
    }

    /// Live subscribers of `key`, plus the inactive entries pruned from the
    /// list. The caller drops the pruned entries after releasing the borrow.
    fn snapshot(&mut self, key: &str) -> (Vec<Rc<Subscriber>>, Vec<Rc<Subscriber>>) {
        let Some(list) = self.subscribers.get_mut(key) else {
            return (Vec::new(), Vec::new());
        };
        let (live, dead): (Vec<_>, Vec<_>) = list.drain(..).partition(|s| s.active.get());
        list.extend(live.iter().cloned());
        (live, dead)
    }

    fn remove(&mut self, key: &str, id: u64) -> Option<Rc<Subscriber>> {
        let list = self.subscribers.get_mut(key)?;
        let pos = list.iter().position(|s| s.id == id)?;
        let removed = list.remove(pos);
        if list.is_empty() {
            self.subscribers.remove(key);
        }
        Some(removed)
    }
}

/// Keyed container of document variables with per-key subscriptions.
///
/// Cloning a `VariableStore` creates a new handle to the **same** variables.
///
/// # Example
///
/// ```
/// use folio_runtime::VariableStore;
///
/// let store = VariableStore::new();
/// assert_eq!(store.get("amplitude", 1.0_f64), 1.0);
///
/// store.set("amplitude", 2.5_f64);
/// assert_eq!(store.get("amplitude", 1.0_f64), 2.5);
/// ```
#[derive(Clone)]
pub struct VariableStore {
    inner: Rc<RefCell<StoreInner>>,
    depth: Rc<Cell<usize>>,
}

impl VariableStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner::default())),
            depth: Rc::new(Cell::new(0)),
        }
    }

    /// The session store shared by every document on this thread.
    ///
    /// Lives until the thread exits; there is no teardown.
    #[must_use]
    pub fn session() -> Self {
        SESSION.with(Clone::clone)
    }

    /// Seed keys that are not yet present. Existing values are never
    /// overwritten.
    ///
    /// Subscribers of a newly seeded key are notified, since the key went from
    /// unset to set. Returns the number of keys seeded.
    pub fn initialize<K, V>(&self, defaults: impl IntoIterator<Item = (K, V)>) -> usize
    where
        K: Into<String>,
        V: StoreValue,
    {
        // The caller's iterator may read this store; drain it before borrowing.
        let defaults: Vec<(String, Value)> = defaults
            .into_iter()
            .map(|(key, value)| (key.into(), value.into_value()))
            .collect();
        let mut seeded = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            for (key, value) in defaults {
                if inner.values.contains_key(&key) {
                    continue;
                }
                inner.commit(&key, value.clone());
                seeded.push((key, value));
            }
        }
        debug!(seeded = seeded.len(), "initialized store defaults");
        for (key, value) in &seeded {
            self.notify(key, value);
        }
        seeded.len()
    }

    /// Current value of `key` as `T`, or `fallback` when unset.
    ///
    /// Never mutates the store. When the stored value does not convert to `T`
    /// the fallback is returned and a warning is logged.
    #[must_use]
    pub fn get<T: StoreValue>(&self, key: &str, fallback: T) -> T {
        let stored = self.inner.borrow().values.get(key).cloned();
        match stored {
            None => fallback,
            Some(value) => T::from_value(&value).unwrap_or_else(|| {
                warn!(
                    key,
                    stored = value.kind(),
                    "stored value does not match the requested type, using fallback"
                );
                fallback
            }),
        }
    }

    /// Current untyped value of `key`, if set.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.inner.borrow().values.get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().values.contains_key(key)
    }

    /// Number of keys holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().values.is_empty()
    }

    /// Keys holding a value, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.borrow().values.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Commit `value` for `key` and notify every live subscription of `key`.
    pub fn set<T: StoreValue>(&self, key: &str, value: T) {
        self.set_value(key, value.into_value());
    }

    /// Untyped form of [`set`](Self::set).
    pub fn set_value(&self, key: &str, value: Value) {
        self.inner.borrow_mut().commit(key, value.clone());
        self.notify(key, &value);
    }

    /// Register `callback` for writes to `key`.
    ///
    /// The callback receives the committed value. Drop the returned guard, or
    /// call [`Subscription::unsubscribe`], to stop receiving notifications.
    pub fn subscribe(&self, key: &str, callback: impl Fn(&Value) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .subscribers
                .entry(key.to_owned())
                .or_default()
                .push(Rc::new(Subscriber {
                    id,
                    active: Rc::clone(&active),
                    callback: Box::new(callback),
                }));
            id
        };
        trace!(key, id, "subscribed");
        Subscription {
            store: Rc::downgrade(&self.inner),
            key: key.to_owned(),
            id,
            active,
        }
    }

    /// Number of live subscriptions for `key`.
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .subscribers
            .get(key)
            .map_or(0, |list| list.iter().filter(|s| s.active.get()).count())
    }

    /// Number of committed writes to `key`; 0 when never written.
    #[must_use]
    pub fn version(&self, key: &str) -> u64 {
        self.inner.borrow().versions.get(key).copied().unwrap_or(0)
    }

    /// Total committed writes across all keys.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.inner.borrow().writes
    }

    fn notify(&self, key: &str, value: &Value) {
        let (live, dead) = self.inner.borrow_mut().snapshot(key);
        drop(dead);
        if live.is_empty() {
            return;
        }

        let depth = self.depth.get();
        if depth >= MAX_DISPATCH_DEPTH {
            warn!(
                key,
                depth, "notification depth limit reached, write committed without notifying"
            );
            return;
        }
        let _guard = DepthGuard::enter(&self.depth);
        trace!(key, subscribers = live.len(), depth, "dispatching write");
        for subscriber in &live {
            // Removed earlier in this pass.
            if subscriber.active.get() {
                (subscriber.callback)(value);
            }
        }
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("VariableStore")
                .field("keys", &inner.values.len())
                .field("writes", &inner.writes)
                .finish(),
            Err(_) => f.debug_struct("VariableStore").finish_non_exhaustive(),
        }
    }
}

struct DepthGuard<'a>(&'a Cell<usize>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// RAII registration of a store callback.
///
/// Dropping the guard unsubscribes. [`unsubscribe`](Self::unsubscribe) may be
/// called any number of times; only the first call has an effect, and it only
/// removes this registration.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    store: Weak<RefCell<StoreInner>>,
    key: String,
    id: u64,
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// Remove this registration. Idempotent.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        let Some(inner) = self.store.upgrade() else {
            return;
        };
        // A failed borrow means a store method is mid-flight on this thread;
        // the inactive entry is pruned on the key's next dispatch.
        let removed = match inner.try_borrow_mut() {
            Ok(mut inner) => inner.remove(&self.key, self.id),
            Err(_) => None,
        };
        drop(removed);
        trace!(key = %self.key, id = self.id, "unsubscribed");
    }

    /// Whether the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// The key this subscription listens to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&Value) + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move |_: &Value| c.set(c.get() + 1))
    }

    #[test]
    fn unset_key_returns_fallback_without_mutation() {
        let store = VariableStore::new();
        assert_eq!(store.get("missing", 42_i64), 42);
        assert_eq!(store.get("missing", "x".to_string()), "x");
        assert!(!store.contains("missing"));
        assert!(store.is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn set_then_get() {
        let store = VariableStore::new();
        store.set("amplitude", 2.5_f64);
        assert_eq!(store.get("amplitude", 1.0_f64), 2.5);
        assert_eq!(store.get_value("amplitude"), Some(Value::Float(2.5)));
        assert_eq!(store.version("amplitude"), 1);
    }

    #[test]
    fn initialize_does_not_overwrite() {
        let store = VariableStore::new();
        store.set("sides", 8_i64);
        let seeded = store.initialize([("sides", 6_i64), ("seed", 1_i64)]);
        assert_eq!(seeded, 1);
        assert_eq!(store.get("sides", 0_i64), 8);
        assert_eq!(store.get("seed", 0_i64), 1);
    }

    #[test]
    fn initialize_accepts_defaults_derived_from_the_store() {
        let store = VariableStore::new();
        store.set("sides", 6_i64);
        let reader = store.clone();
        let seeded = store.initialize(
            ["double_sides", "sides"]
                .into_iter()
                .map(|key| (key, reader.get("sides", 0_i64) * 2)),
        );
        assert_eq!(seeded, 1);
        assert_eq!(store.get("double_sides", 0_i64), 12);
        assert_eq!(store.get("sides", 0_i64), 6);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Audited(i64);

    impl StoreValue for Audited {
        fn into_value(self) -> Value {
            Value::Int(self.0)
        }

        fn from_value(value: &Value) -> Option<Self> {
            let store = VariableStore::session();
            let reads = store.get("audit_reads", 0_i64);
            store.set("audit_reads", reads + 1);
            value.as_int().map(Audited)
        }
    }

    #[test]
    fn typed_read_may_touch_the_store() {
        let store = VariableStore::session();
        store.set("sides", 6_i64);
        assert_eq!(store.get("sides", Audited(0)), Audited(6));
        assert_eq!(store.get("sides", Audited(0)), Audited(6));
        assert_eq!(store.get("audit_reads", 0_i64), 2);
    }

    #[test]
    fn initialize_then_set_wins() {
        let store = VariableStore::new();
        store.initialize([("k", 1_i64)]);
        store.set("k", 2_i64);
        assert_eq!(store.get("k", 3_i64), 2);
    }

    #[test]
    fn initialize_notifies_only_seeded_keys() {
        let store = VariableStore::new();
        store.set("existing", 1_i64);
        let (existing_hits, on_existing) = counter();
        let (fresh_hits, on_fresh) = counter();
        let _a = store.subscribe("existing", on_existing);
        let _b = store.subscribe("fresh", on_fresh);

        store.initialize([("existing", 5_i64), ("fresh", 5_i64)]);
        assert_eq!(existing_hits.get(), 0);
        assert_eq!(fresh_hits.get(), 1);
    }

    #[test]
    fn every_subscriber_called_once_per_write() {
        let store = VariableStore::new();
        let (a_hits, on_a) = counter();
        let (b_hits, on_b) = counter();
        let _a = store.subscribe("k", on_a);
        let _b = store.subscribe("k", on_b);

        store.set("k", 1_i64);
        assert_eq!((a_hits.get(), b_hits.get()), (1, 1));
        store.set("k", 2_i64);
        assert_eq!((a_hits.get(), b_hits.get()), (2, 2));
    }

    #[test]
    fn equal_value_writes_still_notify() {
        let store = VariableStore::new();
        let (hits, on_write) = counter();
        let _sub = store.subscribe("k", on_write);
        store.set("k", 5_i64);
        store.set("k", 5_i64);
        assert_eq!(hits.get(), 2);
        assert_eq!(store.version("k"), 2);
    }

    #[test]
    fn other_keys_are_not_notified() {
        let store = VariableStore::new();
        let (hits, on_write) = counter();
        let _sub = store.subscribe("a", on_write);
        store.set("b", 1_i64);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn callback_sees_committed_value() {
        let store = VariableStore::new();
        let seen = Rc::new(Cell::new(0_i64));
        let s = Rc::clone(&seen);
        let reader = store.clone();
        let _sub = store.subscribe("k", move |_| s.set(reader.get("k", -1_i64)));
        store.set("k", 9_i64);
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn unsubscribe_stops_notifications_and_is_idempotent() {
        let store = VariableStore::new();
        let (hits, on_write) = counter();
        let sub = store.subscribe("k", on_write);
        store.set("k", 1_i64);
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        store.set("k", 2_i64);
        assert_eq!(hits.get(), 1);
        assert_eq!(store.subscriber_count("k"), 0);
    }

    #[test]
    fn unsubscribe_removes_only_its_registration() {
        let store = VariableStore::new();
        let (hits, on_write) = counter();
        let on_write = Rc::new(on_write);
        let f1 = Rc::clone(&on_write);
        let f2 = Rc::clone(&on_write);
        let first = store.subscribe("k", move |v| f1(v));
        let _second = store.subscribe("k", move |v| f2(v));

        first.unsubscribe();
        store.set("k", 1_i64);
        assert_eq!(hits.get(), 1);
        assert_eq!(store.subscriber_count("k"), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let store = VariableStore::new();
        let (hits, on_write) = counter();
        {
            let _sub = store.subscribe("k", on_write);
            store.set("k", 1_i64);
        }
        store.set("k", 2_i64);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn subscription_outlives_store() {
        let sub = {
            let store = VariableStore::new();
            store.subscribe("k", |_| {})
        };
        sub.unsubscribe();
        assert!(!sub.is_active());
    }

    #[test]
    fn unsubscribe_during_dispatch_skips_removed_peer() {
        let store = VariableStore::new();
        let (late_hits, on_late) = counter();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let v = Rc::clone(&victim);
        let _killer = store.subscribe("k", move |_| {
            if let Some(sub) = v.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        *victim.borrow_mut() = Some(store.subscribe("k", on_late));

        store.set("k", 1_i64);
        assert_eq!(late_hits.get(), 0);
        store.set("k", 2_i64);
        assert_eq!(late_hits.get(), 0);
    }

    #[test]
    fn subscribe_during_dispatch_waits_for_next_write() {
        let store = VariableStore::new();
        let (hits, on_write) = counter();
        let on_write = Rc::new(on_write);
        let added: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let handle = store.clone();
        let a = Rc::clone(&added);
        let _adder = store.subscribe("k", move |_| {
            let f = Rc::clone(&on_write);
            a.borrow_mut().push(handle.subscribe("k", move |v| f(v)));
        });

        store.set("k", 1_i64);
        assert_eq!(hits.get(), 0);
        store.set("k", 2_i64);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn self_unsubscribe_inside_callback() {
        let store = VariableStore::new();
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let h = Rc::clone(&hits);
        let s = Rc::clone(&slot);
        *slot.borrow_mut() = Some(store.subscribe("k", move |_| {
            h.set(h.get() + 1);
            drop(s.borrow_mut().take());
        }));

        store.set("k", 1_i64);
        store.set("k", 2_i64);
        assert_eq!(hits.get(), 1);
    }

    #[traced_test]
    #[test]
    fn runaway_write_chain_is_bounded() {
        let store = VariableStore::new();
        let handle = store.clone();
        let _echo = store.subscribe("k", move |v| {
            let next = v.as_int().unwrap_or(0) + 1;
            handle.set("k", next);
        });

        store.set("k", 0_i64);
        // Every write is committed, including the ones past the depth limit.
        assert_eq!(store.get("k", 0_i64), MAX_DISPATCH_DEPTH as i64);
        assert_eq!(store.version("k"), MAX_DISPATCH_DEPTH as u64 + 1);
        assert!(logs_contain("notification depth limit reached"));
    }

    #[traced_test]
    #[test]
    fn mismatched_type_read_uses_fallback() {
        let store = VariableStore::new();
        store.set("label", "six".to_string());
        assert_eq!(store.get("label", 6_i64), 6);
        assert!(logs_contain("does not match the requested type"));
    }

    #[test]
    fn clones_share_state() {
        let a = VariableStore::new();
        let b = a.clone();
        a.set("k", true);
        assert!(b.get("k", false));
    }

    #[test]
    fn session_store_is_shared_on_thread() {
        VariableStore::session().set("session_probe", 3_i64);
        assert_eq!(VariableStore::session().get("session_probe", 0_i64), 3);
    }

    #[test]
    fn keys_are_sorted() {
        let store = VariableStore::new();
        store.set("pi", 3.14_f64);
        store.set("circle", 10_i64);
        assert_eq!(store.keys(), vec!["circle".to_string(), "pi".to_string()]);
        assert_eq!(store.len(), 2);
    }
}
