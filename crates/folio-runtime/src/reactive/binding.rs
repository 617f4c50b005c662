#![forbid(unsafe_code)]

//! Live, typed access to store keys for widgets and text.
//!
//! A [`VariableBinding<T>`] is what a rendering widget holds instead of a
//! value: it subscribes to one key on creation, keeps the most recently
//! committed value, raises a change flag for the next render, and
//! unsubscribes when dropped.
//!
//! # Usage
//!
//! ```
//! use folio_runtime::{VariableBinding, VariableStore};
//!
//! let store = VariableStore::new();
//! let seed = VariableBinding::new(&store, "fibonacci_seed", 1_i64);
//! assert_eq!(seed.get(), 1);
//!
//! let set_seed = seed.setter();
//! set_seed.set(5);
//! assert_eq!(seed.get(), 5);
//! assert!(seed.take_changed());
//! ```
//!
//! # Invariants
//!
//! 1. `get()` returns the last value committed for the key, or the fallback
//!    while the key is unset.
//! 2. The change flag is raised by every notification and cleared only by
//!    [`take_changed`](VariableBinding::take_changed).
//! 3. Every setter from one binding targets the same `(store, key)` pair.
//! 4. Dropping a binding or a [`BindingScope`] releases its subscriptions.
//!
//! # Failure Modes
//!
//! - Re-entrant write from inside [`with`](VariableBinding::with): panics
//!   (borrow conflict), same as reading a `RefCell` while mutating it.
//! - Mismatched type written to the key: the binding shows its fallback and a
//!   warning is logged.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::warn;

use super::store::{Subscription, VariableStore};
use super::value::{StoreValue, Value};

// ---------------------------------------------------------------------------
// VariableBinding<T>
// ---------------------------------------------------------------------------

/// Auto-updating read/write link between a widget and one store key.
pub struct VariableBinding<T: StoreValue> {
    store: VariableStore,
    key: Rc<str>,
    current: Rc<RefCell<T>>,
    changed: Rc<Cell<bool>>,
    updates: Rc<Cell<u64>>,
    subscription: Subscription,
}

impl<T: StoreValue> VariableBinding<T> {
    /// Bind to `key`, reading `fallback` while the key is unset.
    ///
    /// The fallback is not written to the store.
    pub fn new(store: &VariableStore, key: &str, fallback: T) -> Self {
        let key: Rc<str> = Rc::from(key);
        let current = Rc::new(RefCell::new(store.get(&key, fallback.clone())));
        let changed = Rc::new(Cell::new(false));
        let updates = Rc::new(Cell::new(0));

        let slot = Rc::clone(&current);
        let flag = Rc::clone(&changed);
        let counter = Rc::clone(&updates);
        let watched = Rc::clone(&key);
        let subscription = store.subscribe(&key, move |value: &Value| {
            let next = T::from_value(value).unwrap_or_else(|| {
                warn!(
                    key = %watched,
                    stored = value.kind(),
                    "binding received a value of another type, showing fallback"
                );
                fallback.clone()
            });
            *slot.borrow_mut() = next;
            flag.set(true);
            counter.set(counter.get() + 1);
        });

        Self {
            store: store.clone(),
            key,
            current,
            changed,
            updates,
            subscription,
        }
    }

    /// The bound value.
    #[must_use]
    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Access the bound value by reference.
    ///
    /// # Panics
    ///
    /// Panics if `f` writes to this binding's key (re-entrant borrow).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.current.borrow())
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Commit `value` for this key; every binding of the key updates before
    /// this returns.
    pub fn set(&self, value: T) {
        self.store.set(&self.key, value);
    }

    /// A stable write handle for this key.
    #[must_use]
    pub fn setter(&self) -> Setter<T> {
        Setter {
            store: self.store.clone(),
            key: Rc::clone(&self.key),
            _marker: PhantomData,
        }
    }

    /// Whether a notification arrived since the last call, clearing the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.replace(false)
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed.get()
    }

    /// Number of notifications this binding has received.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.updates.get()
    }

    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Whether the underlying subscription is still registered.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.subscription.is_active()
    }
}

impl<T: StoreValue + fmt::Debug> fmt::Debug for VariableBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableBinding")
            .field("key", &&*self.key)
            .field("value", &*self.current.borrow())
            .field("changed", &self.changed.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Setter<T>
// ---------------------------------------------------------------------------

/// Write handle for one key, stable for the lifetime of its binding.
pub struct Setter<T> {
    store: VariableStore,
    key: Rc<str>,
    _marker: PhantomData<fn(T)>,
}

impl<T: StoreValue> Setter<T> {
    /// A setter for `key` that is not tied to a binding.
    pub fn new(store: &VariableStore, key: &str) -> Self {
        Self {
            store: store.clone(),
            key: Rc::from(key),
            _marker: PhantomData,
        }
    }

    pub fn set(&self, value: T) {
        self.store.set(&self.key, value);
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether both setters were handed out by the same binding.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.key, &other.key)
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: Rc::clone(&self.key),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("key", &&*self.key).finish()
    }
}

// ---------------------------------------------------------------------------
// BindingScope
// ---------------------------------------------------------------------------

/// Collects the subscriptions of one widget or document region.
///
/// When the scope is dropped, its subscriptions are released in reverse
/// registration order. [`invalidate_on`](Self::invalidate_on) wires keys to
/// the scope's own redraw flag.
///
/// ```
/// use folio_runtime::{BindingScope, VariableStore};
///
/// let store = VariableStore::new();
/// let mut scope = BindingScope::new();
/// scope.invalidate_on(&store, "sides").invalidate_on(&store, "seed");
///
/// store.set("seed", 3_i64);
/// assert!(scope.take_dirty());
/// assert!(!scope.take_dirty());
/// ```
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            dirty: Rc::new(Cell::new(false)),
        }
    }

    /// Keep `sub` alive until the scope is dropped or cleared.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to `key` within this scope.
    pub fn subscribe(
        &mut self,
        store: &VariableStore,
        key: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> &mut Self {
        let sub = store.subscribe(key, callback);
        self.subscriptions.push(sub);
        self
    }

    /// Mark the scope dirty whenever `key` is written.
    pub fn invalidate_on(&mut self, store: &VariableStore, key: &str) -> &mut Self {
        let dirty = Rc::clone(&self.dirty);
        self.subscribe(store, key, move |_| dirty.set(true))
    }

    /// Whether any watched key was written since the last call, clearing the
    /// flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions now; the scope stays usable.
    pub fn clear(&mut self) {
        while let Some(sub) = self.subscriptions.pop() {
            drop(sub);
        }
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .field("dirty", &self.dirty.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
