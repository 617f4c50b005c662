#![forbid(unsafe_code)]

//! Keyed reactive state for documents.
//!
//! - [`VariableStore`]: session-scoped map from string keys to [`Value`]s with
//!   per-key subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`VariableBinding`]: a widget's typed, auto-updating view of one key.
//! - [`Setter`]: a stable write handle for one key.
//! - [`BindingScope`]: owns every subscription and binding of a widget or
//!   document region, releasing them together.
//!
//! # Architecture
//!
//! `VariableStore` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! All reads, writes and notification dispatch happen on the thread that owns
//! the store. No borrow of the store interior is held while callbacks run, so
//! callbacks may read, write, subscribe and unsubscribe freely.
//!
//! # Invariants
//!
//! 1. Reading an unset key returns the caller's fallback and never mutates the
//!    store.
//! 2. Every committed write notifies each live subscription of that key exactly
//!    once, after the new value is visible to reads.
//! 3. Writing a value equal to the current one still notifies.
//! 4. A subscription added during a dispatch is not invoked by that dispatch; a
//!    subscription removed during a dispatch is not invoked after its removal.
//! 5. Nested dispatch is bounded by [`MAX_DISPATCH_DEPTH`]; deeper writes are
//!    committed without notification.

pub mod binding;
pub mod store;
pub mod value;

pub use binding::{BindingScope, Setter, VariableBinding};
pub use store::{MAX_DISPATCH_DEPTH, Subscription, VariableStore};
pub use value::{StoreValue, Value};
