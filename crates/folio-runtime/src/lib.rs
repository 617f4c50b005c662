#![forbid(unsafe_code)]

//! Reactive runtime for Folio interactive documents.
//!
//! Paragraphs and inline controls in a document are defined independently but
//! must agree on the values they show. This crate owns that agreement: a
//! session-scoped [`VariableStore`] holds every keyed value, and
//! [`VariableBinding`]s give widgets a live, auto-updating view of one key.
//!
//! ```
//! use folio_runtime::{VariableBinding, VariableStore};
//!
//! let store = VariableStore::new();
//! store.initialize([("sides", 6_i64)]);
//!
//! let a = VariableBinding::new(&store, "sides", 0_i64);
//! let b = VariableBinding::new(&store, "sides", 0_i64);
//! a.set(8);
//! assert_eq!(b.get(), 8);
//! ```

#[cfg(feature = "document-config")]
pub mod config;
pub mod reactive;

#[cfg(feature = "document-config")]
pub use config::{ConfigError, VariableDefaults};
pub use reactive::{
    BindingScope, MAX_DISPATCH_DEPTH, Setter, StoreValue, Subscription, Value, VariableBinding,
    VariableStore,
};
