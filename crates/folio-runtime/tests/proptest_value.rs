#![forbid(unsafe_code)]

//! Property tests for typed store access.

use folio_runtime::{StoreValue, Value, VariableStore};
use proptest::prelude::*;

proptest! {
    #[test]
    fn i32_values_survive_the_store(n in any::<i32>()) {
        let store = VariableStore::new();
        store.set("n", n);
        prop_assert_eq!(store.get("n", 0_i32), n);
        prop_assert_eq!(store.get("n", 0_i64), i64::from(n));
    }

    /// Narrow reads outside the target range fall back instead of wrapping.
    #[test]
    fn narrow_reads_fall_back_out_of_range(n in any::<i64>()) {
        let store = VariableStore::new();
        store.set("n", n);
        let expected = u32::try_from(n).unwrap_or(7);
        prop_assert_eq!(store.get("n", 7_u32), expected);
    }

    #[test]
    fn ints_widen_to_floats(n in -1_000_000_i64..1_000_000) {
        prop_assert_eq!(f64::from_value(&Value::Int(n)), Some(n as f64));
    }

    #[test]
    fn text_and_bool_keep_their_kind(text in ".*", flag in any::<bool>()) {
        let store = VariableStore::new();
        store.set("text", text.clone());
        store.set("flag", flag);
        prop_assert_eq!(store.get("text", String::new()), text);
        prop_assert_eq!(store.get("flag", !flag), flag);
        prop_assert_eq!(store.get("text", 0_i64), 0);
    }
}
