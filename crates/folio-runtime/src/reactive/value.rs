#![forbid(unsafe_code)]

//! Stored values and typed accessors.
//!
//! The store keeps one dynamically-typed [`Value`] per key. Call sites state
//! the type they expect through [`StoreValue`]; mixing types on one key is a
//! caller contract violation. A typed read of a mismatched value yields the
//! caller's fallback, it does not panic and the store never rejects a write.
//!
//! | Target | Accepts |
//! |--------|---------|
//! | `i64`, `i32`, `u32`, `usize` | `Int` within the target's range |
//! | `f64`, `f32` | `Float`, and `Int` widened |
//! | `bool` | `Bool` |
//! | `String` | `Text` |
//! | `Vec<Value>` | `List` |
//! | `Value` | anything |
//!
//! Writes of `usize` beyond `i64::MAX` are stored as `i64::MAX` and logged.

use std::fmt;

use tracing::warn;

/// A value held by the [`VariableStore`](super::VariableStore).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "document-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Typed access to store values.
///
/// Implementors state how a Rust type is stored and how it is recovered. A
/// `None` from [`from_value`](StoreValue::from_value) means the stored value
/// has a different type than the caller expects.
pub trait StoreValue: Clone + 'static {
    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl StoreValue for Value {
    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

macro_rules! int_store_value {
    ($($ty:ty),*) => {
        $(
            impl StoreValue for $ty {
                fn into_value(self) -> Value {
                    i64::try_from(self).map_or_else(
                        |_| {
                            warn!(
                                value = %self,
                                "integer exceeds the stored range, saturating to i64::MAX"
                            );
                            Value::Int(i64::MAX)
                        },
                        Value::Int,
                    )
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_int().and_then(|v| <$ty>::try_from(v).ok())
                }
            }
        )*
    };
}

int_store_value!(i32, u32, usize);

impl StoreValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl StoreValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl StoreValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float().map(|v| v as f32)
    }
}

impl StoreValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl StoreValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl StoreValue for Vec<Value> {
    fn into_value(self) -> Value {
        Value::List(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
