//! Metric values that may be undefined.

use serde::{Serialize, Serializer};

/// Marker written wherever a value is [`Value::Unavailable`].
pub const PLACEHOLDER: &str = "*";

/// A metric or count that is either known or explicitly unavailable.
///
/// Unavailable is distinct from zero: it covers missing attendance, growth
/// without a previous occurrence, empty denominators and blackout periods.
/// It serializes as [`PLACEHOLDER`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<T> {
    Known(T),
    Unavailable,
}

impl<T> Value<T> {
    pub fn known(self) -> Option<T> {
        match self {
            Value::Known(v) => Some(v),
            Value::Unavailable => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Value::Known(_))
    }
}

impl<T: ToString> Value<T> {
    /// Cell text for tabular exports.
    pub fn to_cell(&self) -> String {
        match self {
            Value::Known(v) => v.to_string(),
            Value::Unavailable => PLACEHOLDER.to_string(),
        }
    }
}

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Known(v) => v.serialize(serializer),
            Value::Unavailable => serializer.serialize_str(PLACEHOLDER),
        }
    }
}
