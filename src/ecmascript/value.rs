//! Constant ECMAScript values used as enum tags.

use super::value_set::{SafeIntegerRange, ValueSet};
use std::fmt;

/// A constant the backend can write as a literal and compare with `===`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcmascriptValue {
    Integer(u64),
    Boolean(bool),
    Undefined,
    Null,
}

impl EcmascriptValue {
    /// The singleton set containing this value.
    pub fn value_set(self) -> ValueSet {
        match self {
            EcmascriptValue::Integer(value) => {
                ValueSet::integer_range(SafeIntegerRange::new(value, value))
            }
            EcmascriptValue::Boolean(value) => ValueSet::boolean(value),
            EcmascriptValue::Undefined => ValueSet::undefined(),
            EcmascriptValue::Null => ValueSet::null(),
        }
    }
}

impl fmt::Display for EcmascriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcmascriptValue::Integer(value) => write!(f, "{value}"),
            EcmascriptValue::Boolean(value) => write!(f, "{value}"),
            EcmascriptValue::Undefined => f.write_str("undefined"),
            EcmascriptValue::Null => f.write_str("null"),
        }
    }
}
