use crate::types::ElementType;
use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Literal constants that can be wrapped into expression leaves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    String(String),
    Datetime(NaiveDateTime),
}

impl Value {
    /// Get the element type of this value
    pub fn data_type(&self) -> ElementType {
        match self {
            Value::Boolean(_) => ElementType::Boolean,
            Value::Int8(_) => ElementType::Int8,
            Value::Int16(_) => ElementType::Int16,
            Value::Int32(_) => ElementType::Int32,
            Value::Int64(_) => ElementType::Int64,
            Value::Float32(_) => ElementType::Float32,
            Value::Float64(_) => ElementType::Float64,
            Value::Decimal(_) => ElementType::Decimal,
            Value::String(_) => ElementType::String,
            Value::Datetime(_) => ElementType::Datetime,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value, used for ordering bin edges
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Decimal(d) => d.to_f64(),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Implicitly convert this value to `target`.
    ///
    /// A conversion succeeds when the lattice promotes this value's type to
    /// `target`, or when the value narrows into `target` exactly. Integers
    /// headed for a float must round-trip, so large integers are rejected
    /// rather than rounded. Decimal to Float64 follows the lattice and takes
    /// the nearest float.
    pub fn coerce_to(&self, target: ElementType) -> Option<Value> {
        if self.data_type() == target {
            return Some(self.clone());
        }
        if let Some(v) = self.as_i64() {
            return match target {
                ElementType::Int8 => i8::try_from(v).ok().map(Value::Int8),
                ElementType::Int16 => i16::try_from(v).ok().map(Value::Int16),
                ElementType::Int32 => i32::try_from(v).ok().map(Value::Int32),
                ElementType::Int64 => Some(Value::Int64(v)),
                ElementType::Float32 => {
                    let f = v as f32;
                    (f as i128 == v as i128).then_some(Value::Float32(f))
                }
                ElementType::Float64 => {
                    let f = v as f64;
                    (f as i128 == v as i128).then_some(Value::Float64(f))
                }
                ElementType::Decimal => Some(Value::Decimal(Decimal::from(v))),
                _ => None,
            };
        }
        match (self, target) {
            (Value::Float32(v), ElementType::Float64) => Some(Value::Float64(*v as f64)),
            (Value::Float64(v), ElementType::Float32) => {
                let f = *v as f32;
                (f as f64 == *v).then_some(Value::Float32(f))
            }
            (Value::Decimal(d), ElementType::Float64) => d.to_f64().map(Value::Float64),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            // Floats compare by bit pattern so literals can key a hash map
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Datetime(a), Value::Datetime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Boolean(v) => v.hash(state),
            Value::Int8(v) => v.hash(state),
            Value::Int16(v) => v.hash(state),
            Value::Int32(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float32(v) => v.to_bits().hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Datetime(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "'{}'", v),
            Value::Datetime(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

/// Plain integer literals are typed as `Int64`, matching how a bare integer
/// constant is read in the DSL. Use `Value::Int32` for an explicit width.
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Datetime(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_literal_types() {
        assert_eq!(Value::from(true).data_type(), ElementType::Boolean);
        assert_eq!(Value::from(3).data_type(), ElementType::Int64);
        assert_eq!(Value::Int32(3).data_type(), ElementType::Int32);
        assert_eq!(Value::from(1.5).data_type(), ElementType::Float64);
        assert_eq!(Value::from("abc").data_type(), ElementType::String);
        assert_eq!(
            Value::from(Decimal::new(314, 2)).data_type(),
            ElementType::Decimal
        );
    }

    #[test]
    fn test_coerce_integers() {
        assert_eq!(
            Value::from(5).coerce_to(ElementType::Int8),
            Some(Value::Int8(5))
        );
        assert_eq!(Value::from(1000).coerce_to(ElementType::Int8), None);
        assert_eq!(
            Value::from(2).coerce_to(ElementType::Float64),
            Some(Value::Float64(2.0))
        );
        assert_eq!(
            Value::from(2).coerce_to(ElementType::Decimal),
            Some(Value::Decimal(Decimal::from(2)))
        );
    }

    #[test]
    fn test_coerce_integers_to_floats_exactly() {
        assert_eq!(
            Value::from(16_777_216).coerce_to(ElementType::Float32),
            Some(Value::Float32(16_777_216.0))
        );
        assert_eq!(Value::from(16_777_217).coerce_to(ElementType::Float32), None);
        assert_eq!(
            Value::from(1i64 << 53).coerce_to(ElementType::Float64),
            Some(Value::Float64(9_007_199_254_740_992.0))
        );
        assert_eq!(Value::from((1i64 << 53) + 1).coerce_to(ElementType::Float64), None);
        assert_eq!(Value::from(i64::MAX).coerce_to(ElementType::Float64), None);
    }

    #[test]
    fn test_coerce_floats_and_decimals() {
        assert_eq!(
            Value::from(Decimal::new(15, 1)).coerce_to(ElementType::Float64),
            Some(Value::Float64(1.5))
        );
        // Decimal and Float32 promote to Float64, not Float32
        assert_eq!(Value::from(Decimal::new(15, 1)).coerce_to(ElementType::Float32), None);
        assert_eq!(
            Value::from(0.5).coerce_to(ElementType::Float32),
            Some(Value::Float32(0.5))
        );
        assert_eq!(Value::from(0.1).coerce_to(ElementType::Float32), None);
        assert_eq!(Value::from(1.5).coerce_to(ElementType::Decimal), None);
    }

    #[test]
    fn test_coerce_rejects_lossy_or_unrelated() {
        assert_eq!(Value::from(1.5).coerce_to(ElementType::Int64), None);
        assert_eq!(Value::from("abc").coerce_to(ElementType::Int64), None);
        assert_eq!(Value::from(true).coerce_to(ElementType::String), None);
        assert_eq!(
            Value::from("test").coerce_to(ElementType::String),
            Some(Value::from("test"))
        );
    }

    #[test]
    fn test_float_values_are_hashable() {
        let mut set = HashSet::new();
        set.insert(Value::from(0.5));
        set.insert(Value::from(0.5));
        set.insert(Value::from(f64::NAN));
        set.insert(Value::from(f64::NAN));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("a").to_string(), "'a'");
        assert_eq!(Value::from(10).to_string(), "10");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
    }
}
