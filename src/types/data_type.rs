//! Element types and the promotion lattice between them.

use crate::expression::ExpressionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical type of a single value, independent of its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
    Datetime,
}

impl ElementType {
    pub const ALL: [ElementType; 10] = [
        ElementType::Boolean,
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::Decimal,
        ElementType::String,
        ElementType::Datetime,
    ];

    pub fn is_integer(&self) -> bool {
        self.integer_width().is_some()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }

    /// Integers, floats and decimals
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || *self == ElementType::Decimal
    }

    fn integer_width(&self) -> Option<u8> {
        match self {
            ElementType::Int8 => Some(8),
            ElementType::Int16 => Some(16),
            ElementType::Int32 => Some(32),
            ElementType::Int64 => Some(64),
            _ => None,
        }
    }

    /// Find the common type of two element types.
    ///
    /// Returns `None` when no promotion path exists; callers must reject such
    /// combinations rather than coerce them.
    pub fn promote(self, other: ElementType) -> Option<ElementType> {
        if self == other {
            return Some(self);
        }
        Self::widen(self, other).or_else(|| Self::widen(other, self))
    }

    /// Left-fold `promote` over a sequence of types. An empty sequence has no
    /// common type.
    pub fn promote_all<I>(types: I) -> Option<ElementType>
    where
        I: IntoIterator<Item = ElementType>,
    {
        let mut iter = types.into_iter();
        let first = iter.next()?;
        iter.try_fold(first, |acc, t| acc.promote(t))
    }

    // One direction of the lattice; `promote` tries both orders.
    fn widen(from: ElementType, to: ElementType) -> Option<ElementType> {
        use ElementType::*;

        match (from, to) {
            (a, b) if a.is_integer() && b.is_integer() => {
                if a.integer_width() <= b.integer_width() {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Float32, Float64) => Some(Float64),
            (a, Float32) if a.is_integer() => match a.integer_width() {
                Some(w) if w <= 16 => Some(Float32),
                _ => Some(Float64),
            },
            (a, Float64) if a.is_integer() => Some(Float64),
            (a, Decimal) if a.is_integer() => Some(Decimal),
            (a, Decimal) if a.is_float() => Some(Float64),
            _ => None,
        }
    }

    /// Whether an explicit cast from `self` to `target` is allowed
    pub fn can_cast_to(self, target: ElementType) -> bool {
        use ElementType::*;

        if self == target || target == String {
            return true;
        }
        match (self, target) {
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (Boolean, b) if b.is_integer() => true,
            (a, Boolean) if a.is_integer() => true,
            (String, b) => b.is_numeric() || b == Datetime || b == Boolean,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Boolean => "boolean",
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Decimal => "decimal",
            ElementType::String => "string",
            ElementType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(ElementType::Boolean),
            "int8" | "tinyint" => Ok(ElementType::Int8),
            "int16" | "smallint" => Ok(ElementType::Int16),
            "int32" | "int" => Ok(ElementType::Int32),
            "int64" | "bigint" => Ok(ElementType::Int64),
            "float32" | "float" => Ok(ElementType::Float32),
            "float64" | "double" => Ok(ElementType::Float64),
            "decimal" => Ok(ElementType::Decimal),
            "string" | "str" => Ok(ElementType::String),
            "datetime" | "timestamp" => Ok(ElementType::Datetime),
            _ => Err(ExpressionError::UnknownType {
                name: s.to_string(),
            }),
        }
    }
}
