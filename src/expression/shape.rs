//! Expression shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an expression yields one value per row or a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// One value per row of a source
    Sequence,
    /// A single reduced or constant value
    Scalar,
}

impl Shape {
    /// Shape of a node built from operands of the given shapes.
    ///
    /// `Scalar` only when every operand is `Scalar`. Constructors always pass
    /// at least the receiver's own shape.
    pub fn combine<I>(shapes: I) -> Shape
    where
        I: IntoIterator<Item = Shape>,
    {
        if shapes.into_iter().all(|s| s == Shape::Scalar) {
            Shape::Scalar
        } else {
            Shape::Sequence
        }
    }

    pub fn is_scalar(&self) -> bool {
        *self == Shape::Scalar
    }

    pub fn is_sequence(&self) -> bool {
        *self == Shape::Sequence
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Sequence => f.write_str("sequence"),
            Shape::Scalar => f.write_str("scalar"),
        }
    }
}
