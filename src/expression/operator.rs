//! Operator definitions for expressions.

use crate::types::ElementType;
use serde::Serialize;

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    /// Get the output type of this operator given input types
    pub fn output_type(&self, left: ElementType, right: ElementType) -> Option<ElementType> {
        match self {
            // String + String concatenates
            BinaryOperator::Add if left == ElementType::String && right == ElementType::String => {
                Some(ElementType::String)
            }

            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul => {
                Self::numeric(left, right)
            }

            // Integer division yields a float
            BinaryOperator::Div => Self::numeric(left, right).map(|t| {
                if t.is_integer() {
                    ElementType::Float64
                } else {
                    t
                }
            }),

            // Comparison operators always return boolean
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => left.promote(right).map(|_| ElementType::Boolean),

            BinaryOperator::And | BinaryOperator::Or => match (left, right) {
                (ElementType::Boolean, ElementType::Boolean) => Some(ElementType::Boolean),
                _ => None,
            },
        }
    }

    fn numeric(left: ElementType, right: ElementType) -> Option<ElementType> {
        if left.is_numeric() && right.is_numeric() {
            left.promote(right)
        } else {
            None
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    // Logical
    Not,

    // NULL checks
    IsNull,
    NotNull,

    // Arithmetic
    Negate,
    Abs,

    // String
    Lower,
    Upper,
}

impl UnaryOperator {
    /// Get the output type of this operator given input type
    pub fn output_type(&self, operand: ElementType) -> Option<ElementType> {
        match self {
            UnaryOperator::Not => match operand {
                ElementType::Boolean => Some(ElementType::Boolean),
                _ => None,
            },

            // NULL checks always return boolean regardless of input type
            UnaryOperator::IsNull | UnaryOperator::NotNull => Some(ElementType::Boolean),

            UnaryOperator::Negate | UnaryOperator::Abs => {
                operand.is_numeric().then_some(operand)
            }

            UnaryOperator::Lower | UnaryOperator::Upper => match operand {
                ElementType::String => Some(ElementType::String),
                _ => None,
            },
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::IsNull => "isnull",
            UnaryOperator::NotNull => "notnull",
            UnaryOperator::Negate => "-",
            UnaryOperator::Abs => "abs",
            UnaryOperator::Lower => "lower",
            UnaryOperator::Upper => "upper",
        }
    }
}

/// Reductions collapse any shape into a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReduceFunction {
    Sum,
    Min,
    Max,
    Mean,
    Count,
}

impl ReduceFunction {
    pub fn output_type(&self, operand: ElementType) -> Option<ElementType> {
        match self {
            ReduceFunction::Sum => match operand {
                t if t.is_integer() => Some(ElementType::Int64),
                t if t.is_float() => Some(ElementType::Float64),
                ElementType::Decimal => Some(ElementType::Decimal),
                // Summing strings concatenates them
                ElementType::String => Some(ElementType::String),
                _ => None,
            },
            ReduceFunction::Mean => match operand {
                ElementType::Decimal => Some(ElementType::Decimal),
                t if t.is_numeric() => Some(ElementType::Float64),
                _ => None,
            },
            ReduceFunction::Min | ReduceFunction::Max => Some(operand),
            ReduceFunction::Count => Some(ElementType::Int64),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReduceFunction::Sum => "sum",
            ReduceFunction::Min => "min",
            ReduceFunction::Max => "max",
            ReduceFunction::Mean => "mean",
            ReduceFunction::Count => "count",
        }
    }
}
