//! Error types for expression construction.

use crate::types::{ElementType, Value};
use thiserror::Error;

/// Coarse classification of construction failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operand element types cannot be unified or are wrong for the operator
    Type,
    /// Argument counts or argument values are invalid regardless of type
    Value,
    /// The combination of receiver and arguments is structurally invalid
    Expression,
}

/// Errors that can occur while building an expression node
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ElementType,
        actual: ElementType,
        context: String,
    },

    #[error("No common type for {left} and {right} in {context}")]
    NoCommonType {
        left: ElementType,
        right: ElementType,
        context: String,
    },

    #[error("Invalid operand type for operator {operator}: {actual}")]
    InvalidOperandType {
        operator: String,
        actual: ElementType,
    },

    #[error("Invalid operand types for operator {operator}: left={left}, right={right}")]
    InvalidOperandTypes {
        operator: String,
        left: ElementType,
        right: ElementType,
    },

    #[error("Cannot cast {from} to {to}")]
    InvalidCast { from: ElementType, to: ElementType },

    #[error("Cannot use {value} as a {target} value in {context}")]
    IncompatibleLiteral {
        value: Value,
        target: ElementType,
        context: String,
    },

    #[error("{operator} expects {expected}, got {actual}")]
    ArgumentCount {
        operator: String,
        expected: String,
        actual: usize,
    },

    #[error("Invalid argument for {operator}: {reason}")]
    InvalidArgument { operator: String, reason: String },

    #[error("Unknown element type: {name}")]
    UnknownType { name: String },

    #[error("Duplicate field: {name}")]
    DuplicateField { name: String },

    #[error("Field '{name}' not found in {collection}")]
    FieldNotFound { name: String, collection: String },

    #[error("Expression {expression} references fields outside of {collection}")]
    ForeignField {
        expression: String,
        collection: String,
    },

    #[error("Ambiguous {operator}: {reason}")]
    Ambiguous { operator: String, reason: String },
}

impl ExpressionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExpressionError::TypeMismatch { .. }
            | ExpressionError::NoCommonType { .. }
            | ExpressionError::InvalidOperandType { .. }
            | ExpressionError::InvalidOperandTypes { .. }
            | ExpressionError::InvalidCast { .. }
            | ExpressionError::IncompatibleLiteral { .. } => ErrorKind::Type,

            ExpressionError::ArgumentCount { .. }
            | ExpressionError::InvalidArgument { .. }
            | ExpressionError::UnknownType { .. }
            | ExpressionError::DuplicateField { .. } => ErrorKind::Value,

            ExpressionError::FieldNotFound { .. }
            | ExpressionError::ForeignField { .. }
            | ExpressionError::Ambiguous { .. } => ErrorKind::Expression,
        }
    }

    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }

    pub fn is_value_error(&self) -> bool {
        self.kind() == ErrorKind::Value
    }

    pub fn is_expression_error(&self) -> bool {
        self.kind() == ErrorKind::Expression
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::TypeMismatch {
            expected: ElementType::Boolean,
            actual: ElementType::Int64,
            context: "ifelse condition".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch in ifelse condition: expected boolean, got int64"
        );

        let err = ExpressionError::NoCommonType {
            left: ElementType::String,
            right: ElementType::Int64,
            context: "between".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No common type for string and int64 in between"
        );

        let err = ExpressionError::IncompatibleLiteral {
            value: Value::from("abc"),
            target: ElementType::Int64,
            context: "fillna".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot use 'abc' as a int64 value in fillna"
        );

        let err = ExpressionError::ArgumentCount {
            operator: "cut".to_string(),
            expected: "at least 2 bin edges".to_string(),
            actual: 1,
        };
        assert_eq!(err.to_string(), "cut expects at least 2 bin edges, got 1");

        let err = ExpressionError::FieldNotFound {
            name: "age".to_string(),
            collection: "people".to_string(),
        };
        assert_eq!(err.to_string(), "Field 'age' not found in people");
    }

    #[test]
    fn test_error_kinds() {
        let err = ExpressionError::InvalidCast {
            from: ElementType::Datetime,
            to: ElementType::Int64,
        };
        assert!(err.is_type_error());

        let err = ExpressionError::DuplicateField {
            name: "id".to_string(),
        };
        assert!(err.is_value_error());

        let err = ExpressionError::Ambiguous {
            operator: "switch".to_string(),
            reason: "conditions must be boolean".to_string(),
        };
        assert!(err.is_expression_error());
        assert_eq!(err.kind(), ErrorKind::Expression);
    }
}
