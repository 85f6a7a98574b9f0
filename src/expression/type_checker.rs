//! Shared validation for expression constructors.
//!
//! Every constructor runs its operands through a [`TypeChecker`] before a
//! node is allocated, so an invalid combination is rejected without ever
//! producing a partially built node.

use crate::expression::{Expr, ExpressionError, ExpressionResult};
use crate::types::{ElementType, Value};

/// Validation context for one constructor call
pub struct TypeChecker<'a> {
    /// Operator name used in error messages
    operator: &'a str,
}

impl<'a> TypeChecker<'a> {
    pub fn new(operator: &'a str) -> Self {
        Self { operator }
    }

    fn reject<T>(&self, err: ExpressionError) -> ExpressionResult<T> {
        log::debug!("rejected {}: {}", self.operator, err);
        Err(err)
    }

    /// Common type of all given types, folded left to right
    pub fn common_type<I>(&self, types: I) -> ExpressionResult<ElementType>
    where
        I: IntoIterator<Item = ElementType>,
    {
        let mut iter = types.into_iter();
        let Some(mut acc) = iter.next() else {
            return self.reject(ExpressionError::ArgumentCount {
                operator: self.operator.to_string(),
                expected: "at least one typed operand".to_string(),
                actual: 0,
            });
        };
        for t in iter {
            match acc.promote(t) {
                Some(promoted) => acc = promoted,
                None => {
                    return self.reject(ExpressionError::NoCommonType {
                        left: acc,
                        right: t,
                        context: self.operator.to_string(),
                    })
                }
            }
        }
        Ok(acc)
    }

    /// Require two types to share a promotion path
    pub fn check_compatible(&self, left: ElementType, right: ElementType) -> ExpressionResult<()> {
        self.common_type([left, right]).map(|_| ())
    }

    pub fn expect_type(
        &self,
        expected: ElementType,
        actual: ElementType,
        role: &str,
    ) -> ExpressionResult<()> {
        if expected == actual {
            return Ok(());
        }
        self.reject(ExpressionError::TypeMismatch {
            expected,
            actual,
            context: format!("{} {}", self.operator, role),
        })
    }

    pub fn expect_boolean(&self, expr: &Expr, role: &str) -> ExpressionResult<()> {
        self.expect_type(ElementType::Boolean, expr.data_type(), role)
    }

    pub fn expect_numeric(&self, actual: ElementType) -> ExpressionResult<()> {
        if actual.is_numeric() {
            return Ok(());
        }
        self.reject(ExpressionError::InvalidOperandType {
            operator: self.operator.to_string(),
            actual,
        })
    }

    /// Apply an operator's typing rule to a single operand
    pub fn unary_output(
        &self,
        rule: Option<ElementType>,
        operand: ElementType,
    ) -> ExpressionResult<ElementType> {
        match rule {
            Some(t) => Ok(t),
            None => self.reject(ExpressionError::InvalidOperandType {
                operator: self.operator.to_string(),
                actual: operand,
            }),
        }
    }

    /// Apply an operator's typing rule to a pair of operands
    pub fn binary_output(
        &self,
        rule: Option<ElementType>,
        left: ElementType,
        right: ElementType,
    ) -> ExpressionResult<ElementType> {
        match rule {
            Some(t) => Ok(t),
            None => self.reject(ExpressionError::InvalidOperandTypes {
                operator: self.operator.to_string(),
                left,
                right,
            }),
        }
    }

    pub fn expect_scalar(&self, expr: &Expr, role: &str) -> ExpressionResult<()> {
        if expr.is_scalar() {
            return Ok(());
        }
        self.invalid_argument(format!("{} must be a scalar, got {}", role, expr))
    }

    /// Require `ok`, reporting `expected` against the `actual` count otherwise
    pub fn expect_count(&self, ok: bool, expected: &str, actual: usize) -> ExpressionResult<()> {
        if ok {
            return Ok(());
        }
        self.reject(ExpressionError::ArgumentCount {
            operator: self.operator.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }

    pub fn invalid_argument<T>(&self, reason: impl Into<String>) -> ExpressionResult<T> {
        self.reject(ExpressionError::InvalidArgument {
            operator: self.operator.to_string(),
            reason: reason.into(),
        })
    }

    pub fn ambiguous<T>(&self, reason: impl Into<String>) -> ExpressionResult<T> {
        self.reject(ExpressionError::Ambiguous {
            operator: self.operator.to_string(),
            reason: reason.into(),
        })
    }

    /// Convert a literal to `target`, rejecting lossy or unrelated values
    pub fn coerce_literal(&self, value: &Value, target: ElementType) -> ExpressionResult<Value> {
        match value.coerce_to(target) {
            Some(v) => Ok(v),
            None => self.reject(ExpressionError::IncompatibleLiteral {
                value: value.clone(),
                target,
                context: self.operator.to_string(),
            }),
        }
    }

    pub fn check_cast(&self, from: ElementType, to: ElementType) -> ExpressionResult<()> {
        if from.can_cast_to(to) {
            return Ok(());
        }
        self.reject(ExpressionError::InvalidCast { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_type() {
        let checker = TypeChecker::new("ifelse");

        assert_eq!(
            checker
                .common_type([ElementType::Int64, ElementType::Float64])
                .unwrap(),
            ElementType::Float64
        );
        assert!(matches!(
            checker.common_type([ElementType::String, ElementType::Boolean]),
            Err(ExpressionError::NoCommonType { .. })
        ));
        assert!(matches!(
            checker.common_type(std::iter::empty()),
            Err(ExpressionError::ArgumentCount { actual: 0, .. })
        ));
    }

    #[test]
    fn test_expect_boolean() {
        let checker = TypeChecker::new("ifelse");

        assert!(checker.expect_boolean(&Expr::literal(true), "condition").is_ok());
        let err = checker
            .expect_boolean(&Expr::literal(1), "condition")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch in ifelse condition: expected boolean, got int64"
        );
    }

    #[test]
    fn test_expect_numeric() {
        let checker = TypeChecker::new("cut");

        assert!(checker.expect_numeric(ElementType::Decimal).is_ok());
        assert!(checker.expect_numeric(ElementType::Int8).is_ok());
        assert!(checker
            .expect_numeric(ElementType::String)
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_coerce_literal() {
        let checker = TypeChecker::new("fillna");

        assert_eq!(
            checker
                .coerce_literal(&Value::from(3), ElementType::Float64)
                .unwrap(),
            Value::Float64(3.0)
        );
        assert!(checker
            .coerce_literal(&Value::from("abc"), ElementType::Int64)
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_expect_count() {
        let checker = TypeChecker::new("cut");

        assert!(checker.expect_count(true, "2 labels", 2).is_ok());
        let err = checker.expect_count(false, "2 labels", 3).unwrap_err();
        assert!(err.is_value_error());
        assert_eq!(err.to_string(), "cut expects 2 labels, got 3");
    }
}
