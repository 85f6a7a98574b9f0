//! Fluent constructors for the basic operators.
//!
//! Each method validates its operands and returns a new node; the receiver
//! is never modified. Plain Rust values passed where an expression is
//! expected are wrapped as scalar literals through [`IntoExpr`].

use crate::expression::expr::ExprKind;
use crate::expression::operator::{BinaryOperator, ReduceFunction, UnaryOperator};
use crate::expression::type_checker::TypeChecker;
use crate::expression::{Expr, ExpressionResult, Shape};
use crate::types::{ElementType, Value};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Anything usable as an operand
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

macro_rules! impl_into_expr_for_literal {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoExpr for $t {
                fn into_expr(self) -> Expr {
                    Expr::literal(Value::from(self))
                }
            }
        )*
    };
}

impl_into_expr_for_literal!(
    Value,
    bool,
    i8,
    i16,
    i32,
    i64,
    f32,
    f64,
    &str,
    String,
    Decimal,
    NaiveDateTime,
);

impl Expr {
    /// Create a binary operation expression
    pub fn binary(&self, op: BinaryOperator, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        let rhs = rhs.into_expr();
        let checker = TypeChecker::new(op.as_str());
        let data_type = checker.binary_output(
            op.output_type(self.data_type(), rhs.data_type()),
            self.data_type(),
            rhs.data_type(),
        )?;
        let shape = Shape::combine([self.shape(), rhs.shape()]);
        Ok(Expr::new(
            ExprKind::Binary(op),
            data_type,
            shape,
            vec![self.clone(), rhs],
        ))
    }

    /// Create a unary operation expression
    pub fn unary(&self, op: UnaryOperator) -> ExpressionResult<Expr> {
        let checker = TypeChecker::new(op.as_str());
        let data_type = checker.unary_output(op.output_type(self.data_type()), self.data_type())?;
        Ok(Expr::new(
            ExprKind::Unary(op),
            data_type,
            self.shape(),
            vec![self.clone()],
        ))
    }

    /// Create a reduction; the result is always a scalar
    pub fn reduce(&self, func: ReduceFunction) -> ExpressionResult<Expr> {
        let checker = TypeChecker::new(func.as_str());
        let data_type =
            checker.unary_output(func.output_type(self.data_type()), self.data_type())?;
        Ok(Expr::new(
            ExprKind::Reduce(func),
            data_type,
            Shape::Scalar,
            vec![self.clone()],
        ))
    }

    pub fn equal(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Eq, rhs)
    }

    pub fn not_equal(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Ne, rhs)
    }

    pub fn lt(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Lt, rhs)
    }

    pub fn le(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Le, rhs)
    }

    pub fn gt(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Gt, rhs)
    }

    pub fn ge(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Ge, rhs)
    }

    /// Numeric addition, or concatenation of two strings
    pub fn plus(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Add, rhs)
    }

    pub fn minus(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Sub, rhs)
    }

    pub fn multiply(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Mul, rhs)
    }

    pub fn divide(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Div, rhs)
    }

    pub fn and(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::And, rhs)
    }

    pub fn or(&self, rhs: impl IntoExpr) -> ExpressionResult<Expr> {
        self.binary(BinaryOperator::Or, rhs)
    }

    pub fn logical_not(&self) -> ExpressionResult<Expr> {
        self.unary(UnaryOperator::Not)
    }

    pub fn negate(&self) -> ExpressionResult<Expr> {
        self.unary(UnaryOperator::Negate)
    }

    pub fn abs(&self) -> ExpressionResult<Expr> {
        self.unary(UnaryOperator::Abs)
    }

    pub fn lower(&self) -> ExpressionResult<Expr> {
        self.unary(UnaryOperator::Lower)
    }

    pub fn upper(&self) -> ExpressionResult<Expr> {
        self.unary(UnaryOperator::Upper)
    }

    pub fn sum(&self) -> ExpressionResult<Expr> {
        self.reduce(ReduceFunction::Sum)
    }

    pub fn min(&self) -> ExpressionResult<Expr> {
        self.reduce(ReduceFunction::Min)
    }

    pub fn max(&self) -> ExpressionResult<Expr> {
        self.reduce(ReduceFunction::Max)
    }

    pub fn mean(&self) -> ExpressionResult<Expr> {
        self.reduce(ReduceFunction::Mean)
    }

    pub fn count(&self) -> ExpressionResult<Expr> {
        self.reduce(ReduceFunction::Count)
    }

    /// Explicitly convert to another element type
    pub fn astype(&self, target: ElementType) -> ExpressionResult<Expr> {
        if target == self.data_type() {
            return Ok(self.clone());
        }
        TypeChecker::new("astype").check_cast(self.data_type(), target)?;
        Ok(Expr::new(ExprKind::Cast, target, self.shape(), vec![self.clone()]))
    }
}
