//! Element-wise expression trees.
//!
//! This module provides:
//! - Shapes and the rule for combining them across operands
//! - The immutable, typed expression node tree
//! - Operator constructors that validate operands before building a node
//! - Structural interning of nodes for optimizers
//!
//! Every constructor either returns a fully typed node or an
//! [`ExpressionError`]; no partially built node is ever observable.

pub mod builder;
pub mod cache;
pub mod cut;
pub mod element;
pub mod error;
pub mod expr;
pub mod operator;
pub mod shape;
pub mod type_checker;

pub use builder::IntoExpr;
pub use cache::ExprCache;
pub use cut::{CutOptions, CutSpec};
pub use element::Cases;
pub use error::{ErrorKind, ExpressionError, ExpressionResult};
pub use expr::{Expr, ExprKind};
pub use operator::{BinaryOperator, ReduceFunction, UnaryOperator};
pub use shape::Shape;
pub use type_checker::TypeChecker;
