//! Type layer for element-wise expressions.
//!
//! This module provides the pieces every expression node is typed against:
//!
//! - **ElementType**: The logical type of a single value, plus the promotion
//!   lattice used to unify operand types
//! - **Value**: Literal constants wrapped into expression leaves
//! - **Schema**: Ordered `(field, type)` pairs supplied by a source catalog
//!
//! Nothing here depends on shapes or expression nodes; the expression layer
//! consults these types when it validates a new node.

pub mod data_type;
pub mod schema;
pub mod value;

pub use data_type::ElementType;
pub use schema::Schema;
pub use value::Value;
