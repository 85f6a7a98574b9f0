pub mod collection;
pub mod expression;
pub mod types;
