//! AST module for column expressions.

mod expr;

pub use expr::{col, lit, lit_null, AggregateFunc, BinaryOp, Expr, UnaryOp};
