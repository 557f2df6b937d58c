//! Strata Query - Expression evaluation and batch transforms for Strata.
//!
//! This crate provides the transformation engine over `strata-core` batches:
//!
//! - `ast`: Column expressions and the fluent builder (`col`, `lit`, ...)
//! - `executor`: Vectorized evaluation, filter, projection, grouping and joins
//! - `frame`: The `BatchOps` trait tying the executors together
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Batch, Column, Value};
//! use strata_query::{col, lit, BatchOps};
//!
//! let users = Batch::try_new(vec![
//!     Column::from_i64s("id", vec![1, 2, 3]),
//!     Column::from_strs("name", vec!["Alice", "Bob", "Carol"]),
//! ])
//! .unwrap();
//! let orders = Batch::try_new(vec![
//!     Column::from_i64s("user_id", vec![1, 1, 3]),
//!     Column::from_f64s("amount", vec![9.5, 3.0, 12.0]),
//! ])
//! .unwrap();
//!
//! let joined = users.inner_join(&orders, "id", "user_id").unwrap();
//! let big = joined.filter(&col("amount").gt(lit(5.0))).unwrap();
//! assert_eq!(big.num_rows(), 2);
//! assert_eq!(big.row(1), vec![Value::Int64(3), Value::from("Carol"), Value::Float64(12.0)]);
//! ```

#![no_std]

extern crate alloc;

pub mod ast;
pub mod executor;
pub mod frame;

pub use ast::{col, lit, lit_null, AggregateFunc, BinaryOp, Expr, UnaryOp};
pub use executor::{AggSpec, JoinAlgorithm, JoinOptions, JoinSpec, JoinType};
pub use frame::{BatchOps, GroupBy};
