//! Batch executor module.
//!
//! - `eval`/`kernels`: vectorized expression evaluation
//! - `filter`, `project`: row and column transforms
//! - `aggregate`: hash grouping with arena-held aggregator states
//! - `join`: hash and nested loop joins

mod aggregate;
mod eval;
mod filter;
pub mod join;
mod key;
pub mod kernels;
mod operator;
mod project;

pub use aggregate::{AggSpec, AggregateExecutor, GroupKey};
pub use eval::{evaluate, evaluate_datum, evaluate_predicate};
pub use filter::FilterExecutor;
pub use join::{
    join, HashJoin, JoinAlgorithm, JoinKey, JoinOptions, JoinSpec, JoinType, NestedLoopJoin,
};
pub use key::{KeyColumn, KeyValue};
pub use kernels::Datum;
pub use operator::Operator;
pub use project::{drop_columns, rename_column, ProjectExecutor, WithColumnExecutor};
