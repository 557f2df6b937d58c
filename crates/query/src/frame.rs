//! Fluent transform API on [`Batch`].
//!
//! ```rust
//! use strata_core::{Batch, Column};
//! use strata_query::{col, lit, BatchOps};
//!
//! let people = Batch::try_new(vec![
//!     Column::from_i64s("age", vec![10, 20, 30, 40]),
//!     Column::from_strs("dept", vec!["eng", "ops", "eng", "ops"]),
//! ])
//! .unwrap();
//!
//! let adults = people.filter(&col("age").gt(lit(20))).unwrap();
//! assert_eq!(adults.column("age").unwrap().as_int64(), Some(&[30, 40][..]));
//!
//! let totals = people.group_by(&["dept"]).sum("age").unwrap();
//! assert_eq!(totals.column("sum_age").unwrap().as_int64(), Some(&[40, 60][..]));
//! ```

use crate::ast::Expr;
use crate::executor::{
    drop_columns, join, rename_column, AggSpec, AggregateExecutor, FilterExecutor, JoinSpec,
    JoinType, Operator, ProjectExecutor, WithColumnExecutor,
};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use strata_core::{Batch, Result};

/// Transforms available on every batch. Each returns a new batch and leaves
/// `self` untouched.
pub trait BatchOps {
    /// Exactly the named columns, in the given order.
    fn select(&self, names: &[&str]) -> Result<Batch>;

    /// Rows where `predicate` is true.
    fn filter(&self, predicate: &Expr) -> Result<Batch>;

    /// Appends `name = expr`, or replaces the column already called `name`.
    fn with_column(&self, name: &str, expr: &Expr) -> Result<Batch>;

    /// Starts a grouped aggregation on the given key columns.
    fn group_by(&self, keys: &[&str]) -> GroupBy<'_>;

    /// Inner hash join on one key column per side.
    fn inner_join(&self, other: &Batch, left_key: &str, right_key: &str) -> Result<Batch>;

    /// Inner hash join on several key columns.
    fn inner_join_on(&self, other: &Batch, left_keys: &[&str], right_keys: &[&str]) -> Result<Batch>;

    /// Left hash join on one key column per side.
    fn left_join(&self, other: &Batch, left_key: &str, right_key: &str) -> Result<Batch>;

    /// Join described by a full [`JoinSpec`].
    fn join(&self, other: &Batch, spec: &JoinSpec) -> Result<Batch>;

    /// Removes the named columns.
    fn drop(&self, names: &[&str]) -> Result<Batch>;

    /// Renames one column.
    fn rename(&self, from: &str, to: &str) -> Result<Batch>;
}

impl BatchOps for Batch {
    fn select(&self, names: &[&str]) -> Result<Batch> {
        ProjectExecutor::new(names.iter().copied()).execute(self)
    }

    fn filter(&self, predicate: &Expr) -> Result<Batch> {
        FilterExecutor::new(predicate.clone()).execute(self)
    }

    fn with_column(&self, name: &str, expr: &Expr) -> Result<Batch> {
        WithColumnExecutor::new(name, expr.clone()).execute(self)
    }

    fn group_by(&self, keys: &[&str]) -> GroupBy<'_> {
        GroupBy {
            batch: self,
            keys: keys.iter().map(|k| String::from(*k)).collect(),
        }
    }

    fn inner_join(&self, other: &Batch, left_key: &str, right_key: &str) -> Result<Batch> {
        join(self, other, &JoinSpec::inner(left_key, right_key))
    }

    fn inner_join_on(&self, other: &Batch, left_keys: &[&str], right_keys: &[&str]) -> Result<Batch> {
        let spec = JoinSpec::new(left_keys.iter().copied(), right_keys.iter().copied(), JoinType::Inner);
        join(self, other, &spec)
    }

    fn left_join(&self, other: &Batch, left_key: &str, right_key: &str) -> Result<Batch> {
        join(self, other, &JoinSpec::left(left_key, right_key))
    }

    fn join(&self, other: &Batch, spec: &JoinSpec) -> Result<Batch> {
        join(self, other, spec)
    }

    fn drop(&self, names: &[&str]) -> Result<Batch> {
        drop_columns(self, names)
    }

    fn rename(&self, from: &str, to: &str) -> Result<Batch> {
        rename_column(self, from, to)
    }
}

/// A pending grouped aggregation.
pub struct GroupBy<'a> {
    batch: &'a Batch,
    keys: Vec<String>,
}

impl<'a> GroupBy<'a> {
    /// Computes all `aggregates` in one pass.
    pub fn agg(&self, aggregates: Vec<AggSpec>) -> Result<Batch> {
        AggregateExecutor::new(self.keys.iter().cloned(), aggregates).execute(self.batch)
    }

    pub fn sum(&self, column: &str) -> Result<Batch> {
        self.agg(vec![AggSpec::sum(column)])
    }

    pub fn avg(&self, column: &str) -> Result<Batch> {
        self.agg(vec![AggSpec::avg(column)])
    }

    pub fn min(&self, column: &str) -> Result<Batch> {
        self.agg(vec![AggSpec::min(column)])
    }

    pub fn max(&self, column: &str) -> Result<Batch> {
        self.agg(vec![AggSpec::max(column)])
    }

    /// Row count per group.
    pub fn count(&self) -> Result<Batch> {
        self.agg(vec![AggSpec::count()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{col, lit};
    use strata_core::{Column, Value};

    fn employees() -> Batch {
        Batch::try_new(vec![
            Column::from_strs("dept", vec!["eng", "eng", "sales"]),
            Column::from_i64s("salary", vec![100, 200, 50]),
        ])
        .unwrap()
    }

    #[test]
    fn test_chained_transforms() {
        let out = employees()
            .with_column("bonus", &(col("salary") / lit(10)))
            .unwrap()
            .filter(&col("bonus").gt_eq(lit(10)))
            .unwrap()
            .select(&["dept", "bonus"])
            .unwrap();
        assert_eq!(out.num_rows(), 2);
        assert_eq!(out.column("bonus").unwrap().as_int64(), Some(&[10, 20][..]));
    }

    #[test]
    fn test_group_by_shorthands() {
        let b = employees();
        let counts = b.group_by(&["dept"]).count().unwrap();
        assert_eq!(counts.row(0), vec![Value::from("eng"), Value::Int64(2)]);

        let max = b.group_by(&["dept"]).max("salary").unwrap();
        assert_eq!(max.column("max_salary").unwrap().as_int64(), Some(&[200, 50][..]));

        let avg = b.group_by(&[]).avg("salary").unwrap();
        assert_eq!(avg.num_rows(), 1);
    }

    #[test]
    fn test_drop_rename() {
        let out = employees().rename("salary", "pay").unwrap().drop(&["dept"]).unwrap();
        assert_eq!(out.schema().names(), vec!["pay"]);
    }
}
