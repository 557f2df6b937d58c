//! Filter executor.

use crate::ast::Expr;
use crate::executor::eval::evaluate_predicate;
use crate::executor::kernels::Datum;
use crate::executor::Operator;
use alloc::vec::Vec;
use log::debug;
use strata_core::{Batch, Result, Value};

/// Filter executor - keeps the rows where a predicate is true.
///
/// Rows where the predicate is false or null are dropped; the rest keep their
/// original order.
pub struct FilterExecutor {
    predicate: Expr,
}

impl FilterExecutor {
    /// Creates a new filter executor.
    pub fn new(predicate: Expr) -> Self {
        Self { predicate }
    }

    /// The predicate being applied.
    pub fn predicate(&self) -> &Expr {
        &self.predicate
    }
}

impl Operator for FilterExecutor {
    fn execute(&self, input: &Batch) -> Result<Batch> {
        let mask = evaluate_predicate(&self.predicate, input)?;
        let rows = input.num_rows();

        let selected: Vec<usize> = match &mask {
            Datum::Scalar { value, .. } => {
                if matches!(value, Value::Boolean(true)) {
                    (0..rows).collect()
                } else {
                    Vec::new()
                }
            }
            Datum::Array(array) => {
                let validity = array.validity();
                match array.as_boolean() {
                    Some(values) => (0..rows).filter(|&i| validity.get(i) && values[i]).collect(),
                    None => Vec::new(),
                }
            }
        };

        debug!(
            "filter {}: {} rows in, {} rows out",
            self.predicate,
            rows,
            selected.len()
        );

        if selected.len() == rows {
            return Ok(input.clone());
        }
        if selected.is_empty() {
            return Ok(Batch::empty(input.schema().clone()));
        }
        Ok(input.take(&selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{col, lit, lit_null};
    use alloc::vec;
    use strata_core::{Column, Error};

    fn batch() -> Batch {
        Batch::try_new(vec![
            Column::from_opt_i64s("age", vec![Some(10), Some(20), Some(30), None, Some(40)]),
            Column::from_strs("name", vec!["a", "b", "c", "d", "e"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_keeps_true_rows() {
        let out = FilterExecutor::new(col("age").gt(lit(20)))
            .execute(&batch())
            .unwrap();
        assert_eq!(out.num_rows(), 2);
        assert_eq!(out.column("age").unwrap().as_int64(), Some(&[30, 40][..]));
        assert_eq!(out.column("name").unwrap().utf8_at(1), Some("e"));
    }

    #[test]
    fn test_filter_drops_null_rows() {
        let out = FilterExecutor::new(col("age").lt_eq(lit(100)))
            .execute(&batch())
            .unwrap();
        assert_eq!(out.num_rows(), 4);
        assert_eq!(out.column("age").unwrap().null_count(), 0);
    }

    #[test]
    fn test_all_true_is_zero_copy() {
        let b = batch();
        let out = FilterExecutor::new(lit(true)).execute(&b).unwrap();
        assert!(out
            .column("name")
            .unwrap()
            .shares_buffers_with(b.column("name").unwrap()));
    }

    #[test]
    fn test_all_false_keeps_schema() {
        let b = batch();
        let out = FilterExecutor::new(col("age").gt(lit(1000))).execute(&b).unwrap();
        assert_eq!(out.num_rows(), 0);
        assert_eq!(out.schema(), b.schema());

        let out = FilterExecutor::new(lit_null()).execute(&b).unwrap();
        assert_eq!(out.num_rows(), 0);
    }

    #[test]
    fn test_non_boolean_predicate() {
        let err = FilterExecutor::new(col("age") + lit(1))
            .execute(&batch())
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
