//! Vectorized expression evaluation.

use crate::ast::Expr;
use crate::executor::kernels::{self, Datum};
use alloc::sync::Arc;
use strata_core::{Batch, Column, DataType, Result};

/// Evaluates `expr` against `batch`, producing a column of `batch.num_rows()`
/// values named after [`Expr::output_name`].
///
/// A bare column reference returns the batch's own buffers.
pub fn evaluate(expr: &Expr, batch: &Batch) -> Result<Column> {
    let array = evaluate_datum(expr, batch)?.into_array(batch.num_rows())?;
    Ok(Column::from_shared(expr.output_name(), array))
}

/// Evaluates `expr` without broadcasting a scalar result.
pub fn evaluate_datum(expr: &Expr, batch: &Batch) -> Result<Datum> {
    match expr {
        Expr::Column(name) => {
            let column = batch.column(name)?;
            Ok(Datum::Array(Arc::clone(column.shared_array())))
        }
        Expr::Literal(value) => Ok(Datum::literal(value.clone())),
        Expr::BinaryOp { left, op, right } => {
            let l = evaluate_datum(left, batch)?;
            let r = evaluate_datum(right, batch)?;
            let output = op.result_type(l.data_type(), r.data_type())?;
            kernels::binary(*op, &l, &r, output, batch.num_rows())
        }
        Expr::UnaryOp { op, expr } => {
            let input = evaluate_datum(expr, batch)?;
            let output = op.result_type(input.data_type())?;
            kernels::unary(*op, &input, output, batch.num_rows())
        }
    }
}

/// Evaluates a predicate, requiring a Boolean result.
pub fn evaluate_predicate(expr: &Expr, batch: &Batch) -> Result<Datum> {
    let datum = evaluate_datum(expr, batch)?;
    match datum.data_type() {
        None | Some(DataType::Boolean) => Ok(datum),
        Some(other) => Err(strata_core::Error::type_mismatch(alloc::format!(
            "predicate {} evaluates to {}, expected boolean",
            expr, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{col, lit, lit_null};
    use alloc::vec;
    use strata_core::{Error, Value};

    fn batch() -> Batch {
        Batch::try_new(vec![
            Column::from_opt_i64s("age", vec![Some(10), Some(20), None, Some(40)]),
            Column::from_f64s("score", vec![1.5, 2.5, 3.5, 4.5]),
            Column::from_strs("name", vec!["Alice", "bob", "ALICE", "carol"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_ref_is_zero_copy() {
        let b = batch();
        let out = col("age").evaluate(&b).unwrap();
        assert!(out.shares_buffers_with(b.column("age").unwrap()));
        assert_eq!(out.name(), "age");
    }

    #[test]
    fn test_missing_column() {
        let err = col("salary").gt(lit(1)).evaluate(&batch()).unwrap_err();
        assert_eq!(err, Error::column_not_found("salary"));
    }

    #[test]
    fn test_comparison_propagates_null() {
        let out = col("age").gt(lit(15)).evaluate(&batch()).unwrap();
        assert_eq!(out.name(), "(age > 15)");
        assert_eq!(
            out.values(),
            vec![
                Value::Boolean(false),
                Value::Boolean(true),
                Value::Null,
                Value::Boolean(true)
            ]
        );
    }

    #[test]
    fn test_mixed_arithmetic() {
        let out = (col("age") + col("score")).evaluate(&batch()).unwrap();
        assert_eq!(out.data_type(), DataType::Float64);
        assert_eq!(out.float64_at(0), Some(11.5));
        assert!(out.is_null(2));
    }

    #[test]
    fn test_literal_broadcast() {
        let out = lit(7).evaluate(&batch()).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.as_int64(), Some(&[7, 7, 7, 7][..]));

        let nulls = lit_null().evaluate(&batch()).unwrap();
        assert_eq!(nulls.data_type(), DataType::Boolean);
        assert_eq!(nulls.null_count(), 4);
    }

    #[test]
    fn test_case_sensitive_contains() {
        let out = col("name").contains(lit("lic")).evaluate(&batch()).unwrap();
        assert_eq!(out.as_boolean(), Some(&[true, false, false, false][..]));

        let never = lit("abc").contains(lit("ABC")).evaluate(&batch()).unwrap();
        assert_eq!(never.as_boolean(), Some(&[false; 4][..]));
    }

    #[test]
    fn test_type_errors() {
        let b = batch();
        assert!(matches!(
            (col("name") + lit(1)).evaluate(&b),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            col("age").and(lit(true)).evaluate(&b),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            evaluate_predicate(&col("age"), &b),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_null_literal_adopts_operand_type() {
        let out = (col("age") + lit_null()).evaluate(&batch()).unwrap();
        assert_eq!(out.data_type(), DataType::Int64);
        assert_eq!(out.null_count(), 4);
    }
}
