//! Integration tests for expression evaluation, Filter, Select and WithColumn.

use pretty_assertions::assert_eq;
use strata_core::io::{BatchReader, BatchWriter, MemoryReader, MemoryWriter};
use strata_core::{Batch, Column, DataType, Error, Value};
use strata_query::{col, lit, lit_null, BatchOps};

fn people() -> Batch {
    Batch::try_new(vec![
        Column::from_i64s("id", vec![1, 2, 3, 4, 5]),
        Column::from_opt_i64s("age", vec![Some(10), Some(20), Some(30), Some(40), None]),
        Column::from_strs("name", vec!["alice", "Bob", "carol", "dave", "Eve"]),
        Column::from_opt_f64s("score", vec![Some(1.5), None, Some(3.0), Some(4.5), Some(2.0)]),
        Column::from_bools("active", vec![true, false, true, true, false]),
    ])
    .unwrap()
}

#[test]
fn test_filter_end_to_end() {
    let b = Batch::try_new(vec![Column::from_i64s("age", vec![10, 20, 30, 40])]).unwrap();
    let out = b.filter(&col("age").gt(lit(20))).unwrap();
    assert_eq!(out.column("age").unwrap().as_int64(), Some(&[30, 40][..]));
}

#[test]
fn test_filter_compound_predicate() {
    let predicate = col("age")
        .gt_eq(lit(20))
        .and(col("active"))
        .or(col("name").starts_with(lit("E")));
    let out = people().filter(&predicate).unwrap();
    assert_eq!(out.column("id").unwrap().as_int64(), Some(&[3, 4, 5][..]));
}

#[test]
fn test_filter_preserves_nulls_in_other_columns() {
    let out = people().filter(&col("id").lt_eq(lit(2))).unwrap();
    let score = out.column("score").unwrap();
    assert_eq!(score.values(), vec![Value::Float64(1.5), Value::Null]);
    assert_eq!(score.null_count(), 1);
}

#[test]
fn test_filter_null_predicate_rows_dropped() {
    let b = people();
    let kept = b.filter(&col("age").gt(lit(25))).unwrap();
    let negated = b.filter(&col("age").gt(lit(25)).not()).unwrap();
    // Row 5 has a null age and lands in neither side.
    assert_eq!(kept.num_rows() + negated.num_rows(), 4);
}

#[test]
fn test_case_sensitive_string_predicates() {
    let b = people();
    assert_eq!(b.filter(&col("name").contains(lit("b"))).unwrap().num_rows(), 0);
    assert_eq!(b.filter(&col("name").contains(lit("B"))).unwrap().num_rows(), 1);
    assert_eq!(b.filter(&col("name").ends_with(lit("e"))).unwrap().num_rows(), 3);

    let never = b.filter(&lit("abc").contains(lit("ABC"))).unwrap();
    assert_eq!(never.num_rows(), 0);
    assert_eq!(never.schema(), b.schema());
}

#[test]
fn test_select_is_idempotent_and_zero_copy() {
    let b = people();
    let once = b.select(&["score", "id"]).unwrap();
    let twice = once.select(&["score", "id"]).unwrap();
    assert_eq!(once, twice);
    assert!(once
        .column("score")
        .unwrap()
        .shares_buffers_with(b.column("score").unwrap()));
}

#[test]
fn test_with_column_arithmetic() {
    let out = people()
        .with_column("age_next", &(col("age") + lit(1)))
        .unwrap()
        .with_column("weighted", &(col("score") * col("age")))
        .unwrap();
    assert_eq!(
        out.column("age_next").unwrap().values(),
        vec![
            Value::Int64(11),
            Value::Int64(21),
            Value::Int64(31),
            Value::Int64(41),
            Value::Null
        ]
    );
    let weighted = out.column("weighted").unwrap();
    assert_eq!(weighted.data_type(), DataType::Float64);
    assert_eq!(weighted.float64_at(0), Some(15.0));
    assert!(weighted.is_null(1));
    assert!(weighted.is_null(4));
}

#[test]
fn test_with_column_division_and_modulo() {
    let b = Batch::try_new(vec![
        Column::from_i64s("a", vec![7, 8, 9]),
        Column::from_i64s("b", vec![2, 0, -4]),
    ])
    .unwrap();
    let out = b
        .with_column("q", &(col("a") / col("b")))
        .unwrap()
        .with_column("r", &(col("a") % col("b")))
        .unwrap();
    assert_eq!(
        out.column("q").unwrap().values(),
        vec![Value::Int64(3), Value::Null, Value::Int64(-2)]
    );
    assert_eq!(
        out.column("r").unwrap().values(),
        vec![Value::Int64(1), Value::Null, Value::Int64(1)]
    );
}

#[test]
fn test_null_checks() {
    let b = people();
    let missing = b.filter(&col("score").is_null()).unwrap();
    assert_eq!(missing.column("id").unwrap().as_int64(), Some(&[2][..]));

    let flagged = b.with_column("has_age", &col("age").is_not_null()).unwrap();
    assert_eq!(flagged.column("has_age").unwrap().null_count(), 0);

    let nothing = b.with_column("n", &(col("id") + lit_null())).unwrap();
    assert_eq!(nothing.column("n").unwrap().data_type(), DataType::Int64);
    assert_eq!(nothing.column("n").unwrap().null_count(), 5);
}

#[test]
fn test_transform_errors() {
    let b = people();
    assert_eq!(
        b.select(&["id", "salary"]).unwrap_err(),
        Error::column_not_found("salary")
    );
    assert!(matches!(
        b.filter(&col("name")),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        b.with_column("x", &(col("name") - lit(1))),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        b.filter(&col("age").lt(lit("30"))),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_pipeline_through_memory_io() {
    let mut reader = MemoryReader::new(vec![people(), people()]);
    let mut writer = MemoryWriter::new();
    while let Some(batch) = reader.read_batch().unwrap() {
        let out = batch
            .filter(&col("active"))
            .unwrap()
            .select(&["id", "name"])
            .unwrap();
        writer.write_batch(&out).unwrap();
    }
    assert_eq!(writer.total_rows(), 6);
    assert_eq!(writer.batches()[0].schema().names(), vec!["id", "name"]);
}
