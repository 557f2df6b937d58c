//! Element-wise kernels over arrays and scalars.
//!
//! Operands are either a shared array or a scalar that has not been broadcast.
//! Each kernel reads its operands through a typed accessor, so the same loop
//! serves array/array, array/scalar and scalar/array inputs. When both
//! operands are scalars the kernel runs over a single row and the result
//! stays scalar.

use crate::ast::{BinaryOp, UnaryOp};
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use strata_core::{total_cmp_f64, Array, ArrayData, Bitmap, DataType, Error, Result, Value};

/// Intermediate result of expression evaluation.
#[derive(Clone, Debug)]
pub enum Datum {
    /// One value per row.
    Array(Arc<Array>),
    /// A single value standing for every row. `data_type` is `None` only for
    /// an untyped null literal.
    Scalar {
        value: Value,
        data_type: Option<DataType>,
    },
}

impl Datum {
    /// Wraps a literal.
    pub fn literal(value: Value) -> Self {
        let data_type = value.data_type();
        Datum::Scalar { value, data_type }
    }

    /// Type of the values, `None` for an untyped null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Datum::Array(a) => Some(a.data_type()),
            Datum::Scalar { data_type, .. } => *data_type,
        }
    }

    fn is_scalar(&self) -> bool {
        matches!(self, Datum::Scalar { .. })
    }

    fn is_null_scalar(&self) -> bool {
        matches!(self, Datum::Scalar { value: Value::Null, .. })
    }

    /// Materializes the datum as an array of `len` rows.
    ///
    /// Scalars are broadcast; an untyped null becomes an all-null Boolean array.
    pub fn into_array(self, len: usize) -> Result<Arc<Array>> {
        match self {
            Datum::Array(a) => Ok(a),
            Datum::Scalar { value, data_type } => Ok(Arc::new(Array::from_scalar(
                &value,
                data_type.unwrap_or(DataType::Boolean),
                len,
            )?)),
        }
    }
}

/// Primitive values that kernels produce.
trait NativeType: Copy + Default {
    fn into_data(values: Vec<Self>) -> ArrayData;
}

impl NativeType for bool {
    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Boolean(values)
    }
}

impl NativeType for i64 {
    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Int64(values)
    }
}

impl NativeType for f64 {
    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Float64(values)
    }
}

/// Row accessor for a fixed-width operand.
enum PrimRef<'a, T> {
    Slice(&'a [T], &'a Bitmap),
    Const(Option<T>),
}

impl<'a, T: Copy> PrimRef<'a, T> {
    #[inline]
    fn get(&self, row: usize) -> Option<T> {
        match self {
            PrimRef::Slice(values, validity) => {
                if validity.get(row) {
                    Some(values[row])
                } else {
                    None
                }
            }
            PrimRef::Const(v) => *v,
        }
    }
}

/// Row accessor that widens Int64 operands to f64.
enum NumRef<'a> {
    Int(&'a [i64], &'a Bitmap),
    Float(&'a [f64], &'a Bitmap),
    Const(Option<f64>),
}

impl<'a> NumRef<'a> {
    #[inline]
    fn get(&self, row: usize) -> Option<f64> {
        match self {
            NumRef::Int(values, validity) => validity.get(row).then(|| values[row] as f64),
            NumRef::Float(values, validity) => validity.get(row).then(|| values[row]),
            NumRef::Const(v) => *v,
        }
    }
}

/// Row accessor for a Utf8 operand.
enum StrRef<'a> {
    Slice(&'a [alloc::string::String], &'a Bitmap),
    Const(Option<&'a str>),
}

impl<'a> StrRef<'a> {
    #[inline]
    fn get(&self, row: usize) -> Option<&'a str> {
        match self {
            StrRef::Slice(values, validity) => validity.get(row).then(|| values[row].as_str()),
            StrRef::Const(v) => *v,
        }
    }
}

fn unexpected(expected: DataType, datum: &Datum) -> Error {
    match datum.data_type() {
        Some(actual) => Error::type_mismatch(format!("expected {}, got {}", expected, actual)),
        None => Error::type_mismatch(format!("expected {}, got null", expected)),
    }
}

fn bools(d: &Datum) -> Result<PrimRef<'_, bool>> {
    match d {
        Datum::Array(a) => a
            .as_boolean()
            .map(|v| PrimRef::Slice(v, a.validity()))
            .ok_or_else(|| unexpected(DataType::Boolean, d)),
        Datum::Scalar { value: Value::Null, .. } => Ok(PrimRef::Const(None)),
        Datum::Scalar { value, .. } => value
            .as_bool()
            .map(|b| PrimRef::Const(Some(b)))
            .ok_or_else(|| unexpected(DataType::Boolean, d)),
    }
}

fn ints(d: &Datum) -> Result<PrimRef<'_, i64>> {
    match d {
        Datum::Array(a) => a
            .as_int64()
            .map(|v| PrimRef::Slice(v, a.validity()))
            .ok_or_else(|| unexpected(DataType::Int64, d)),
        Datum::Scalar { value: Value::Null, .. } => Ok(PrimRef::Const(None)),
        Datum::Scalar { value, .. } => value
            .as_i64()
            .map(|i| PrimRef::Const(Some(i)))
            .ok_or_else(|| unexpected(DataType::Int64, d)),
    }
}

fn numbers(d: &Datum) -> Result<NumRef<'_>> {
    match d {
        Datum::Array(a) => match a.data() {
            ArrayData::Int64(v) => Ok(NumRef::Int(v, a.validity())),
            ArrayData::Float64(v) => Ok(NumRef::Float(v, a.validity())),
            _ => Err(unexpected(DataType::Float64, d)),
        },
        Datum::Scalar { value: Value::Null, .. } => Ok(NumRef::Const(None)),
        Datum::Scalar { value, .. } => value
            .as_numeric()
            .map(|f| NumRef::Const(Some(f)))
            .ok_or_else(|| unexpected(DataType::Float64, d)),
    }
}

fn strings(d: &Datum) -> Result<StrRef<'_>> {
    match d {
        Datum::Array(a) => a
            .as_utf8()
            .map(|v| StrRef::Slice(v, a.validity()))
            .ok_or_else(|| unexpected(DataType::Utf8, d)),
        Datum::Scalar { value: Value::Null, .. } => Ok(StrRef::Const(None)),
        Datum::Scalar { value, .. } => value
            .as_str()
            .map(|s| StrRef::Const(Some(s)))
            .ok_or_else(|| unexpected(DataType::Utf8, d)),
    }
}

/// Runs `f` for every row, collecting values and validity.
fn collect_rows<O, F>(rows: usize, mut f: F) -> (Vec<O>, Bitmap)
where
    O: NativeType,
    F: FnMut(usize) -> Option<O>,
{
    let mut values = Vec::with_capacity(rows);
    let mut validity = Bitmap::with_capacity(rows);
    for row in 0..rows {
        match f(row) {
            Some(v) => {
                values.push(v);
                validity.push(true);
            }
            None => {
                values.push(O::default());
                validity.push(false);
            }
        }
    }
    (values, validity)
}

fn finish<O: NativeType>(
    (values, validity): (Vec<O>, Bitmap),
    scalar: bool,
    data_type: DataType,
) -> Result<Datum> {
    let array = Array::try_new(O::into_data(values), validity)?;
    if scalar {
        return Ok(Datum::Scalar {
            value: array.value_at(0),
            data_type: Some(data_type),
        });
    }
    Ok(Datum::Array(Arc::new(array)))
}

#[inline]
fn ordering_matches(op: BinaryOp, ord: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::Ne => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Ge => ord != Ordering::Less,
        _ => false,
    }
}

/// Applies a binary operator row by row.
///
/// `output` is the already resolved result type of `op` for these operands.
pub fn binary(op: BinaryOp, left: &Datum, right: &Datum, output: DataType, len: usize) -> Result<Datum> {
    let scalar = left.is_scalar() && right.is_scalar();
    let rows = if scalar { 1 } else { len };

    // Only Kleene logic can turn a null operand into a non-null result.
    if !op.is_logical() && (left.is_null_scalar() || right.is_null_scalar()) {
        return Ok(Datum::Scalar {
            value: Value::Null,
            data_type: Some(output),
        });
    }

    match op {
        BinaryOp::And => {
            let (l, r) = (bools(left)?, bools(right)?);
            let rows = collect_rows(rows, |i| match (l.get(i), r.get(i)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            });
            finish(rows, scalar, output)
        }
        BinaryOp::Or => {
            let (l, r) = (bools(left)?, bools(right)?);
            let rows = collect_rows(rows, |i| match (l.get(i), r.get(i)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            });
            finish(rows, scalar, output)
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, left, right, output, rows, scalar)
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            compare(op, left, right, rows, scalar)
        }
        BinaryOp::Contains | BinaryOp::StartsWith | BinaryOp::EndsWith => {
            let (l, r) = (strings(left)?, strings(right)?);
            let rows = collect_rows(rows, |i| {
                let (a, b) = (l.get(i)?, r.get(i)?);
                Some(match op {
                    BinaryOp::Contains => a.contains(b),
                    BinaryOp::StartsWith => a.starts_with(b),
                    _ => a.ends_with(b),
                })
            });
            finish(rows, scalar, DataType::Boolean)
        }
    }
}

fn arithmetic(
    op: BinaryOp,
    left: &Datum,
    right: &Datum,
    output: DataType,
    rows: usize,
    scalar: bool,
) -> Result<Datum> {
    if output == DataType::Int64 {
        let (l, r) = (ints(left)?, ints(right)?);
        let rows = collect_rows(rows, |i| {
            let (a, b) = (l.get(i)?, r.get(i)?);
            match op {
                BinaryOp::Add => Some(a.wrapping_add(b)),
                BinaryOp::Sub => Some(a.wrapping_sub(b)),
                BinaryOp::Mul => Some(a.wrapping_mul(b)),
                BinaryOp::Div => (b != 0).then(|| a.wrapping_div(b)),
                _ => (b != 0).then(|| a.wrapping_rem(b)),
            }
        });
        return finish(rows, scalar, DataType::Int64);
    }

    let (l, r) = (numbers(left)?, numbers(right)?);
    let rows = collect_rows(rows, |i| {
        let (a, b) = (l.get(i)?, r.get(i)?);
        match op {
            BinaryOp::Add => Some(a + b),
            BinaryOp::Sub => Some(a - b),
            BinaryOp::Mul => Some(a * b),
            BinaryOp::Div => (b != 0.0).then(|| a / b),
            _ => (b != 0.0).then(|| a % b),
        }
    });
    finish(rows, scalar, DataType::Float64)
}

fn compare(op: BinaryOp, left: &Datum, right: &Datum, rows: usize, scalar: bool) -> Result<Datum> {
    let rows = match (left.data_type(), right.data_type()) {
        (Some(DataType::Int64), Some(DataType::Int64)) => {
            let (l, r) = (ints(left)?, ints(right)?);
            collect_rows(rows, |i| Some(ordering_matches(op, l.get(i)?.cmp(&r.get(i)?))))
        }
        (Some(DataType::Utf8), _) => {
            let (l, r) = (strings(left)?, strings(right)?);
            collect_rows(rows, |i| Some(ordering_matches(op, l.get(i)?.cmp(r.get(i)?))))
        }
        (Some(DataType::Boolean), _) => {
            let (l, r) = (bools(left)?, bools(right)?);
            collect_rows(rows, |i| Some(ordering_matches(op, l.get(i)?.cmp(&r.get(i)?))))
        }
        _ => {
            let (l, r) = (numbers(left)?, numbers(right)?);
            collect_rows(rows, |i| {
                Some(ordering_matches(op, total_cmp_f64(l.get(i)?, r.get(i)?)))
            })
        }
    };
    finish(rows, scalar, DataType::Boolean)
}

/// Applies a unary operator row by row.
pub fn unary(op: UnaryOp, input: &Datum, output: DataType, len: usize) -> Result<Datum> {
    let scalar = input.is_scalar();
    let rows = if scalar { 1 } else { len };

    match op {
        UnaryOp::IsNull | UnaryOp::IsNotNull => {
            let want_null = op == UnaryOp::IsNull;
            let rows = match input {
                Datum::Array(a) => {
                    let validity = a.validity();
                    collect_rows(rows, |i| Some(validity.get(i) != want_null))
                }
                Datum::Scalar { value, .. } => {
                    collect_rows(rows, |_| Some(value.is_null() == want_null))
                }
            };
            finish(rows, scalar, DataType::Boolean)
        }
        _ if input.is_null_scalar() => Ok(Datum::Scalar {
            value: Value::Null,
            data_type: Some(output),
        }),
        UnaryOp::Not => {
            let v = bools(input)?;
            finish(collect_rows(rows, |i| v.get(i).map(|b| !b)), scalar, DataType::Boolean)
        }
        UnaryOp::Neg => {
            if output == DataType::Int64 {
                let v = ints(input)?;
                finish(collect_rows(rows, |i| v.get(i).map(i64::wrapping_neg)), scalar, output)
            } else {
                let v = numbers(input)?;
                finish(collect_rows(rows, |i| v.get(i).map(|f| -f)), scalar, output)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ints_array(values: Vec<Option<i64>>) -> Datum {
        let mut builder = strata_core::ArrayBuilder::new(DataType::Int64, values.len());
        for v in values {
            builder.append_value(&Value::from(v)).unwrap();
        }
        Datum::Array(Arc::new(builder.finish()))
    }

    fn bools_array(values: Vec<Option<bool>>) -> Datum {
        let mut builder = strata_core::ArrayBuilder::new(DataType::Boolean, values.len());
        for v in values {
            builder.append_value(&Value::from(v)).unwrap();
        }
        Datum::Array(Arc::new(builder.finish()))
    }

    fn values(d: Datum, len: usize) -> Vec<Value> {
        let a = d.into_array(len).unwrap();
        (0..a.len()).map(|i| a.value_at(i)).collect()
    }

    #[test]
    fn test_int_arithmetic_with_scalar() {
        let l = ints_array(vec![Some(1), None, Some(3)]);
        let r = Datum::literal(Value::Int64(10));
        let out = binary(BinaryOp::Add, &l, &r, DataType::Int64, 3).unwrap();
        assert_eq!(
            values(out, 3),
            vec![Value::Int64(11), Value::Null, Value::Int64(13)]
        );
    }

    #[test]
    fn test_division_by_zero_is_null() {
        let l = ints_array(vec![Some(6), Some(7)]);
        let r = ints_array(vec![Some(3), Some(0)]);
        let out = binary(BinaryOp::Div, &l, &r, DataType::Int64, 2).unwrap();
        assert_eq!(values(out, 2), vec![Value::Int64(2), Value::Null]);

        let out = binary(BinaryOp::Mod, &l, &r, DataType::Int64, 2).unwrap();
        assert_eq!(values(out, 2), vec![Value::Int64(0), Value::Null]);
    }

    #[test]
    fn test_wrapping_overflow() {
        let l = ints_array(vec![Some(i64::MAX)]);
        let r = Datum::literal(Value::Int64(1));
        let out = binary(BinaryOp::Add, &l, &r, DataType::Int64, 1).unwrap();
        assert_eq!(values(out, 1), vec![Value::Int64(i64::MIN)]);
    }

    #[test]
    fn test_mixed_numeric_promotes() {
        let l = ints_array(vec![Some(1), Some(2)]);
        let r = Datum::literal(Value::Float64(0.5));
        let out = binary(BinaryOp::Mul, &l, &r, DataType::Float64, 2).unwrap();
        assert_eq!(values(out, 2), vec![Value::Float64(0.5), Value::Float64(1.0)]);

        let out = binary(BinaryOp::Gt, &l, &r, DataType::Boolean, 2).unwrap();
        assert_eq!(values(out, 2), vec![Value::Boolean(true), Value::Boolean(true)]);
    }

    #[test]
    fn test_kleene_logic() {
        let l = bools_array(vec![Some(false), Some(true), None, None, Some(true)]);
        let r = bools_array(vec![None, None, Some(false), Some(true), Some(true)]);
        let and = binary(BinaryOp::And, &l, &r, DataType::Boolean, 5).unwrap();
        assert_eq!(
            values(and, 5),
            vec![
                Value::Boolean(false),
                Value::Null,
                Value::Boolean(false),
                Value::Null,
                Value::Boolean(true)
            ]
        );
        let or = binary(BinaryOp::Or, &l, &r, DataType::Boolean, 5).unwrap();
        assert_eq!(
            values(or, 5),
            vec![
                Value::Null,
                Value::Boolean(true),
                Value::Null,
                Value::Boolean(true),
                Value::Boolean(true)
            ]
        );
    }

    #[test]
    fn test_kleene_with_null_literal() {
        let l = bools_array(vec![Some(false), Some(true)]);
        let null = Datum::literal(Value::Null);
        let and = binary(BinaryOp::And, &l, &null, DataType::Boolean, 2).unwrap();
        assert_eq!(values(and, 2), vec![Value::Boolean(false), Value::Null]);
    }

    #[test]
    fn test_scalar_scalar_stays_scalar() {
        let l = Datum::literal(Value::from("abc"));
        let r = Datum::literal(Value::from("ABC"));
        let out = binary(BinaryOp::Contains, &l, &r, DataType::Boolean, 4).unwrap();
        assert!(out.is_scalar());
        assert_eq!(values(out, 4), vec![Value::Boolean(false); 4]);
    }

    #[test]
    fn test_null_literal_takes_output_type() {
        let l = ints_array(vec![Some(1), Some(2)]);
        let out = binary(BinaryOp::Add, &l, &Datum::literal(Value::Null), DataType::Int64, 2).unwrap();
        let a = out.into_array(2).unwrap();
        assert_eq!(a.data_type(), DataType::Int64);
        assert_eq!(a.null_count(), 2);
    }

    #[test]
    fn test_unary() {
        let v = ints_array(vec![Some(4), None]);
        let neg = unary(UnaryOp::Neg, &v, DataType::Int64, 2).unwrap();
        assert_eq!(values(neg, 2), vec![Value::Int64(-4), Value::Null]);

        let is_null = unary(UnaryOp::IsNull, &v, DataType::Boolean, 2).unwrap();
        assert_eq!(values(is_null, 2), vec![Value::Boolean(false), Value::Boolean(true)]);

        let b = bools_array(vec![Some(true), None]);
        let not = unary(UnaryOp::Not, &b, DataType::Boolean, 2).unwrap();
        assert_eq!(values(not, 2), vec![Value::Boolean(false), Value::Null]);
    }

    #[test]
    fn test_string_compare_is_bytewise() {
        let l = Datum::literal(Value::from("B"));
        let r = Datum::literal(Value::from("a"));
        let out = binary(BinaryOp::Lt, &l, &r, DataType::Boolean, 1).unwrap();
        assert_eq!(values(out, 1), vec![Value::Boolean(true)]);
    }
}
