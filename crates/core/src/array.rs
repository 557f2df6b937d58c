//! Typed value buffers paired with validity bitmaps.
//!
//! An [`Array`] is the unnamed physical half of a column: one dense buffer per
//! logical type plus a [`Bitmap`]. Slots behind an unset validity bit hold an
//! unspecified default (0, 0.0, false, "") and must not be read as values.

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::types::DataType;
use crate::value::Value;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// Dense value buffer of one logical type.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Boolean(Vec<bool>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
}

impl ArrayData {
    /// Creates an empty buffer of the given type.
    pub fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Boolean => ArrayData::Boolean(Vec::with_capacity(capacity)),
            DataType::Int64 => ArrayData::Int64(Vec::with_capacity(capacity)),
            DataType::Float64 => ArrayData::Float64(Vec::with_capacity(capacity)),
            DataType::Utf8 => ArrayData::Utf8(Vec::with_capacity(capacity)),
        }
    }

    /// Logical type of the buffer.
    pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::Boolean(_) => DataType::Boolean,
            ArrayData::Int64(_) => DataType::Int64,
            ArrayData::Float64(_) => DataType::Float64,
            ArrayData::Utf8(_) => DataType::Utf8,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Boolean(v) => v.len(),
            ArrayData::Int64(v) => v.len(),
            ArrayData::Float64(v) => v.len(),
            ArrayData::Utf8(v) => v.len(),
        }
    }

    /// Returns true if the buffer has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable typed array with a validity bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    data: ArrayData,
    validity: Bitmap,
}

impl Array {
    /// Pairs a buffer with its validity bitmap.
    ///
    /// Fails with a schema error if the two lengths differ.
    pub fn try_new(data: ArrayData, validity: Bitmap) -> Result<Self> {
        if data.len() != validity.len() {
            return Err(Error::schema(format!(
                "buffer has {} slots but validity bitmap has {} bits",
                data.len(),
                validity.len()
            )));
        }
        Ok(Self { data, validity })
    }

    /// Pairs a buffer with a bitmap already known to have the same length.
    pub(crate) fn from_parts(data: ArrayData, validity: Bitmap) -> Self {
        debug_assert_eq!(data.len(), validity.len());
        Self { data, validity }
    }

    /// Creates an array where every slot is valid.
    pub fn from_data(data: ArrayData) -> Self {
        let validity = Bitmap::all_valid(data.len());
        Self { data, validity }
    }

    /// Creates an all-null array of the given type and length.
    pub fn new_null(data_type: DataType, len: usize) -> Self {
        let data = match data_type {
            DataType::Boolean => ArrayData::Boolean(alloc::vec![false; len]),
            DataType::Int64 => ArrayData::Int64(alloc::vec![0; len]),
            DataType::Float64 => ArrayData::Float64(alloc::vec![0.0; len]),
            DataType::Utf8 => ArrayData::Utf8(alloc::vec![String::new(); len]),
        };
        Self {
            data,
            validity: Bitmap::all_null(len),
        }
    }

    /// Broadcasts a scalar across `len` rows.
    ///
    /// A null scalar produces an all-null array of `data_type`; a non-null
    /// scalar must match `data_type` (Int64 widens into Float64).
    pub fn from_scalar(value: &Value, data_type: DataType, len: usize) -> Result<Self> {
        let data = match (value, data_type) {
            (Value::Null, _) => return Ok(Self::new_null(data_type, len)),
            (Value::Boolean(b), DataType::Boolean) => ArrayData::Boolean(alloc::vec![*b; len]),
            (Value::Int64(i), DataType::Int64) => ArrayData::Int64(alloc::vec![*i; len]),
            (Value::Int64(i), DataType::Float64) => {
                ArrayData::Float64(alloc::vec![*i as f64; len])
            }
            (Value::Float64(f), DataType::Float64) => ArrayData::Float64(alloc::vec![*f; len]),
            (Value::Utf8(s), DataType::Utf8) => ArrayData::Utf8(alloc::vec![s.clone(); len]),
            (v, dt) => {
                return Err(Error::type_mismatch(format!(
                    "cannot store {} in a {} array",
                    v, dt
                )))
            }
        };
        Ok(Self::from_data(data))
    }

    /// Logical type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Returns true if the array has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Value buffer.
    #[inline]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Validity bitmap.
    #[inline]
    pub fn validity(&self) -> &Bitmap {
        &self.validity
    }

    /// Number of null rows.
    #[inline]
    pub fn null_count(&self) -> usize {
        self.validity.count_null()
    }

    /// Returns true if `row` is null or out of range.
    #[inline]
    pub fn is_null(&self, row: usize) -> bool {
        !self.validity.get(row)
    }

    /// Materializes the value at `row`. Out-of-range rows read as null.
    pub fn value_at(&self, row: usize) -> Value {
        if self.is_null(row) {
            return Value::Null;
        }
        match &self.data {
            ArrayData::Boolean(v) => Value::Boolean(v[row]),
            ArrayData::Int64(v) => Value::Int64(v[row]),
            ArrayData::Float64(v) => Value::Float64(v[row]),
            ArrayData::Utf8(v) => Value::Utf8(v[row].clone()),
        }
    }

    /// Boolean buffer, if this is a Boolean array.
    pub fn as_boolean(&self) -> Option<&[bool]> {
        match &self.data {
            ArrayData::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Int64 buffer, if this is an Int64 array.
    pub fn as_int64(&self) -> Option<&[i64]> {
        match &self.data {
            ArrayData::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Float64 buffer, if this is a Float64 array.
    pub fn as_float64(&self) -> Option<&[f64]> {
        match &self.data {
            ArrayData::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Utf8 buffer, if this is a Utf8 array.
    pub fn as_utf8(&self) -> Option<&[String]> {
        match &self.data {
            ArrayData::Utf8(v) => Some(v),
            _ => None,
        }
    }

    /// Gathers the given rows into a new array, in index order.
    pub fn take(&self, indices: &[usize]) -> Array {
        self.gather(indices.len(), indices.iter().map(|&i| Some(i)))
    }

    /// Gathers rows where `None` produces a null slot.
    pub fn take_opt(&self, indices: &[Option<usize>]) -> Array {
        self.gather(indices.len(), indices.iter().copied())
    }

    fn gather(&self, len: usize, indices: impl Iterator<Item = Option<usize>>) -> Array {
        let (data, validity) = match &self.data {
            ArrayData::Boolean(v) => {
                let (d, b) = gather_slice(v, &self.validity, len, indices);
                (ArrayData::Boolean(d), b)
            }
            ArrayData::Int64(v) => {
                let (d, b) = gather_slice(v, &self.validity, len, indices);
                (ArrayData::Int64(d), b)
            }
            ArrayData::Float64(v) => {
                let (d, b) = gather_slice(v, &self.validity, len, indices);
                (ArrayData::Float64(d), b)
            }
            ArrayData::Utf8(v) => {
                let (d, b) = gather_slice(v, &self.validity, len, indices);
                (ArrayData::Utf8(d), b)
            }
        };
        Array { data, validity }
    }
}

fn gather_slice<T: Clone + Default>(
    values: &[T],
    validity: &Bitmap,
    len: usize,
    indices: impl Iterator<Item = Option<usize>>,
) -> (Vec<T>, Bitmap) {
    let mut out = Vec::with_capacity(len);
    let mut bits = Bitmap::with_capacity(len);
    for idx in indices {
        match idx {
            Some(i) if validity.get(i) => {
                out.push(values[i].clone());
                bits.push(true);
            }
            _ => {
                out.push(T::default());
                bits.push(false);
            }
        }
    }
    (out, bits)
}

/// Incremental builder for an [`Array`] of a fixed type.
#[derive(Debug)]
pub struct ArrayBuilder {
    data: ArrayData,
    validity: Bitmap,
}

impl ArrayBuilder {
    /// Creates a builder for `data_type` with room for `capacity` rows.
    pub fn new(data_type: DataType, capacity: usize) -> Self {
        Self {
            data: ArrayData::with_capacity(data_type, capacity),
            validity: Bitmap::with_capacity(capacity),
        }
    }

    /// Type of the array being built.
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Rows appended so far.
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Returns true if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Appends a null slot.
    pub fn append_null(&mut self) {
        match &mut self.data {
            ArrayData::Boolean(v) => v.push(false),
            ArrayData::Int64(v) => v.push(0),
            ArrayData::Float64(v) => v.push(0.0),
            ArrayData::Utf8(v) => v.push(String::new()),
        }
        self.validity.push(false);
    }

    /// Appends a value, which must match the builder type or be null.
    ///
    /// Int64 values widen into a Float64 builder.
    pub fn append_value(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            self.append_null();
            return Ok(());
        }
        match (&mut self.data, value) {
            (ArrayData::Boolean(v), Value::Boolean(b)) => v.push(*b),
            (ArrayData::Int64(v), Value::Int64(i)) => v.push(*i),
            (ArrayData::Float64(v), Value::Float64(f)) => v.push(*f),
            (ArrayData::Float64(v), Value::Int64(i)) => v.push(*i as f64),
            (ArrayData::Utf8(v), Value::Utf8(s)) => v.push(s.clone()),
            (data, value) => {
                return Err(Error::type_mismatch(format!(
                    "cannot append {} to a {} array",
                    value,
                    data.data_type()
                )))
            }
        }
        self.validity.push(true);
        Ok(())
    }

    /// Finishes the array.
    pub fn finish(self) -> Array {
        Array {
            data: self.data,
            validity: self.validity,
        }
    }
}
