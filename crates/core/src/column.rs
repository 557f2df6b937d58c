//! Named columns.
//!
//! A [`Column`] is a name attached to a reference-counted [`Array`]. Cloning,
//! renaming and selecting a column share the underlying buffers.

use crate::array::{Array, ArrayBuilder, ArrayData};
use crate::bitmap::Bitmap;
use crate::error::Result;
use crate::schema::Field;
use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// A named, typed, immutable column.
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    array: Arc<Array>,
}

impl Column {
    /// Creates a column from a name and an array.
    pub fn new(name: impl Into<String>, array: Array) -> Self {
        Self {
            name: name.into(),
            array: Arc::new(array),
        }
    }

    /// Creates a column sharing an already reference-counted array.
    pub fn from_shared(name: impl Into<String>, array: Arc<Array>) -> Self {
        Self {
            name: name.into(),
            array,
        }
    }

    /// Creates a column from values of a declared type.
    pub fn from_values(name: impl Into<String>, data_type: DataType, values: &[Value]) -> Result<Self> {
        let mut builder = ArrayBuilder::new(data_type, values.len());
        for v in values {
            builder.append_value(v)?;
        }
        Ok(Self::new(name, builder.finish()))
    }

    /// Creates a fully valid Int64 column.
    pub fn from_i64s(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(name, Array::from_data(ArrayData::Int64(values)))
    }

    /// Creates a fully valid Float64 column.
    pub fn from_f64s(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, Array::from_data(ArrayData::Float64(values)))
    }

    /// Creates a fully valid Boolean column.
    pub fn from_bools(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self::new(name, Array::from_data(ArrayData::Boolean(values)))
    }

    /// Creates a fully valid Utf8 column.
    pub fn from_strs<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        Self::new(name, Array::from_data(ArrayData::Utf8(values)))
    }

    /// Creates an Int64 column where `None` is null.
    pub fn from_opt_i64s(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        let validity: Bitmap = values.iter().map(Option::is_some).collect();
        let data = values.into_iter().map(Option::unwrap_or_default).collect();
        Self::from_parts(name, ArrayData::Int64(data), validity)
    }

    /// Creates a Float64 column where `None` is null.
    pub fn from_opt_f64s(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let validity: Bitmap = values.iter().map(Option::is_some).collect();
        let data = values.into_iter().map(Option::unwrap_or_default).collect();
        Self::from_parts(name, ArrayData::Float64(data), validity)
    }

    /// Creates a Boolean column where `None` is null.
    pub fn from_opt_bools(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        let validity: Bitmap = values.iter().map(Option::is_some).collect();
        let data = values.into_iter().map(Option::unwrap_or_default).collect();
        Self::from_parts(name, ArrayData::Boolean(data), validity)
    }

    /// Creates a Utf8 column where `None` is null.
    pub fn from_opt_strs<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        let validity: Bitmap = values.iter().map(Option::is_some).collect();
        let data = values
            .into_iter()
            .map(|v| v.map(Into::into).unwrap_or_default())
            .collect();
        Self::from_parts(name, ArrayData::Utf8(data), validity)
    }

    fn from_parts(name: impl Into<String>, data: ArrayData, validity: Bitmap) -> Self {
        // Both halves come from the same input vector.
        Self::new(name, Array::from_parts(data, validity))
    }

    /// Column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.array.data_type()
    }

    /// Schema field describing this column.
    pub fn field(&self) -> Field {
        Field::new(self.name.clone(), self.data_type())
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns true if the column has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Underlying array.
    #[inline]
    pub fn array(&self) -> &Array {
        &self.array
    }

    /// Shared handle to the underlying array.
    #[inline]
    pub fn shared_array(&self) -> &Arc<Array> {
        &self.array
    }

    /// Validity bitmap.
    #[inline]
    pub fn validity(&self) -> &Bitmap {
        self.array.validity()
    }

    /// Number of null rows.
    #[inline]
    pub fn null_count(&self) -> usize {
        self.array.null_count()
    }

    /// Returns true if `row` is null.
    #[inline]
    pub fn is_null(&self, row: usize) -> bool {
        self.array.is_null(row)
    }

    /// Materializes the value at `row`.
    pub fn value_at(&self, row: usize) -> Value {
        self.array.value_at(row)
    }

    /// Int64 value at `row`; `None` if null, out of range, or not an Int64 column.
    pub fn int64_at(&self, row: usize) -> Option<i64> {
        if self.is_null(row) {
            return None;
        }
        self.array.as_int64().map(|v| v[row])
    }

    /// Float64 value at `row`; `None` if null, out of range, or not a Float64 column.
    pub fn float64_at(&self, row: usize) -> Option<f64> {
        if self.is_null(row) {
            return None;
        }
        self.array.as_float64().map(|v| v[row])
    }

    /// Boolean value at `row`; `None` if null, out of range, or not a Boolean column.
    pub fn boolean_at(&self, row: usize) -> Option<bool> {
        if self.is_null(row) {
            return None;
        }
        self.array.as_boolean().map(|v| v[row])
    }

    /// String at `row`; `None` if null, out of range, or not a Utf8 column.
    pub fn utf8_at(&self, row: usize) -> Option<&str> {
        if self.is_null(row) {
            return None;
        }
        self.array.as_utf8().map(|v| v[row].as_str())
    }

    /// Bulk Int64 buffer.
    pub fn as_int64(&self) -> Option<&[i64]> {
        self.array.as_int64()
    }

    /// Bulk Float64 buffer.
    pub fn as_float64(&self) -> Option<&[f64]> {
        self.array.as_float64()
    }

    /// Bulk Boolean buffer.
    pub fn as_boolean(&self) -> Option<&[bool]> {
        self.array.as_boolean()
    }

    /// Bulk Utf8 buffer.
    pub fn as_utf8(&self) -> Option<&[String]> {
        self.array.as_utf8()
    }

    /// Collects every row as a `Value`.
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|i| self.value_at(i)).collect()
    }

    /// Returns the same data under a new name (zero-copy).
    pub fn renamed(&self, name: impl Into<String>) -> Column {
        Self {
            name: name.into(),
            array: Arc::clone(&self.array),
        }
    }

    /// Gathers the given rows into a new column.
    pub fn take(&self, indices: &[usize]) -> Column {
        Self::new(self.name.clone(), self.array.take(indices))
    }

    /// Gathers rows where `None` produces a null.
    pub fn take_opt(&self, indices: &[Option<usize>]) -> Column {
        Self::new(self.name.clone(), self.array.take_opt(indices))
    }

    /// Returns true if both columns share the same underlying buffers.
    pub fn shares_buffers_with(&self, other: &Column) -> bool {
        Arc::ptr_eq(&self.array, &other.array)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.array == other.array
    }
}
