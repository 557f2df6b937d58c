//! Hashable key parts shared by grouping and joins.

use alloc::string::String;
use core::hash::{Hash, Hasher};
use strata_core::{normalized_f64_bits, Bitmap, Column, DataType, Error, Result};

/// One borrowed key value.
///
/// Numbers have one canonical form: a float holding an integer that fits in
/// `i64` is stored as `Int`, every other float as its normalized bits. Int64
/// and Float64 keys therefore compare exactly, `-0.0` equals `0.0` and all
/// NaNs are equal. Nulls are equal to each other; callers that want SQL join
/// semantics check [`KeyValue::is_null`] themselves.
#[derive(Clone, Copy, Debug)]
pub enum KeyValue<'a> {
    Null,
    Boolean(bool),
    Int(i64),
    Float(u64),
    Str(&'a str),
}

impl<'a> KeyValue<'a> {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, KeyValue::Null)
    }

    /// Canonical key for a float.
    #[inline]
    pub fn from_f64(f: f64) -> Self {
        // 2^63; `as i64` saturates at and above it.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if (-LIMIT..LIMIT).contains(&f) {
            let i = f as i64;
            if i as f64 == f {
                return KeyValue::Int(i);
            }
        }
        KeyValue::Float(normalized_f64_bits(f))
    }
}

impl<'a> PartialEq for KeyValue<'a> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyValue::Null, KeyValue::Null) => true,
            (KeyValue::Boolean(a), KeyValue::Boolean(b)) => a == b,
            (KeyValue::Int(a), KeyValue::Int(b)) => a == b,
            (KeyValue::Float(a), KeyValue::Float(b)) => a == b,
            (KeyValue::Str(a), KeyValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> Eq for KeyValue<'a> {}

impl<'a> Hash for KeyValue<'a> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            KeyValue::Null => state.write_u8(0),
            KeyValue::Boolean(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            KeyValue::Int(i) => {
                state.write_u8(2);
                i.hash(state);
            }
            KeyValue::Float(bits) => {
                state.write_u8(3);
                bits.hash(state);
            }
            KeyValue::Str(s) => {
                state.write_u8(4);
                s.hash(state);
            }
        }
    }
}

/// Typed row reader producing [`KeyValue`]s for one column.
#[derive(Clone, Copy)]
pub enum KeyColumn<'a> {
    Boolean(&'a [bool], &'a Bitmap),
    Int(&'a [i64], &'a Bitmap),
    Float(&'a [f64], &'a Bitmap),
    Utf8(&'a [String], &'a Bitmap),
}

impl<'a> KeyColumn<'a> {
    /// Reads `column` as its own type.
    pub fn new(column: &'a Column) -> Result<Self> {
        Self::with_type(column, column.data_type())
    }

    /// Reads `column` as `key_type`, which may only differ from the column
    /// type by widening Int64 to Float64. Integers keep their exact value,
    /// so widening never makes two distinct keys equal.
    pub fn with_type(column: &'a Column, key_type: DataType) -> Result<Self> {
        let validity = column.validity();
        let reader = match (column.data_type(), key_type) {
            (DataType::Boolean, DataType::Boolean) => {
                column.as_boolean().map(|v| KeyColumn::Boolean(v, validity))
            }
            (DataType::Int64, DataType::Int64 | DataType::Float64) => {
                column.as_int64().map(|v| KeyColumn::Int(v, validity))
            }
            (DataType::Float64, DataType::Float64) => {
                column.as_float64().map(|v| KeyColumn::Float(v, validity))
            }
            (DataType::Utf8, DataType::Utf8) => {
                column.as_utf8().map(|v| KeyColumn::Utf8(v, validity))
            }
            _ => None,
        };
        reader.ok_or_else(|| {
            Error::type_mismatch(alloc::format!(
                "cannot read {} column '{}' as a {} key",
                column.data_type(),
                column.name(),
                key_type
            ))
        })
    }

    /// Key value at `row`.
    #[inline]
    pub fn get(&self, row: usize) -> KeyValue<'a> {
        match *self {
            KeyColumn::Boolean(v, valid) if valid.get(row) => KeyValue::Boolean(v[row]),
            KeyColumn::Int(v, valid) if valid.get(row) => KeyValue::Int(v[row]),
            KeyColumn::Float(v, valid) if valid.get(row) => KeyValue::from_f64(v[row]),
            KeyColumn::Utf8(v, valid) if valid.get(row) => KeyValue::Str(v[row].as_str()),
            _ => KeyValue::Null,
        }
    }
}
