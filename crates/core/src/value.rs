//! Scalar values.
//!
//! `Value` is the row-at-a-time view of a single cell. It is used for literals,
//! for typed access in tests, and as the input to column builders. Bulk
//! computation works on the typed arrays in [`crate::array`] instead.

use crate::types::DataType;
use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A value that can be stored in a single cell.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// UTF-8 string
    Utf8(String),
}

impl Value {
    /// Returns the data type of this value, or None if it's Null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i64 value if this is an Int64, None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float64, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value widened to f64 if it is numeric.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a Utf8, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns a type ordering value for comparing different types.
    fn type_order(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int64(_) | Value::Float64(_) => 2,
            Value::Utf8(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Utf8(a), Value::Utf8(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => normalized_f64_bits(*f).hash(state),
            Value::Utf8(s) => s.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            // Equal numbers of different types order Int64 first, matching `eq`.
            (Value::Int64(a), Value::Float64(b)) => cmp_i64_f64(*a, *b).then(Ordering::Less),
            (Value::Float64(a), Value::Int64(b)) => {
                cmp_i64_f64(*b, *a).reverse().then(Ordering::Greater)
            }
            (Value::Float64(a), Value::Float64(b)) => total_cmp_f64(*a, *b),
            (Value::Utf8(a), Value::Utf8(b)) => a.cmp(b),
            // Different types: order by type discriminant
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

/// Exact comparison of an integer with a float; NaN is greater than every integer.
fn cmp_i64_f64(i: i64, f: f64) -> Ordering {
    // 2^63; every float in (-LIMIT, LIMIT) truncates to an in-range i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let truncated = f as i64;
    match i.cmp(&truncated) {
        // The fraction is exact: floats at or beyond 2^53 are integral.
        Ordering::Equal => total_cmp_f64(0.0, f - truncated as f64),
        other => other,
    }
}

/// Compares two floats, treating NaN as greater than every other value.
#[inline]
pub fn total_cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Bit pattern used to hash a float: `-0.0` folds to `0.0` and every NaN to one NaN.
#[inline]
pub fn normalized_f64_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float64(v) => write!(f, "{:?}", v),
            Value::Utf8(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_value_type_check() {
        let v = Value::Int64(42);
        assert_eq!(v.data_type(), Some(DataType::Int64));
    }

    #[test]
    fn test_value_null() {
        let v = Value::Null;
        assert_eq!(v.data_type(), None);
        assert!(v.is_null());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Int64(100).as_i64(), Some(100));
        assert_eq!(Value::Float64(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::Int64(2).as_numeric(), Some(2.0));
        assert_eq!(Value::Utf8("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::Utf8("hello".into()).as_numeric(), None);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Int64(42), Value::Int64(42));
        assert_ne!(Value::Int64(42), Value::Float64(42.0));
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Int64(1) < Value::Int64(2));
        assert!(Value::Int64(1) < Value::Float64(1.5));
        assert!(Value::Utf8("a".into()) < Value::Utf8("b".into()));
        assert!(Value::Null < Value::Int64(0));
        assert!(Value::Float64(1.0) < Value::Float64(f64::NAN));
    }

    #[test]
    fn test_mixed_numeric_ordering_agrees_with_eq() {
        let int = Value::Int64(1);
        let float = Value::Float64(1.0);
        assert_ne!(int, float);
        assert_eq!(int.cmp(&float), Ordering::Less);
        assert_eq!(float.cmp(&int), Ordering::Greater);

        assert!(Value::Int64(2) > Value::Float64(1.5));
        assert!(Value::Float64(-0.5) < Value::Int64(0));
        assert!(Value::Int64(i64::MAX) < Value::Float64(f64::NAN));
        // Exact beyond 2^53, where `as f64` would round the integer down.
        assert!(Value::Int64(9_007_199_254_740_993) > Value::Float64(9_007_199_254_740_992.0));
        assert!(Value::Int64(i64::MIN) > Value::Float64(f64::NEG_INFINITY));
    }

    #[test]
    fn test_normalized_bits() {
        assert_eq!(normalized_f64_bits(-0.0), normalized_f64_bits(0.0));
        assert_eq!(
            normalized_f64_bits(f64::NAN),
            normalized_f64_bits(-f64::NAN)
        );
    }

    #[test]
    fn test_value_from_impls() {
        let v: Value = 42i32.into();
        assert_eq!(v.as_i64(), Some(42));

        let v: Value = "hello".into();
        assert_eq!(v.as_str(), Some("hello"));

        let v: Value = Some(100i64).into();
        assert_eq!(v.as_i64(), Some(100));

        let v: Value = None::<i64>.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::Utf8("x".into())), "'x'");
        assert_eq!(format!("{}", Value::Float64(2.0)), "2.0");
        assert_eq!(format!("{}", Value::Null), "null");
    }
}
