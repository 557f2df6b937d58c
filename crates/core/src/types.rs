//! Logical data types for Strata columns.
//!
//! This module defines the closed set of types a column can hold.

use core::fmt;

/// Logical type of a column or scalar value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    Utf8,
}

impl DataType {
    /// Returns true for `Int64` and `Float64`.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }

    /// Returns the result type of an arithmetic operation between two numeric types.
    ///
    /// Int64 op Int64 stays Int64, any Float64 operand widens to Float64.
    /// Returns `None` when either side is not numeric.
    pub fn numeric_promotion(self, other: DataType) -> Option<DataType> {
        match (self, other) {
            (DataType::Int64, DataType::Int64) => Some(DataType::Int64),
            (DataType::Int64, DataType::Float64)
            | (DataType::Float64, DataType::Int64)
            | (DataType::Float64, DataType::Float64) => Some(DataType::Float64),
            _ => None,
        }
    }

    /// Returns the type two key columns are compared as, if they are compatible.
    ///
    /// Identical types compare as themselves; Int64 and Float64 compare as Float64.
    pub fn key_compatible(self, other: DataType) -> Option<DataType> {
        if self == other {
            return Some(self);
        }
        self.numeric_promotion(other)
    }

    /// Short lowercase name used in generated column names and messages.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::Int64, DataType::Int64);
        assert_ne!(DataType::Int64, DataType::Float64);
    }

    #[test]
    fn test_numeric() {
        assert!(DataType::Int64.is_numeric());
        assert!(DataType::Float64.is_numeric());
        assert!(!DataType::Utf8.is_numeric());
        assert!(!DataType::Boolean.is_numeric());
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(
            DataType::Int64.numeric_promotion(DataType::Int64),
            Some(DataType::Int64)
        );
        assert_eq!(
            DataType::Float64.numeric_promotion(DataType::Int64),
            Some(DataType::Float64)
        );
        assert_eq!(DataType::Utf8.numeric_promotion(DataType::Int64), None);
    }

    #[test]
    fn test_key_compatible() {
        assert_eq!(
            DataType::Utf8.key_compatible(DataType::Utf8),
            Some(DataType::Utf8)
        );
        assert_eq!(
            DataType::Int64.key_compatible(DataType::Float64),
            Some(DataType::Float64)
        );
        assert_eq!(DataType::Boolean.key_compatible(DataType::Int64), None);
    }
}
