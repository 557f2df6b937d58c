//! Error types for Strata.

use crate::types::DataType;
use alloc::format;
use alloc::string::String;
use core::fmt;

/// Result type alias for Strata operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Strata operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Column lengths disagree, key lists have different arities, or an output
    /// batch would violate its invariants.
    Schema {
        message: String,
    },
    /// Column not found.
    ColumnNotFound {
        column: String,
    },
    /// Operand or key types are not valid for an operation.
    TypeMismatch {
        message: String,
    },
    /// Two columns of one batch share a name.
    DuplicateColumn {
        column: String,
    },
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema { message } => {
                write!(f, "Schema error: {}", message)
            }
            Error::ColumnNotFound { column } => {
                write!(f, "Column not found: {}", column)
            }
            Error::TypeMismatch { message } => {
                write!(f, "Type mismatch: {}", message)
            }
            Error::DuplicateColumn { column } => {
                write!(f, "Duplicate column name: {}", column)
            }
            Error::InvalidOperation { message } => {
                write!(f, "Invalid operation: {}", message)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl Error {
    /// Creates a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Error::Schema {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            message: message.into(),
        }
    }

    /// Creates a type mismatch error for a binary operator applied to two types.
    pub fn incompatible_operands(op: &str, left: DataType, right: DataType) -> Self {
        Error::TypeMismatch {
            message: format!("cannot apply {} to {} and {}", op, left, right),
        }
    }

    /// Creates a duplicate column error.
    pub fn duplicate_column(column: impl Into<String>) -> Self {
        Error::DuplicateColumn {
            column: column.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }
}
