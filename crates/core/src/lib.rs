//! Strata Core - Columnar data model for the Strata transformation engine.
//!
//! This crate provides the foundational types every Strata operation reads and
//! produces:
//!
//! - `DataType`: Supported logical types (Boolean, Int64, Float64, Utf8)
//! - `Value`: Scalar values, used for literals and row materialization
//! - `Bitmap`, `Array`: Typed value buffers with validity bitmaps
//! - `Column`: A named, reference-counted array
//! - `Batch`: Equally long, uniquely named columns with a `Schema`
//! - `io`: The reader/writer contract codecs implement
//! - `Error`: Error types shared by all Strata crates
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Batch, Column, DataType, Value};
//!
//! let batch = Batch::try_new(vec![
//!     Column::from_i64s("id", vec![1, 2]),
//!     Column::from_opt_strs("name", vec![Some("Alice"), None]),
//! ])
//! .unwrap();
//!
//! assert_eq!(batch.num_rows(), 2);
//! assert_eq!(batch.column("name").unwrap().data_type(), DataType::Utf8);
//! assert_eq!(batch.row(1), vec![Value::Int64(2), Value::Null]);
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod array;
mod batch;
pub mod bitmap;
mod column;
mod error;
pub mod io;
mod schema;
mod types;
mod value;

pub use array::{Array, ArrayBuilder, ArrayData};
pub use batch::Batch;
pub use bitmap::Bitmap;
pub use column::Column;
pub use error::{Error, Result};
pub use schema::{Field, Schema};
pub use types::DataType;
pub use value::{normalized_f64_bits, total_cmp_f64, Value};
