//! Record batches: ordered columns sharing one row count.

use crate::array::Array;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::schema::{Field, Schema};
use crate::value::Value;
use alloc::format;
use alloc::vec::Vec;

/// An immutable set of equally long, uniquely named columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    schema: Schema,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Batch {
    /// Creates a batch from columns.
    ///
    /// Fails with a schema error if the column lengths differ and with a
    /// duplicate column error if two columns share a name.
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, Column::len);
        for column in &columns {
            if column.len() != num_rows {
                return Err(Error::schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    num_rows
                )));
            }
        }
        let schema = Schema::try_new(columns.iter().map(Column::field).collect())?;
        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// Creates a batch with an explicit row count.
    ///
    /// Needed for batches with no columns but a non-zero row count, such as
    /// selecting zero columns from a populated batch.
    pub fn try_new_with_rows(columns: Vec<Column>, num_rows: usize) -> Result<Self> {
        if let Some(c) = columns.iter().find(|c| c.len() != num_rows) {
            return Err(Error::schema(format!(
                "column '{}' has {} rows, expected {}",
                c.name(),
                c.len(),
                num_rows
            )));
        }
        let schema = Schema::try_new(columns.iter().map(Column::field).collect())?;
        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// Creates a zero-row batch with the given schema.
    pub fn empty(schema: Schema) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| Column::new(f.name(), Array::new_null(f.data_type(), 0)))
            .collect();
        Self {
            schema,
            columns,
            num_rows: 0,
        }
    }

    /// Schema of the batch.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the batch has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Columns in order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consumes the batch, returning its columns.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Position of the column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name)
    }

    /// Column named `name`.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.index_of(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Column at position `index`.
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Fields in order.
    pub fn fields(&self) -> &[Field] {
        self.schema.fields()
    }

    /// Materializes row `index` as values, one per column.
    pub fn row(&self, index: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value_at(index)).collect()
    }

    /// Gathers the given rows from every column.
    pub fn take(&self, indices: &[usize]) -> Batch {
        Self {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            num_rows: indices.len(),
        }
    }
}
