//! Projection executors: column selection, derivation, drop and rename.

use crate::ast::Expr;
use crate::executor::eval::evaluate;
use crate::executor::Operator;
use alloc::string::String;
use alloc::vec::Vec;
use log::debug;
use strata_core::{Batch, Column, Error, Result};

/// Project executor - selects named columns in the given order.
///
/// Selected columns share buffers with the input.
pub struct ProjectExecutor {
    columns: Vec<String>,
}

impl ProjectExecutor {
    /// Creates a new project executor.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Operator for ProjectExecutor {
    fn execute(&self, input: &Batch) -> Result<Batch> {
        let mut out = Vec::with_capacity(self.columns.len());
        for (i, name) in self.columns.iter().enumerate() {
            if self.columns[..i].contains(name) {
                return Err(Error::duplicate_column(name.clone()));
            }
            out.push(input.column(name)?.clone());
        }
        debug!("select {} of {} columns", out.len(), input.num_columns());
        Batch::try_new_with_rows(out, input.num_rows())
    }
}

/// Adds or replaces one column with the result of an expression.
///
/// A column already named `name` is replaced in place; otherwise the new
/// column is appended. Other columns are passed through untouched.
pub struct WithColumnExecutor {
    name: String,
    expr: Expr,
}

impl WithColumnExecutor {
    /// Creates a new executor deriving `name` from `expr`.
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

impl Operator for WithColumnExecutor {
    fn execute(&self, input: &Batch) -> Result<Batch> {
        let derived = evaluate(&self.expr, input)?.renamed(self.name.clone());
        let mut columns = input.columns().to_vec();
        match input.index_of(&self.name) {
            Some(i) => {
                debug!("with_column: replacing '{}' = {}", self.name, self.expr);
                columns[i] = derived;
            }
            None => {
                debug!("with_column: appending '{}' = {}", self.name, self.expr);
                columns.push(derived);
            }
        }
        Batch::try_new_with_rows(columns, input.num_rows())
    }
}

/// Removes the named columns. Every name must exist.
pub fn drop_columns(input: &Batch, names: &[&str]) -> Result<Batch> {
    for name in names {
        input.column(name)?;
    }
    let kept: Vec<Column> = input
        .columns()
        .iter()
        .filter(|c| !names.contains(&c.name()))
        .cloned()
        .collect();
    Batch::try_new_with_rows(kept, input.num_rows())
}

/// Renames column `from` to `to`, keeping its position and buffers.
pub fn rename_column(input: &Batch, from: &str, to: &str) -> Result<Batch> {
    let index = input
        .index_of(from)
        .ok_or_else(|| Error::column_not_found(from))?;
    let mut columns = input.columns().to_vec();
    columns[index] = columns[index].renamed(to);
    Batch::try_new_with_rows(columns, input.num_rows())
}
