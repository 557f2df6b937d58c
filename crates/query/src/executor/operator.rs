//! Operator trait for batch transforms.

use strata_core::{Batch, Result};

/// A transform that consumes one batch and produces a new one.
pub trait Operator {
    /// Executes the operator against `input`.
    fn execute(&self, input: &Batch) -> Result<Batch>;
}
