//! Batch source and sink contract for codecs.
//!
//! File formats live outside this workspace; they hand batches to the engine
//! through [`BatchReader`] and receive results through [`BatchWriter`]. The
//! in-memory implementations here back tests and pipelines that never touch
//! disk.

use crate::batch::Batch;
use crate::error::{Error, Result};
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use log::trace;

/// A source of batches.
pub trait BatchReader {
    /// Returns the next batch, or `None` once the source is exhausted.
    fn read_batch(&mut self) -> Result<Option<Batch>>;
}

/// A sink for batches.
pub trait BatchWriter {
    /// Accepts one batch.
    fn write_batch(&mut self, batch: &Batch) -> Result<()>;
}

/// Reads batches from an in-memory queue.
#[derive(Debug, Default)]
pub struct MemoryReader {
    batches: VecDeque<Batch>,
}

impl MemoryReader {
    /// Creates a reader over `batches`, yielded in order.
    pub fn new(batches: Vec<Batch>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    /// Batches not yet read.
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl BatchReader for MemoryReader {
    fn read_batch(&mut self) -> Result<Option<Batch>> {
        match self.batches.pop_front() {
            Some(batch) => {
                validate(&batch)?;
                trace!("memory reader: yielding {} rows", batch.num_rows());
                Ok(Some(batch))
            }
            None => Ok(None),
        }
    }
}

impl Iterator for MemoryReader {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_batch().transpose()
    }
}

/// Collects written batches in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    batches: Vec<Batch>,
    closed: bool,
}

impl MemoryWriter {
    /// Creates an empty, open writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the sink; later writes fail.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Batches written so far.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Total rows across written batches.
    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(Batch::num_rows).sum()
    }

    /// Consumes the writer, returning its batches.
    pub fn into_batches(self) -> Vec<Batch> {
        self.batches
    }
}

impl BatchWriter for MemoryWriter {
    fn write_batch(&mut self, batch: &Batch) -> Result<()> {
        if self.closed {
            return Err(Error::invalid_operation("write to a closed batch writer"));
        }
        validate(batch)?;
        trace!("memory writer: accepted {} rows", batch.num_rows());
        self.batches.push(batch.clone());
        Ok(())
    }
}

/// Re-checks the batch invariants: equal lengths and unique names.
fn validate(batch: &Batch) -> Result<()> {
    Batch::try_new_with_rows(batch.columns().to_vec(), batch.num_rows()).map(|_| ())
}
