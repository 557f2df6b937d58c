//! Nested Loop Join implementation.

use super::{assemble, bind_keys, JoinKey, JoinSpec, JoinType};
use alloc::string::String;
use alloc::vec::Vec;
use log::debug;
use strata_core::{Batch, Result};

/// Nested Loop Join executor.
///
/// The simplest join algorithm that compares every pair of rows. It has the
/// same semantics and output order as [`HashJoin`](super::HashJoin) and
/// serves as its reference.
pub struct NestedLoopJoin {
    spec: JoinSpec,
}

impl NestedLoopJoin {
    /// Creates a new nested loop join executor.
    pub fn new(spec: JoinSpec) -> Self {
        Self { spec }
    }

    /// Creates an inner nested loop join.
    pub fn inner(left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        Self::new(JoinSpec::inner(left_key, right_key))
    }

    /// Creates a left outer nested loop join.
    pub fn left_outer(left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        Self::new(JoinSpec::left(left_key, right_key))
    }

    /// Executes the nested loop join with key equality.
    pub fn execute(&self, left: &Batch, right: &Batch) -> Result<Batch> {
        let keys = bind_keys(left, right, &self.spec)?;
        let null_equals_null = self.spec.options.null_equals_null;
        let outer = self.spec.join_type == JoinType::Left;

        let right_keys: Vec<Option<JoinKey<'_>>> = (0..right.num_rows())
            .map(|row| JoinKey::from_row(&keys.right, row, null_equals_null))
            .collect();

        let mut left_rows = Vec::new();
        let mut right_rows = Vec::new();
        for row in 0..left.num_rows() {
            let mut match_found = false;
            if let Some(left_key) = JoinKey::from_row(&keys.left, row, null_equals_null) {
                for (right_row, right_key) in right_keys.iter().enumerate() {
                    if right_key.as_ref() == Some(&left_key) {
                        match_found = true;
                        left_rows.push(row);
                        right_rows.push(Some(right_row));
                    }
                }
            }
            if outer && !match_found {
                left_rows.push(row);
                right_rows.push(None);
            }
        }

        debug!(
            "nested loop join ({:?}): {} x {} rows -> {} rows",
            self.spec.join_type,
            left.num_rows(),
            right.num_rows(),
            left_rows.len()
        );

        assemble(
            left,
            right,
            &keys.right_key_indices,
            &self.spec.options.right_prefix,
            &left_rows,
            &right_rows,
        )
    }
}
