//! Hash Join implementation.

use super::{assemble, bind_keys, JoinSpec, JoinType};
use crate::executor::key::{KeyColumn, KeyValue};
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};
use hashbrown::HashMap;
use log::{debug, trace};
use strata_core::{Batch, Result};

/// Key values of one row on either join side.
///
/// Both sides read their keys through readers typed by the same per-position
/// key type. An Int64 key matches a Float64 key only when both hold the same number.
#[derive(Clone, Debug)]
pub struct JoinKey<'a> {
    parts: Vec<KeyValue<'a>>,
}

impl<'a> JoinKey<'a> {
    /// Reads the key of `row`.
    ///
    /// Returns `None` when a part is null and nulls are not joinable, so the
    /// row can never match.
    pub fn from_row(columns: &[KeyColumn<'a>], row: usize, null_equals_null: bool) -> Option<Self> {
        let mut parts = Vec::with_capacity(columns.len());
        for column in columns {
            let value = column.get(row);
            if value.is_null() && !null_equals_null {
                return None;
            }
            parts.push(value);
        }
        Some(Self { parts })
    }
}

impl<'a> PartialEq for JoinKey<'a> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl<'a> Eq for JoinKey<'a> {}

impl<'a> Hash for JoinKey<'a> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        for part in &self.parts {
            part.hash(state);
        }
    }
}

/// Hash Join executor.
///
/// Implements the classic hash join algorithm:
/// 1. Build phase: index every right row by its key
/// 2. Probe phase: scan the left rows in order and look up their keys
///
/// Matches for one left row come out in ascending right-row order.
pub struct HashJoin {
    spec: JoinSpec,
}

impl HashJoin {
    /// Creates a new hash join executor.
    pub fn new(spec: JoinSpec) -> Self {
        Self { spec }
    }

    /// Creates an inner hash join on one key column per side.
    pub fn inner(left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        Self::new(JoinSpec::inner(left_key, right_key))
    }

    /// Creates a left outer hash join on one key column per side.
    pub fn left_outer(left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        Self::new(JoinSpec::left(left_key, right_key))
    }

    /// Executes the hash join.
    pub fn execute(&self, left: &Batch, right: &Batch) -> Result<Batch> {
        let keys = bind_keys(left, right, &self.spec)?;
        let null_equals_null = self.spec.options.null_equals_null;

        // Build phase: right row indices per key, in ascending order.
        let mut hash_table: HashMap<JoinKey<'_>, Vec<usize>> = HashMap::with_capacity(right.num_rows());
        for row in 0..right.num_rows() {
            if let Some(key) = JoinKey::from_row(&keys.right, row, null_equals_null) {
                hash_table.entry(key).or_default().push(row);
            }
        }
        trace!(
            "hash join build: {} right rows, {} distinct keys",
            right.num_rows(),
            hash_table.len()
        );

        // One slot per left row; skewed keys grow the buffers as they match.
        let mut left_rows: Vec<usize> = Vec::with_capacity(left.num_rows());
        let mut right_rows: Vec<Option<usize>> = Vec::with_capacity(left.num_rows());

        // Probe phase
        let outer = self.spec.join_type == JoinType::Left;
        for row in 0..left.num_rows() {
            let matches = JoinKey::from_row(&keys.left, row, null_equals_null)
                .and_then(|key| hash_table.get(&key));
            match matches {
                Some(build_rows) => {
                    for &build_row in build_rows {
                        left_rows.push(row);
                        right_rows.push(Some(build_row));
                    }
                }
                None if outer => {
                    left_rows.push(row);
                    right_rows.push(None);
                }
                None => {}
            }
        }

        debug!(
            "hash join ({:?}): {} x {} rows -> {} rows",
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
