//! JOIN algorithm implementations.
//!
//! Both algorithms share key binding and output assembly: the output holds
//! the left columns followed by the right columns minus the right key
//! columns, with colliding right names prefixed until unique.

mod hash;
mod nested;

pub use hash::{HashJoin, JoinKey};
pub use nested::NestedLoopJoin;

use crate::executor::key::KeyColumn;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use strata_core::{Batch, Column, Error, Result};

/// Join semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoinType {
    /// Only matching pairs.
    #[default]
    Inner,
    /// Every left row at least once; unmatched rows get null right columns.
    Left,
}

/// Physical join algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoinAlgorithm {
    #[default]
    Hash,
    NestedLoop,
}

/// Tunables shared by all join algorithms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinOptions {
    /// Treat null keys as equal to each other.
    pub null_equals_null: bool,
    /// Prefix for right columns whose names collide.
    pub right_prefix: String,
    pub algorithm: JoinAlgorithm,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            null_equals_null: false,
            right_prefix: String::from("right_"),
            algorithm: JoinAlgorithm::Hash,
        }
    }
}

impl JoinOptions {
    pub fn with_null_equals_null(mut self, enabled: bool) -> Self {
        self.null_equals_null = enabled;
        self
    }

    pub fn with_right_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.right_prefix = prefix.into();
        self
    }

    pub fn with_algorithm(mut self, algorithm: JoinAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// A complete join request: key columns on both sides, semantics and options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSpec {
    pub left_keys: Vec<String>,
    pub right_keys: Vec<String>,
    pub join_type: JoinType,
    pub options: JoinOptions,
}

impl JoinSpec {
    /// Creates a join on pairwise-equal key columns.
    pub fn new<L, R>(
        left_keys: impl IntoIterator<Item = L>,
        right_keys: impl IntoIterator<Item = R>,
        join_type: JoinType,
    ) -> Self
    where
        L: Into<String>,
        R: Into<String>,
    {
        Self {
            left_keys: left_keys.into_iter().map(Into::into).collect(),
            right_keys: right_keys.into_iter().map(Into::into).collect(),
            join_type,
            options: JoinOptions::default(),
        }
    }

    /// Inner join on one key column per side.
    pub fn inner(left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        Self::new([left_key.into()], [right_key.into()], JoinType::Inner)
    }

    /// Left join on one key column per side.
    pub fn left(left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        Self::new([left_key.into()], [right_key.into()], JoinType::Left)
    }

    pub fn with_options(mut self, options: JoinOptions) -> Self {
        self.options = options;
        self
    }
}

/// Joins `left` and `right` with the algorithm selected in `spec.options`.
pub fn join(left: &Batch, right: &Batch, spec: &JoinSpec) -> Result<Batch> {
    match spec.options.algorithm {
        JoinAlgorithm::Hash => HashJoin::new(spec.clone()).execute(left, right),
        JoinAlgorithm::NestedLoop => NestedLoopJoin::new(spec.clone()).execute(left, right),
    }
}

/// Key readers for both sides, typed so that equal keys compare equal.
pub(crate) struct BoundKeys<'a> {
    pub left: Vec<KeyColumn<'a>>,
    pub right: Vec<KeyColumn<'a>>,
    pub right_key_indices: Vec<usize>,
}

/// Resolves and type-checks the key columns of `spec`.
pub(crate) fn bind_keys<'a>(left: &'a Batch, right: &'a Batch, spec: &JoinSpec) -> Result<BoundKeys<'a>> {
    if spec.left_keys.len() != spec.right_keys.len() {
        return Err(Error::schema(format!(
            "join has {} left keys but {} right keys",
            spec.left_keys.len(),
            spec.right_keys.len()
        )));
    }
    if spec.left_keys.is_empty() {
        return Err(Error::schema("join requires at least one key column"));
    }

    let mut bound = BoundKeys {
        left: Vec::with_capacity(spec.left_keys.len()),
        right: Vec::with_capacity(spec.right_keys.len()),
        right_key_indices: Vec::with_capacity(spec.right_keys.len()),
    };
    for (l_name, r_name) in spec.left_keys.iter().zip(&spec.right_keys) {
        let l = left.column(l_name)?;
        let r = right.column(r_name)?;
        let key_type = l.data_type().key_compatible(r.data_type()).ok_or_else(|| {
            Error::type_mismatch(format!(
                "join key '{}' ({}) is not comparable with '{}' ({})",
                l_name,
                l.data_type(),
                r_name,
                r.data_type()
            ))
        })?;
        bound.left.push(KeyColumn::with_type(l, key_type)?);
        bound.right.push(KeyColumn::with_type(r, key_type)?);
        if let Some(index) = right.index_of(r_name) {
            bound.right_key_indices.push(index);
        }
    }
    Ok(bound)
}

/// Builds the output batch from matched row pairs.
///
/// `right_rows[i]` is `None` for an unmatched left row of a left join.
pub(crate) fn assemble(
    left: &Batch,
    right: &Batch,
    right_key_indices: &[usize],
    prefix: &str,
    left_rows: &[usize],
    right_rows: &[Option<usize>],
) -> Result<Batch> {
    let left_names = left.schema().names();
    let kept_right: Vec<&Column> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(index, _)| !right_key_indices.contains(index))
        .map(|(_, column)| column)
        .collect();

    // Right columns that do not collide keep their names, so renamed ones
    // must avoid those as well as the left names.
    let mut taken: Vec<String> = left_names.iter().map(|n| String::from(*n)).collect();
    taken.extend(
        kept_right
            .iter()
            .filter(|c| !left_names.contains(&c.name()))
            .map(|c| String::from(c.name())),
    );

    let mut columns: Vec<Column> = left.columns().iter().map(|c| c.take(left_rows)).collect();
    for column in kept_right {
        let mut name = String::from(column.name());
        if left_names.contains(&column.name()) {
            while taken.contains(&name) {
                if prefix.is_empty() {
                    return Err(Error::duplicate_column(name));
                }
                name = format!("{}{}", prefix, name);
            }
            taken.push(name.clone());
        }
        columns.push(column.take_opt(right_rows).renamed(name));
    }

    Batch::try_new_with_rows(columns, left_rows.len())
}
