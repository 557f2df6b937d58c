//! Aggregate executor.
//!
//! Grouping is a single pass: every row computes its [`GroupKey`], looks up
//! or assigns a dense group id, and folds itself into that group's
//! aggregator states. States live in one arena indexed by
//! `group_id * aggregate_count + aggregate_index`.

use crate::ast::AggregateFunc;
use crate::executor::key::{KeyColumn, KeyValue};
use crate::executor::Operator;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use hashbrown::{HashMap, HashSet};
use libm::{exp, log as ln, sqrt};
use log::{debug, trace};
use strata_core::{
    total_cmp_f64, Array, ArrayBuilder, ArrayData, Batch, Column, DataType, Error, Result, Value,
};

/// One aggregate to compute: a function, its input column and an optional
/// output name.
#[derive(Clone, Debug, PartialEq)]
pub struct AggSpec {
    pub func: AggregateFunc,
    /// Input column. `Count` ignores the values and may leave this unset.
    pub column: Option<String>,
    /// Output column name; defaults to `<func>_<column>`, or `count`.
    pub alias: Option<String>,
}

impl AggSpec {
    /// Creates an aggregate over `column`.
    pub fn new(func: AggregateFunc, column: impl Into<String>) -> Self {
        Self {
            func,
            column: Some(column.into()),
            alias: None,
        }
    }

    /// Number of rows per group, nulls included.
    pub fn count() -> Self {
        Self {
            func: AggregateFunc::Count,
            column: None,
            alias: None,
        }
    }

    pub fn count_non_null(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::CountNonNull, column)
    }

    pub fn count_distinct(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::CountDistinct, column)
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::Sum, column)
    }

    pub fn avg(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::Avg, column)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::Min, column)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::Max, column)
    }

    pub fn std_dev(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::StdDev, column)
    }

    pub fn geo_mean(column: impl Into<String>) -> Self {
        Self::new(AggregateFunc::GeoMean, column)
    }

    /// Sets the output column name.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }

    /// Name of the output column.
    pub fn output_name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match &self.column {
            Some(column) => format!("{}_{}", self.func.name(), column),
            None => String::from(self.func.name()),
        }
    }
}

/// Values of the key columns for one row.
///
/// Null parts are equal to each other, so rows with nulls in the same key
/// positions fall into one group.
#[derive(Clone, Debug)]
pub struct GroupKey<'a> {
    parts: Vec<KeyValue<'a>>,
}

impl<'a> GroupKey<'a> {
    /// Reads the key of `row` from the given key columns.
    pub fn from_row(columns: &[KeyColumn<'a>], row: usize) -> Self {
        Self {
            parts: columns.iter().map(|c| c.get(row)).collect(),
        }
    }

    /// Key parts in key-column order.
    pub fn parts(&self) -> &[KeyValue<'a>] {
        &self.parts
    }
}

impl<'a> PartialEq for GroupKey<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl<'a> Eq for GroupKey<'a> {}

impl<'a> Hash for GroupKey<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for part in &self.parts {
            part.hash(state);
        }
    }
}

/// Running state of one aggregate for one group.
#[derive(Clone, Debug)]
enum AggState<'a> {
    Count(i64),
    CountNonNull(i64),
    CountDistinct(HashSet<KeyValue<'a>>),
    SumInt(Option<i64>),
    SumFloat(Option<f64>),
    Avg { sum: f64, count: i64 },
    /// Row holding the current extreme.
    Extreme(Option<usize>),
    /// Welford's running mean and sum of squared deviations.
    StdDev { count: i64, mean: f64, m2: f64 },
    GeoMean { log_sum: f64, count: i64 },
}

/// An aggregate bound to its input column.
struct BoundAgg<'a> {
    func: AggregateFunc,
    input: Option<&'a Array>,
    distinct: Option<KeyColumn<'a>>,
    output_type: DataType,
}

impl<'a> BoundAgg<'a> {
    fn bind(spec: &AggSpec, batch: &'a Batch) -> Result<Self> {
        let column = match &spec.column {
            Some(name) => Some(batch.column(name)?),
            None if spec.func == AggregateFunc::Count => None,
            None => {
                return Err(Error::invalid_operation(format!(
                    "{} requires an input column",
                    spec.func.name()
                )))
            }
        };
        let output_type = match column {
            Some(c) => spec.func.result_type(c.data_type())?,
            None => DataType::Int64,
        };
        let distinct = match (spec.func, column) {
            (AggregateFunc::CountDistinct, Some(c)) => Some(KeyColumn::new(c)?),
            _ => None,
        };
        Ok(Self {
            func: spec.func,
            input: column.map(Column::array),
            distinct,
            output_type,
        })
    }

    fn init(&self) -> AggState<'a> {
        match self.func {
            AggregateFunc::Count => AggState::Count(0),
            AggregateFunc::CountNonNull => AggState::CountNonNull(0),
            AggregateFunc::CountDistinct => AggState::CountDistinct(HashSet::new()),
            AggregateFunc::Sum if self.output_type == DataType::Int64 => AggState::SumInt(None),
            AggregateFunc::Sum => AggState::SumFloat(None),
            AggregateFunc::Avg => AggState::Avg { sum: 0.0, count: 0 },
            AggregateFunc::Min | AggregateFunc::Max => AggState::Extreme(None),
            AggregateFunc::StdDev => AggState::StdDev {
                count: 0,
                mean: 0.0,
                m2: 0.0,
            },
            AggregateFunc::GeoMean => AggState::GeoMean {
                log_sum: 0.0,
                count: 0,
            },
        }
    }

    fn update(&self, state: &mut AggState<'a>, row: usize) {
        if let AggState::Count(n) = state {
            *n += 1;
            return;
        }
        let Some(input) = self.input else {
            return;
        };
        if input.is_null(row) {
            return;
        }

        match state {
            AggState::Count(_) => {}
            AggState::CountNonNull(n) => *n += 1,
            AggState::CountDistinct(seen) => {
                if let Some(keys) = &self.distinct {
                    seen.insert(keys.get(row));
                }
            }
            AggState::SumInt(sum) => {
                if let Some(v) = input.as_int64().map(|v| v[row]) {
                    *sum = Some(sum.unwrap_or(0).wrapping_add(v));
                }
            }
            AggState::SumFloat(sum) => {
                if let Some(v) = numeric_at(input, row) {
                    *sum = Some(sum.unwrap_or(0.0) + v);
                }
            }
            AggState::Avg { sum, count } => {
                if let Some(v) = numeric_at(input, row) {
                    *sum += v;
                    *count += 1;
                }
            }
            AggState::Extreme(best) => {
                let replace = match *best {
                    None => true,
                    Some(current) => {
                        let ord = compare_rows(input, row, current);
                        match self.func {
                            AggregateFunc::Min => ord == Ordering::Less,
                            _ => ord == Ordering::Greater,
                        }
                    }
                };
                if replace {
                    *best = Some(row);
                }
            }
            AggState::StdDev { count, mean, m2 } => {
                if let Some(v) = numeric_at(input, row) {
                    *count += 1;
                    let delta = v - *mean;
                    *mean += delta / *count as f64;
                    *m2 += delta * (v - *mean);
                }
            }
            AggState::GeoMean { log_sum, count } => {
                if let Some(v) = numeric_at(input, row) {
                    if v > 0.0 {
                        *log_sum += ln(v);
                        *count += 1;
                    }
                }
            }
        }
    }

    fn finalize(&self, state: &AggState<'a>) -> Value {
        match state {
            AggState::Count(n) | AggState::CountNonNull(n) => Value::Int64(*n),
            AggState::CountDistinct(seen) => Value::Int64(seen.len() as i64),
            AggState::SumInt(sum) => sum.map_or(Value::Null, Value::Int64),
            AggState::SumFloat(sum) => sum.map_or(Value::Null, Value::Float64),
            AggState::Avg { sum, count } => {
                if *count == 0 {
                    Value::Null
                } else {
                    Value::Float64(sum / *count as f64)
                }
            }
            AggState::Extreme(best) => match (best, self.input) {
                (Some(row), Some(input)) => input.value_at(*row),
                _ => Value::Null,
            },
            AggState::StdDev { count, m2, .. } => {
                if *count == 0 {
                    Value::Null
                } else {
                    Value::Float64(sqrt(m2 / *count as f64))
                }
            }
            AggState::GeoMean { log_sum, count } => {
                if *count == 0 {
                    Value::Null
                } else {
                    Value::Float64(exp(log_sum / *count as f64))
                }
            }
        }
    }
}

fn numeric_at(array: &Array, row: usize) -> Option<f64> {
    match array.data() {
        ArrayData::Int64(v) => Some(v[row] as f64),
        ArrayData::Float64(v) => Some(v[row]),
        _ => None,
    }
}

/// Orders two non-null rows of the same array.
fn compare_rows(array: &Array, a: usize, b: usize) -> Ordering {
    match array.data() {
        ArrayData::Boolean(v) => v[a].cmp(&v[b]),
        ArrayData::Int64(v) => v[a].cmp(&v[b]),
        ArrayData::Float64(v) => total_cmp_f64(v[a], v[b]),
        ArrayData::Utf8(v) => v[a].cmp(&v[b]),
    }
}

/// Aggregate executor - groups rows by key columns and computes aggregates.
///
/// Output has one row per distinct key, in first-occurrence order: the key
/// columns first, then one column per aggregate. Without key columns the
/// whole input is one group and the output always has exactly one row.
pub struct AggregateExecutor {
    group_by: Vec<String>,
    aggregates: Vec<AggSpec>,
}

impl AggregateExecutor {
    /// Creates a new aggregate executor.
    pub fn new<S: Into<String>>(group_by: impl IntoIterator<Item = S>, aggregates: Vec<AggSpec>) -> Self {
        Self {
            group_by: group_by.into_iter().map(Into::into).collect(),
            aggregates,
        }
    }

    /// Creates an aggregate executor with no grouping.
    pub fn no_group(aggregates: Vec<AggSpec>) -> Self {
        Self {
            group_by: Vec::new(),
            aggregates,
        }
    }

    fn output_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::with_capacity(self.group_by.len() + self.aggregates.len());
        for name in self
            .group_by
            .iter()
            .cloned()
            .chain(self.aggregates.iter().map(AggSpec::output_name))
        {
            if names.contains(&name) {
                return Err(Error::duplicate_column(name));
            }
            names.push(name);
        }
        Ok(names)
    }
}

impl Operator for AggregateExecutor {
    fn execute(&self, input: &Batch) -> Result<Batch> {
        let names = self.output_names()?;

        let key_columns: Vec<&Column> = self
            .group_by
            .iter()
            .map(|name| input.column(name))
            .collect::<Result<_>>()?;
        let key_readers: Vec<KeyColumn<'_>> = key_columns
            .iter()
            .map(|&c| KeyColumn::new(c))
            .collect::<Result<_>>()?;
        let aggs: Vec<BoundAgg<'_>> = self
            .aggregates
            .iter()
            .map(|spec| BoundAgg::bind(spec, input))
            .collect::<Result<_>>()?;

        let n_aggs = aggs.len();
        let mut arena: Vec<AggState<'_>> = Vec::new();
        let mut first_rows: Vec<usize> = Vec::new();

        if key_readers.is_empty() {
            arena.extend(aggs.iter().map(BoundAgg::init));
            for row in 0..input.num_rows() {
                for (state, agg) in arena.iter_mut().zip(&aggs) {
                    agg.update(state, row);
                }
            }
        } else {
            let mut groups: HashMap<GroupKey<'_>, usize> = HashMap::new();
            for row in 0..input.num_rows() {
                let key = GroupKey::from_row(&key_readers, row);
                let next_id = first_rows.len();
                let group = *groups.entry(key).or_insert(next_id);
                if group == next_id {
                    first_rows.push(row);
                    arena.extend(aggs.iter().map(BoundAgg::init));
                }
                let states = &mut arena[group * n_aggs..(group + 1) * n_aggs];
                for (state, agg) in states.iter_mut().zip(&aggs) {
                    agg.update(state, row);
                }
            }
        }

        let n_groups = if key_readers.is_empty() { 1 } else { first_rows.len() };
        debug!(
            "aggregate: {} rows in, {} groups, {} aggregates",
            input.num_rows(),
            n_groups,
            n_aggs
        );

        let mut columns: Vec<Column> = key_columns.iter().map(|c| c.take(&first_rows)).collect();
        for (j, agg) in aggs.iter().enumerate() {
            let mut builder = ArrayBuilder::new(agg.output_type, n_groups);
            for group in 0..n_groups {
                builder.append_value(&agg.finalize(&arena[group * n_aggs + j]))?;
            }
            columns.push(Column::new(names[key_columns.len() + j].clone(), builder.finish()));
        }
        trace!("aggregate: finalized {} output columns", columns.len());

        Batch::try_new_with_rows(columns, n_groups)
    }
}
