//! Expression AST definitions.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use strata_core::{Batch, Column, DataType, Error, Result, Schema, Value};

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // String
    Contains,
    StartsWith,
    EndsWith,
}

impl BinaryOp {
    /// Operator token used when rendering expressions.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Contains => "CONTAINS",
            BinaryOp::StartsWith => "STARTS WITH",
            BinaryOp::EndsWith => "ENDS WITH",
        }
    }

    /// Returns true for `Eq` through `Ge`.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Returns true for `And` and `Or`.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Returns true for the arithmetic operators.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    /// Returns true for the string predicates.
    pub fn is_string_predicate(&self) -> bool {
        matches!(
            self,
            BinaryOp::Contains | BinaryOp::StartsWith | BinaryOp::EndsWith
        )
    }

    /// Resolves the result type of this operator.
    ///
    /// `None` stands for an untyped null literal, which adopts whatever type
    /// the operator requires of it given the other operand.
    pub fn result_type(&self, left: Option<DataType>, right: Option<DataType>) -> Result<DataType> {
        let (l, r) = match (left, right) {
            (Some(l), Some(r)) => (l, r),
            (Some(t), None) | (None, Some(t)) => (t, t),
            (None, None) => {
                let t = self.default_operand_type();
                (t, t)
            }
        };

        if self.is_arithmetic() {
            return l
                .numeric_promotion(r)
                .ok_or_else(|| Error::incompatible_operands(self.symbol(), l, r));
        }

        let accepted = if self.is_comparison() {
            (l.is_numeric() && r.is_numeric()) || (l == r && !l.is_numeric())
        } else if self.is_logical() {
            l == DataType::Boolean && r == DataType::Boolean
        } else {
            l == DataType::Utf8 && r == DataType::Utf8
        };

        if accepted {
            Ok(DataType::Boolean)
        } else {
            Err(Error::incompatible_operands(self.symbol(), l, r))
        }
    }

    fn default_operand_type(&self) -> DataType {
        if self.is_arithmetic() {
            DataType::Int64
        } else if self.is_string_predicate() {
            DataType::Utf8
        } else {
            DataType::Boolean
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    IsNull,
    IsNotNull,
}

impl UnaryOp {
    /// Resolves the result type of this operator for an operand type.
    pub fn result_type(&self, operand: Option<DataType>) -> Result<DataType> {
        match (self, operand) {
            (UnaryOp::IsNull | UnaryOp::IsNotNull, _) => Ok(DataType::Boolean),
            (UnaryOp::Not, None | Some(DataType::Boolean)) => Ok(DataType::Boolean),
            (UnaryOp::Neg, None) => Ok(DataType::Int64),
            (UnaryOp::Neg, Some(t)) if t.is_numeric() => Ok(t),
            (op, Some(t)) => Err(Error::type_mismatch(alloc::format!(
                "cannot apply {:?} to {}",
                op, t
            ))),
        }
    }
}

/// Aggregate functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunc {
    /// Number of rows, nulls included.
    Count,
    /// Number of non-null values.
    CountNonNull,
    /// Number of distinct non-null values.
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    /// Population standard deviation.
    StdDev,
    /// Geometric mean of the positive values.
    GeoMean,
}

impl AggregateFunc {
    /// Lowercase name used as the output column prefix.
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "count",
            AggregateFunc::CountNonNull => "count_non_null",
            AggregateFunc::CountDistinct => "count_distinct",
            AggregateFunc::Sum => "sum",
            AggregateFunc::Avg => "avg",
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
            AggregateFunc::StdDev => "stddev",
            AggregateFunc::GeoMean => "geomean",
        }
    }

    /// Returns true if the function only accepts numeric input.
    pub fn requires_numeric(&self) -> bool {
        matches!(
            self,
            AggregateFunc::Sum | AggregateFunc::Avg | AggregateFunc::StdDev | AggregateFunc::GeoMean
        )
    }

    /// Output type for an input column of type `input`.
    pub fn result_type(&self, input: DataType) -> Result<DataType> {
        if self.requires_numeric() && !input.is_numeric() {
            return Err(Error::type_mismatch(alloc::format!(
                "{} requires a numeric column, got {}",
                self.name(),
                input
            )));
        }
        Ok(match self {
            AggregateFunc::Count | AggregateFunc::CountNonNull | AggregateFunc::CountDistinct => {
                DataType::Int64
            }
            AggregateFunc::Sum | AggregateFunc::Min | AggregateFunc::Max => input,
            AggregateFunc::Avg | AggregateFunc::StdDev | AggregateFunc::GeoMean => {
                DataType::Float64
            }
        })
    }
}

/// Expression AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Column reference by name.
    Column(String),
    /// Literal value. `Value::Null` is an untyped null.
    Literal(Value),
    /// Binary operation.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation.
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
}

/// References a column by name.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// Creates a literal.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// Creates an untyped null literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Value::Null)
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    /// Creates a binary expression.
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a unary expression.
    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::UnaryOp {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    pub fn not_eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Ne, other)
    }

    pub fn lt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    pub fn lt_eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Le, other)
    }

    pub fn gt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    pub fn gt_eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Ge, other)
    }

    pub fn and(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    pub fn add(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Add, other)
    }

    pub fn sub(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Sub, other)
    }

    pub fn mul(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Mul, other)
    }

    pub fn div(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Div, other)
    }

    pub fn modulo(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Mod, other)
    }

    /// Case-sensitive substring test.
    pub fn contains(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Contains, other)
    }

    pub fn starts_with(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::StartsWith, other)
    }

    pub fn ends_with(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::EndsWith, other)
    }

    pub fn not(self) -> Self {
        Self::unary(UnaryOp::Not, self)
    }

    pub fn neg(self) -> Self {
        Self::unary(UnaryOp::Neg, self)
    }

    pub fn is_null(self) -> Self {
        Self::unary(UnaryOp::IsNull, self)
    }

    pub fn is_not_null(self) -> Self {
        Self::unary(UnaryOp::IsNotNull, self)
    }

    /// Name given to the column this expression produces.
    ///
    /// A column reference keeps its name; anything else is named after its
    /// rendering, e.g. `(age > 20)`.
    pub fn output_name(&self) -> String {
        match self {
            Expr::Column(name) => name.clone(),
            other => other.to_string(),
        }
    }

    /// Names of the columns this expression reads, in first-reference order.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name.as_str());
                }
            }
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::UnaryOp { expr, .. } => expr.collect_columns(out),
        }
    }

    /// Infers the result type against `schema` without evaluating.
    ///
    /// Raises the same errors evaluation would. A standalone null literal is
    /// typed Boolean.
    pub fn data_type(&self, schema: &Schema) -> Result<DataType> {
        Ok(self.resolve_type(schema)?.unwrap_or(DataType::Boolean))
    }

    fn resolve_type(&self, schema: &Schema) -> Result<Option<DataType>> {
        match self {
            Expr::Column(name) => Ok(Some(schema.field(name)?.data_type())),
            Expr::Literal(value) => Ok(value.data_type()),
            Expr::BinaryOp { left, op, right } => {
                let l = left.resolve_type(schema)?;
                let r = right.resolve_type(schema)?;
                op.result_type(l, r).map(Some)
            }
            Expr::UnaryOp { op, expr } => op.result_type(expr.resolve_type(schema)?).map(Some),
        }
    }

    /// Evaluates the expression against `batch`, producing one value per row.
    pub fn evaluate(&self, batch: &Batch) -> Result<Column> {
        crate::executor::evaluate(self, batch)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => f.write_str(name),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::UnaryOp { op, expr } => match op {
                UnaryOp::Not => write!(f, "(NOT {})", expr),
                UnaryOp::Neg => write!(f, "(-{})", expr),
                UnaryOp::IsNull => write!(f, "({} IS NULL)", expr),
                UnaryOp::IsNotNull => write!(f, "({} IS NOT NULL)", expr),
            },
        }
    }
}

impl core::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Add, rhs)
    }
}

impl core::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Sub, rhs)
    }
}

impl core::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Mul, rhs)
    }
}

impl core::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Div, rhs)
    }
}

impl core::ops::Rem for Expr {
    type Output = Expr;

    fn rem(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Mod, rhs)
    }
}

impl core::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }
}

impl core::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}
