use crate::types::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
    },
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    },
    Select(Query),
    Update {
        table: String,
        assignments: Vec<(String, Value)>,
        filter: Option<Predicate>,
    },
    Delete {
        from: String,
        filter: Option<Predicate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// Everything after the column name, as written
    pub type_name: String,
    pub primary_key: bool,
}

/// One or more SELECTs joined by set operators, evaluated left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub head: SelectStatement,
    pub chain: Vec<(SetOperator, SelectStatement)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    pub source: Source,
    pub filter: Option<Predicate>,
    pub group_by: Option<Vec<String>>,
    pub having: Option<Predicate>,
    pub order_by: Vec<(String, SortOrder)>,
    pub limit: Option<Limit>,
}

impl SelectStatement {
    #[must_use]
    pub fn is_select_all(&self) -> bool {
        self.columns.iter().any(|c| matches!(c, SelectColumn::Wildcard))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(String),
    Join(JoinClause),
    Derived { query: Box<Query>, alias: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub left: String,
    pub join_type: JoinType,
    pub right: String,
    /// `ON a.x = b.y` as written; `None` only for CROSS JOIN
    pub on: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    Wildcard,
    Expr {
        expr: Expression,
        alias: Option<String>,
    },
}

impl SelectColumn {
    /// Key of the projected field in the output row
    #[must_use]
    pub fn output_name(&self) -> String {
        match self {
            Self::Wildcard => "*".to_string(),
            Self::Expr { alias: Some(alias), .. } => alias.clone(),
            Self::Expr { expr, .. } => expr.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(String),
    Aggregate(AggregateFunction),
    Scalar(ScalarFunction),
    Literal(Value),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => write!(f, "{name}"),
            Self::Aggregate(agg) => write!(f, "{agg}"),
            Self::Scalar(func) => write!(f, "{func}"),
            Self::Literal(value) => write!(f, "{}", value.to_literal()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count(CountTarget),
    Sum(String),
    Avg(String),
    Min(String),
    Max(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CountTarget {
    All,
    Column(String),
}

/// Canonical text, which is also the key of the aggregate in grouped rows
impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(CountTarget::All) => write!(f, "COUNT(*)"),
            Self::Count(CountTarget::Column(col)) => write!(f, "COUNT({col})"),
            Self::Sum(col) => write!(f, "SUM({col})"),
            Self::Avg(col) => write!(f, "AVG({col})"),
            Self::Min(col) => write!(f, "MIN({col})"),
            Self::Max(col) => write!(f, "MAX({col})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarFunction {
    Upper(String),
    Lower(String),
    Length(String),
    Abs(String),
    Round(String),
}

impl fmt::Display for ScalarFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper(col) => write!(f, "UPPER({col})"),
            Self::Lower(col) => write!(f, "LOWER({col})"),
            Self::Length(col) => write!(f, "LENGTH({col})"),
            Self::Abs(col) => write!(f, "ABS({col})"),
            Self::Round(col) => write!(f, "ROUND({col})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// WHERE/HAVING condition: a flat chain folded strictly left to right.
///
/// `a OR b AND c` means `(a OR b) AND c`; AND does not bind tighter than OR.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub first: Condition,
    pub rest: Vec<(Connective, Condition)>,
}

impl Predicate {
    #[must_use]
    pub const fn single(condition: Condition) -> Self {
        Self {
            first: condition,
            rest: Vec::new(),
        }
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, c)| c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        left: Operand,
        op: CompareOp,
        operand: Operand,
    },
    Like {
        left: Operand,
        pattern: String,
        negated: bool,
    },
    Between {
        left: Operand,
        low: Value,
        high: Value,
    },
    In {
        left: Operand,
        set: InSet,
        negated: bool,
    },
    IsNull {
        left: Operand,
        negated: bool,
    },
    Exists {
        subquery: Subquery,
        negated: bool,
    },
}

impl Condition {
    /// Left-hand column (or aggregate text) the condition reads, if any
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Compare { left, .. }
            | Self::Like { left, .. }
            | Self::Between { left, .. }
            | Self::In { left, .. }
            | Self::IsNull { left, .. } => match left {
                Operand::Column(column) => Some(column),
                Operand::Literal(_) | Operand::Subquery(_) => None,
            },
            Self::Exists { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Column(String),
    Subquery(Subquery),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InSet {
    List(Vec<Value>),
    Subquery(Subquery),
}

/// Nested SELECT kept as text; it is bound against the outer row and parsed
/// when evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subquery {
    pub sql: String,
}

impl Subquery {
    #[must_use]
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.trim().to_string(),
        }
    }
}
