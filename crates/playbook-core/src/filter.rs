//! Playground filter builder.
//!
//! Filters are built row by row in the query panel and combined into the JSON
//! filter object a search request carries:
//!
//! - one clause is `{"@eq": {"CATEGORY": "Sales"}}`
//! - a negated clause is wrapped as `{"@not": <clause>}`
//! - several clauses are combined as `{"@and": [...]}` or `{"@or": [...]}`
//! - no clauses means no filter at all

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::search::ResultRow;

/// Columns offered in the filter builder.
pub const FILTER_COLUMNS: &[&str] = &["CATEGORY", "BRAND", "PRICE", "RATING"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "@eq")]
    Eq,
    #[serde(rename = "@contains")]
    Contains,
    #[serde(rename = "@gte")]
    Gte,
    #[serde(rename = "@lte")]
    Lte,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "@eq",
            FilterOp::Contains => "@contains",
            FilterOp::Gte => "@gte",
            FilterOp::Lte => "@lte",
        }
    }
}

impl FromStr for FilterOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('@') {
            "eq" => Ok(FilterOp::Eq),
            "contains" => Ok(FilterOp::Contains),
            "gte" => Ok(FilterOp::Gte),
            "lte" => Ok(FilterOp::Lte),
            _ => bail!(
                "Unknown filter operator: '{}'. Must be @eq, @contains, @gte, or @lte.",
                s
            ),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    #[default]
    #[serde(rename = "@and")]
    And,
    #[serde(rename = "@or")]
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "@and",
            LogicalOp::Or => "@or",
        }
    }
}

impl FromStr for LogicalOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('@') {
            "and" => Ok(LogicalOp::And),
            "or" => Ok(LogicalOp::Or),
            _ => bail!("Unknown logical operator: '{}'. Must be @and or @or.", s),
        }
    }
}

/// One row of the filter builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
    #[serde(default)]
    pub negate: bool,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
            negate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Parse `COLUMN:@op:value`, with a leading `!` for negation.
    pub fn parse(s: &str) -> Result<Filter> {
        let (negate, body) = match s.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut parts = body.splitn(3, ':');
        let (Some(column), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("filter must look like COLUMN:@op:value, got '{}'", s);
        };
        if column.is_empty() {
            bail!("filter column is empty in '{}'", s);
        }
        Ok(Filter {
            column: column.to_string(),
            op: op.parse()?,
            value: value.to_string(),
            negate,
        })
    }

    /// The JSON clause for this row.
    pub fn clause(&self) -> Value {
        let mut inner = Map::new();
        inner.insert(self.column.clone(), Value::String(self.value.clone()));
        let mut outer = Map::new();
        outer.insert(self.op.as_str().to_string(), Value::Object(inner));
        let clause = Value::Object(outer);
        if self.negate {
            json!({ "@not": clause })
        } else {
            clause
        }
    }

    /// Whether a result row passes this filter. A row without the column
    /// never matches (and so always passes a negated filter).
    pub fn matches(&self, row: &ResultRow) -> bool {
        let hit = match row.column(&self.column) {
            Some(actual) => compare(self.op, &actual, &self.value),
            None => false,
        };
        hit != self.negate
    }
}

fn compare(op: FilterOp, actual: &str, expected: &str) -> bool {
    match op {
        FilterOp::Eq => match (actual.parse::<f64>(), expected.parse::<f64>()) {
            (Ok(a), Ok(b)) => a == b,
            _ => actual == expected,
        },
        FilterOp::Contains => actual.to_lowercase().contains(&expected.to_lowercase()),
        FilterOp::Gte | FilterOp::Lte => match (actual.parse::<f64>(), expected.parse::<f64>()) {
            (Ok(a), Ok(b)) if op == FilterOp::Gte => a >= b,
            (Ok(a), Ok(b)) => a <= b,
            _ => false,
        },
    }
}

/// Combine filter rows into one filter object, or `None` when there are none.
pub fn build_filter(filters: &[Filter], logical: LogicalOp) -> Option<Value> {
    match filters {
        [] => None,
        [single] => Some(single.clause()),
        many => {
            let clauses: Vec<Value> = many.iter().map(Filter::clause).collect();
            let mut combined = Map::new();
            combined.insert(logical.as_str().to_string(), Value::Array(clauses));
            Some(Value::Object(combined))
        }
    }
}

/// Whether a row passes the combined filters. No filters pass everything.
pub fn matches_all(filters: &[Filter], logical: LogicalOp, row: &ResultRow) -> bool {
    if filters.is_empty() {
        return true;
    }
    match logical {
        LogicalOp::And => filters.iter().all(|f| f.matches(row)),
        LogicalOp::Or => filters.iter().any(|f| f.matches(row)),
    }
}
