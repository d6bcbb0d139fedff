use serde::{Deserialize, Serialize};

/// A comparable column value. Variant order gives NULLs the highest rank,
/// matching PostgreSQL's default `ASC NULLS LAST`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Null,
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(v: Option<&str>) -> Self {
        match v {
            Some(s) => FieldValue::Text(s.to_string()),
            None => FieldValue::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$in")] In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Vec<FieldValue>,
}

impl FilterWhereInfo {
    /// Exact equality against one value, or against any of several
    pub fn equals_any(column: impl Into<String>, values: Vec<FieldValue>) -> Self {
        let operator = if values.len() == 1 { FilterOp::Eq } else { FilterOp::In };
        Self { column: column.into(), operator, data: values }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterData {
    pub where_clause: Vec<FilterWhereInfo>,
    pub order: Vec<FilterOrderInfo>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FieldValue>,
}

/// Column access for rows filtered in memory
pub trait FilterRow {
    /// Value of `column`, or `None` if the row has no such column
    fn field(&self, column: &str) -> Option<FieldValue>;
}
