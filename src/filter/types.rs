use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equality, or membership when the stored field is an array
    Eq,
    Ne,
    In,
    Exists,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub where_clause: Option<Value>,
    pub order: Option<Value>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    /// Dot-separated path into the document, e.g. `basicInfo.name`
    pub field: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub enum Condition {
    Field(FilterWhereInfo),
    And(Vec<Condition>),
    Or(Vec<Condition>),
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

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub field: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
