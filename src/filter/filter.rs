use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, FilterData, FilterOrderInfo, SqlResult};

/// A parsed document query: where clause, ordering and limit.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a filter consisting only of a where clause
    pub fn from_where(conditions: Value) -> Result<Self, FilterError> {
        Self::new().where_clause(conditions)
    }

    pub fn assign(data: FilterData) -> Result<Self, FilterError> {
        let mut filter = Self::new();
        if let Some(where_clause) = data.where_clause {
            filter = filter.where_clause(where_clause)?;
        }
        if let Some(order) = data.order {
            filter = filter.order(order)?;
        }
        if let Some(limit) = data.limit {
            filter = filter.limit(limit)?;
        }
        Ok(filter)
    }

    pub fn where_clause(mut self, conditions: Value) -> Result<Self, FilterError> {
        self.conditions.extend(FilterWhere::parse(&conditions)?);
        Ok(self)
    }

    pub fn order(mut self, order_spec: Value) -> Result<Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn limit(mut self, limit: i64) -> Result<Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    /// WHERE predicate; `starting_param_index` accounts for parameters bound before it.
    pub fn to_where_sql(&self, starting_param_index: usize) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.conditions, starting_param_index);
        SqlResult { query, params }
    }

    /// ORDER BY and LIMIT tail, possibly empty
    pub fn to_tail_sql(&self) -> String {
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();
        [order_clause, limit_clause]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        FilterWhere::matches(&self.conditions, doc)
    }

    pub fn sort(&self, docs: &mut [Map<String, Value>]) {
        FilterOrder::sort(&self.order_data, docs);
    }
}
