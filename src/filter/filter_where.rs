use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{Condition, FilterOp, FilterWhereInfo};

/// Parses Mongo-style where clauses and renders them either as JSONB SQL
/// over the `body` column or as an in-memory predicate.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn parse(where_data: &Value) -> Result<Vec<Condition>, FilterError> {
        match where_data {
            Value::Null => Ok(vec![]),
            Value::Object(obj) => {
                let mut conditions = Vec::with_capacity(obj.len());
                for (key, value) in obj {
                    if key.starts_with('$') {
                        conditions.push(Self::parse_logical_operator(key, value)?);
                    } else {
                        Self::validate_field(key)?;
                        conditions.extend(Self::parse_field_condition(key, value)?);
                    }
                }
                Ok(conditions)
            }
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_logical_operator(op: &str, value: &Value) -> Result<Condition, FilterError> {
        let arr = value
            .as_array()
            .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
        let mut branches = Vec::with_capacity(arr.len());
        for v in arr {
            branches.push(Condition::And(Self::parse(v)?));
        }
        match op {
            "$and" => Ok(Condition::And(branches)),
            "$or" => Ok(Condition::Or(branches)),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<Condition>, FilterError> {
        match value {
            Value::Object(obj) if obj.keys().any(|k| k.starts_with('$')) => {
                let mut out = Vec::with_capacity(obj.len());
                for (op_key, op_val) in obj {
                    let operator = Self::map_operator(op_key)?;
                    match operator {
                        FilterOp::In if !op_val.is_array() => {
                            return Err(FilterError::InvalidOperatorData("$in requires array".to_string()))
                        }
                        FilterOp::Exists if !op_val.is_boolean() => {
                            return Err(FilterError::InvalidOperatorData("$exists requires boolean".to_string()))
                        }
                        _ => {}
                    }
                    out.push(Condition::Field(FilterWhereInfo {
                        field: field.to_string(),
                        operator,
                        data: op_val.clone(),
                    }));
                }
                Ok(out)
            }
            // Implicit equality: { field: value }
            _ => Ok(vec![Condition::Field(FilterWhereInfo {
                field: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            })]),
        }
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$in" => FilterOp::In,
            "$exists" => FilterOp::Exists,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn validate_field(field: &str) -> Result<(), FilterError> {
        let valid = !field.is_empty()
            && field.split('.').all(|segment| {
                !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidField(field.to_string()))
        }
    }

    /// Render conditions as a SQL predicate; parameters are numbered after `starting_param_index`.
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build_all(conditions, " AND ");
        (sql, filter_where.param_values)
    }

    fn build_all(&mut self, conditions: &[Condition], joiner: &str) -> String {
        if conditions.is_empty() {
            return "1=1".to_string();
        }
        let parts: Vec<String> = conditions.iter().map(|c| self.build_condition(c)).collect();
        parts.join(joiner)
    }

    fn build_condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Field(info) => self.build_field_condition(info),
            Condition::And(items) => format!("({})", self.build_all(items, " AND ")),
            Condition::Or(items) => {
                if items.is_empty() {
                    "1=0".to_string()
                } else {
                    format!("({})", self.build_all(items, " OR "))
                }
            }
        }
    }

    fn build_field_condition(&mut self, info: &FilterWhereInfo) -> String {
        let column = Self::field_sql(&info.field);
        match info.operator {
            FilterOp::Eq => self.eq_sql(&info.field, &column, &info.data),
            FilterOp::Ne => match &info.data {
                Value::Null => Self::present_sql(&column),
                Value::Array(_) | Value::Object(_) => {
                    format!("{} IS DISTINCT FROM {}", column, self.param(info.data.clone()))
                }
                _ => format!("NOT COALESCE({} @> {}, false)", column, self.param(info.data.clone())),
            },
            FilterOp::In => match &info.data {
                Value::Array(values) if !values.is_empty() => {
                    let parts: Vec<String> = values.iter().map(|v| self.eq_sql(&info.field, &column, v)).collect();
                    format!("({})", parts.join(" OR "))
                }
                _ => "1=0".to_string(),
            },
            FilterOp::Exists => {
                if info.data.as_bool().unwrap_or(true) {
                    Self::present_sql(&column)
                } else {
                    Self::absent_sql(&column)
                }
            }
        }
    }

    fn eq_sql(&mut self, field: &str, column: &str, data: &Value) -> String {
        match data {
            // The `id` column mirrors `body->>'id'` and is part of the primary key
            Value::String(_) if field == "id" => format!("id = ({} #>> '{{}}')", self.param(data.clone())),
            Value::Null => Self::absent_sql(column),
            Value::Array(_) | Value::Object(_) => format!("{} = {}", column, self.param(data.clone())),
            // jsonb containment covers both scalar equality and array membership
            _ => format!("COALESCE({} @> {}, false)", column, self.param(data.clone())),
        }
    }

    fn present_sql(column: &str) -> String {
        format!("({} IS NOT NULL AND {} <> 'null'::jsonb)", column, column)
    }

    fn absent_sql(column: &str) -> String {
        format!("({} IS NULL OR {} = 'null'::jsonb)", column, column)
    }

    /// Field names are validated to `[A-Za-z0-9_.]` before reaching this point.
    pub(crate) fn field_sql(field: &str) -> String {
        if field.contains('.') {
            format!("body #> '{{{}}}'", field.replace('.', ","))
        } else {
            format!("body->'{}'", field)
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    pub fn matches(conditions: &[Condition], doc: &Map<String, Value>) -> bool {
        conditions.iter().all(|c| Self::matches_condition(c, doc))
    }

    fn matches_condition(condition: &Condition, doc: &Map<String, Value>) -> bool {
        match condition {
            Condition::And(items) => items.iter().all(|c| Self::matches_condition(c, doc)),
            Condition::Or(items) => items.iter().any(|c| Self::matches_condition(c, doc)),
            Condition::Field(info) => {
                let value = lookup(doc, &info.field);
                match info.operator {
                    FilterOp::Eq => value_matches(value, &info.data),
                    FilterOp::Ne => !value_matches(value, &info.data),
                    FilterOp::In => info
                        .data
                        .as_array()
                        .map(|values| values.iter().any(|v| value_matches(value, v)))
                        .unwrap_or(false),
                    FilterOp::Exists => {
                        let present = !matches!(value, None | Some(Value::Null));
                        present == info.data.as_bool().unwrap_or(true)
                    }
                }
            }
        }
    }
}

/// Resolve a dot-separated path inside a document
pub fn lookup<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn value_matches(value: Option<&Value>, expected: &Value) -> bool {
    match (value, expected) {
        (None | Some(Value::Null), Value::Null) => true,
        (None, _) => false,
        (Some(Value::Array(items)), expected) if !expected.is_array() => {
            items.iter().any(|item| json_eq(item, expected))
        }
        (Some(actual), expected) => json_eq(actual, expected),
    }
}

pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
