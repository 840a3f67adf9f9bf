use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::error::FilterError;
use super::filter_where::{lookup, FilterWhere};
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let infos = match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Expect array of strings like ["createdAt desc", "name asc"]
                let mut out = Vec::new();
                for v in arr {
                    if let Value::String(s) = v {
                        out.extend(Self::parse_order_string(s));
                    }
                }
                out
            }
            Value::Object(obj) => {
                // { "createdAt": "desc", "name": "asc" } or { "name": 1 }
                obj.iter()
                    .map(|(k, v)| {
                        let desc = match v {
                            Value::String(s) => s.eq_ignore_ascii_case("desc"),
                            Value::Number(n) => n.as_i64() == Some(-1),
                            _ => false,
                        };
                        FilterOrderInfo {
                            field: k.clone(),
                            sort: if desc { SortDirection::Desc } else { SortDirection::Asc },
                        }
                    })
                    .collect()
            }
            _ => vec![],
        };

        for info in &infos {
            if !info
                .field
                .split('.')
                .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            {
                return Err(FilterError::InvalidField(info.field.clone()));
            }
        }
        Ok(infos)
    }

    fn parse_order_string(s: &str) -> Vec<FilterOrderInfo> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let mut it = part.split_whitespace();
            if let Some(field) = it.next() {
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") { SortDirection::Desc } else { SortDirection::Asc };
                out.push(FilterOrderInfo { field: field.to_string(), sort });
            }
        }
        out
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", FilterWhere::field_sql(&i.field), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Stable in-memory sort matching the SQL ordering for strings and numbers
    pub fn sort(infos: &[FilterOrderInfo], docs: &mut [Map<String, Value>]) {
        if infos.is_empty() {
            return;
        }
        docs.sort_by(|a, b| {
            for info in infos {
                let ordering = compare(lookup(a, &info.field), lookup(b, &info.field));
                let ordering = match info.sort {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
