use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Document, Snapshot};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    Eq { field: String, value: Value },
    /// The field is an array holding `value`.
    Contains { field: String, value: Value },
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => doc.get(field) == Some(value),
            Filter::Contains { field, value } => doc
                .get(field)
                .and_then(Value::as_array)
                .map_or(false, |items| items.contains(value)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Ascending sort key.
    #[serde(default)]
    pub order_by: Option<String>,
}

impl Query {
    pub fn collection(name: &str) -> Self {
        Self {
            collection: name.to_string(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn where_contains(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Contains {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn ordered_by(mut self, field: &str) -> Self {
        self.order_by = Some(field.to_string());
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|filter| filter.matches(doc))
    }

    /// Filters and orders `docs`. Input order is kept for ties, so callers
    /// should feed documents in id order.
    pub fn run<I>(&self, docs: I) -> Vec<Snapshot>
    where
        I: IntoIterator<Item = Snapshot>,
    {
        let mut hits: Vec<Snapshot> = docs.into_iter().filter(|s| self.matches(&s.data)).collect();
        if let Some(field) = &self.order_by {
            hits.sort_by(|a, b| compare_fields(a.data.get(field), b.data.get(field)));
        }
        hits
    }
}

// Missing fields sort first.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => string_key(a).cmp(&string_key(b)),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// Timestamps sort before plain text, chronologically; the raw text breaks ties.
fn string_key(s: &str) -> (bool, Option<DateTime<FixedOffset>>, &str) {
    let instant = DateTime::parse_from_rfc3339(s).ok();
    (instant.is_none(), instant, s)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snap(id: &str, body: Value) -> Snapshot {
        match body {
            Value::Object(data) => Snapshot::new(id, data),
            _ => unreachable!(),
        }
    }

    #[test]
    fn eq_and_contains_filters() {
        let docs = vec![
            snap("a", json!({ "city": "Boston, MA", "users": ["u1", "u2"] })),
            snap("b", json!({ "city": "Boston, MA", "users": ["u3"] })),
            snap("c", json!({ "city": "Denver, CO", "users": ["u1"] })),
        ];
        let query = Query::collection("matches")
            .where_eq("city", "Boston, MA")
            .where_contains("users", "u1");
        let ids: Vec<_> = query.run(docs).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn contains_on_non_array_is_false() {
        let doc = snap("a", json!({ "users": "u1" }));
        assert!(!Filter::Contains { field: "users".into(), value: json!("u1") }.matches(&doc.data));
    }

    #[test]
    fn orders_timestamps_chronologically() {
        let docs = vec![
            snap("late", json!({ "createdAt": "2024-05-01T10:00:00Z" })),
            snap("early", json!({ "createdAt": "2024-05-01T09:59:59.500Z" })),
            snap("pending", json!({})),
        ];
        let ids: Vec<_> = Query::collection("messages")
            .ordered_by("createdAt")
            .run(docs)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["pending", "early", "late"]);
    }

    #[test]
    fn mixed_values_sort_into_a_total_order() {
        let docs = vec![
            snap("text", json!({ "at": "soon" })),
            snap("offset", json!({ "at": "2024-05-01T12:00:00+02:00" })),
            snap("utc", json!({ "at": "2024-05-01T09:00:00Z" })),
            snap("number", json!({ "at": 7 })),
            snap("flag", json!({ "at": true })),
            snap("null", json!({ "at": null })),
            snap("list", json!({ "at": [1] })),
        ];
        let ids: Vec<_> = Query::collection("things")
            .ordered_by("at")
            .run(docs)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["null", "flag", "number", "utc", "offset", "text", "list"]);
    }
}
