//! Partial document writes.
//!
//! A [`Patch`] only ever carries fields that are present: optional values are
//! dropped when the patch is built, so a write never stores nulls in place of
//! absent fields.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Document;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldOp {
    Set(Value),
    /// Append each value not already in the array, creating it if needed.
    Union(Vec<Value>),
    /// Replaced by the store's clock when the write lands.
    ServerTimestamp,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Patch(BTreeMap<String, FieldOp>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), FieldOp::Set(value.into()));
        self
    }

    pub fn set_opt<V: Into<Value>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(field, value),
            None => self,
        }
    }

    pub fn set_serialized<T: Serialize>(self, field: &str, value: &T) -> serde_json::Result<Self> {
        Ok(self.set(field, serde_json::to_value(value)?))
    }

    pub fn union<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.0.insert(field.to_string(), FieldOp::Union(values));
        self
    }

    pub fn server_timestamp(mut self, field: &str) -> Self {
        self.0.insert(field.to_string(), FieldOp::ServerTimestamp);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldOp> {
        self.0.get(field)
    }

    pub fn apply(&self, doc: &mut Document, now: DateTime<Utc>) {
        for (field, op) in &self.0 {
            match op {
                FieldOp::Set(value) => {
                    doc.insert(field.clone(), value.clone());
                }
                FieldOp::Union(values) => {
                    let entry = doc
                        .entry(field.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if !entry.is_array() {
                        *entry = Value::Array(Vec::new());
                    }
                    if let Value::Array(items) = entry {
                        for value in values {
                            if !items.contains(value) {
                                items.push(value.clone());
                            }
                        }
                    }
                }
                FieldOp::ServerTimestamp => {
                    doc.insert(field.clone(), timestamp_value(now));
                }
            }
        }
    }

    /// Builds a fresh document from this patch alone.
    pub fn into_document(&self, now: DateTime<Utc>) -> Document {
        let mut doc = Document::new();
        self.apply(&mut doc, now);
        doc
    }
}

impl From<Document> for Patch {
    fn from(doc: Document) -> Self {
        Self(doc.into_iter().map(|(k, v)| (k, FieldOp::Set(v))).collect())
    }
}

/// Fixed-width RFC 3339 so stored timestamps also sort as strings.
pub fn timestamp_value(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_opt_skips_absent_values() {
        let patch = Patch::new()
            .set("name", "Sam")
            .set_opt("igCaption", None::<String>)
            .set_opt("age", Some(21));
        let doc = patch.into_document(Utc::now());
        assert_eq!(doc.len(), 2);
        assert!(!doc.contains_key("igCaption"));
        assert_eq!(doc["age"], json!(21));
    }

    #[test]
    fn union_appends_without_duplicates() {
        let mut doc = Document::new();
        doc.insert(String::from("likes"), json!(["a"]));
        Patch::new().union("likes", ["a", "b"]).apply(&mut doc, Utc::now());
        Patch::new().union("likes", ["b", "c"]).apply(&mut doc, Utc::now());
        assert_eq!(doc["likes"], json!(["a", "b", "c"]));
    }

    #[test]
    fn union_creates_missing_array() {
        let mut doc = Document::new();
        Patch::new().union("dislikes", ["x"]).apply(&mut doc, Utc::now());
        assert_eq!(doc["dislikes"], json!(["x"]));
    }

    #[test]
    fn server_timestamp_uses_store_clock() {
        let now = Utc::now();
        let doc = Patch::new().server_timestamp("createdAt").into_document(now);
        let stored: DateTime<Utc> = serde_json::from_value(doc["createdAt"].clone()).unwrap();
        assert_eq!(stored.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn wire_format() {
        let patch = Patch::new().set("read", false).server_timestamp("createdAt");
        let wire = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            wire,
            json!({
                "createdAt": { "op": "server_timestamp" },
                "read": { "op": "set", "value": false },
            })
        );
        let back: Patch = serde_json::from_value(wire).unwrap();
        assert_eq!(back, patch);
    }
}
