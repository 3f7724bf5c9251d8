//! # Documents, Writes and Queries
//!
//! The vocabulary shared by every adapter.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ collection "products"        │
//! │  ├── "sp-200w" → { … JSON }  │   Document { id, data }
//! │  └── "inv-1000va" → { … }    │
//! └──────────────────────────────┘
//!
//! commit([Write, Write, …])      all applied, or none
//!   Create     fails with AlreadyExists if the id is taken
//!   Set        replace the whole document
//!   Merge      replace top-level keys, keep the rest
//!   Delete     no-op when missing
//!   Decrement  field = max(0, field − by), no-op when missing
//!   Expect     writes nothing; fails the commit unless field == value
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Document
// =============================================================================

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Document {
            id: id.into(),
            data,
        }
    }

    /// Deserializes the document body.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Serializes `value` into a document body. Bodies must be JSON objects.
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Value> {
    let data = serde_json::to_value(value)?;
    if !data.is_object() {
        return Err(StoreError::Internal(
            "document body must be a JSON object".to_string(),
        ));
    }
    Ok(data)
}

/// Looks up a dotted path (`customer.phone`) inside a document body.
pub fn field<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |value, key| value.as_object()?.get(key))
}

/// Converts a dotted path into an SQLite JSON path (`$.customer.phone`).
pub(crate) fn json_path(path: &str) -> String {
    format!("$.{}", path)
}

/// Shallow merge: every top-level key of `patch` replaces the key in
/// `target`. A non-object target is replaced by an empty object first.
pub(crate) fn merge_shallow(target: &mut Value, patch: Value) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}

/// Checks a commit precondition against `existing`.
pub(crate) fn check_expected(
    existing: Option<&Value>,
    collection: &str,
    id: &str,
    path: &str,
    expected: &Value,
) -> StoreResult<()> {
    match existing.and_then(|doc| field(doc, path)) {
        Some(actual) if values_equal(actual, expected) => Ok(()),
        _ => Err(StoreError::PreconditionFailed {
            collection: collection.to_string(),
            id: id.to_string(),
            field: path.to_string(),
        }),
    }
}

/// `field = max(0, field − by)`. A missing or non-integer field counts as 0.
pub(crate) fn decrement_saturating(target: &mut Value, field_name: &str, by: i64) {
    let current = field(target, field_name).and_then(Value::as_i64).unwrap_or(0);
    let next = current.saturating_sub(by).max(0);
    if let Value::Object(map) = target {
        map.insert(field_name.to_string(), Value::from(next));
    }
}

// =============================================================================
// Writes
// =============================================================================

/// One operation inside an atomic commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Create {
        collection: String,
        id: String,
        data: Value,
    },
    Set {
        collection: String,
        id: String,
        data: Value,
    },
    Merge {
        collection: String,
        id: String,
        data: Value,
    },
    Delete {
        collection: String,
        id: String,
    },
    Decrement {
        collection: String,
        id: String,
        field: String,
        by: i64,
    },
    /// Precondition on the document as the commit sees it.
    Expect {
        collection: String,
        id: String,
        field: String,
        value: Value,
    },
}

impl Write {
    pub fn create(collection: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Write::Create {
            collection: collection.into(),
            id: id.into(),
            data,
        }
    }

    pub fn set(collection: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Write::Set {
            collection: collection.into(),
            id: id.into(),
            data,
        }
    }

    pub fn merge(collection: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        Write::Merge {
            collection: collection.into(),
            id: id.into(),
            data,
        }
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Write::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn decrement(
        collection: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
        by: i64,
    ) -> Self {
        Write::Decrement {
            collection: collection.into(),
            id: id.into(),
            field: field.into(),
            by,
        }
    }

    /// Fails the whole commit with `PreconditionFailed` unless `field`
    /// currently equals `value`.
    pub fn expect(
        collection: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Write::Expect {
            collection: collection.into(),
            id: id.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Write::Create { collection, .. }
            | Write::Set { collection, .. }
            | Write::Merge { collection, .. }
            | Write::Delete { collection, .. }
            | Write::Decrement { collection, .. }
            | Write::Expect { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Write::Create { id, .. }
            | Write::Set { id, .. }
            | Write::Merge { id, .. }
            | Write::Delete { id, .. }
            | Write::Decrement { id, .. }
            | Write::Expect { id, .. } => id,
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Equality filters on dotted paths, an optional ordering and a limit.
///
/// ## Example
/// ```rust
/// use volta_store::{Direction, Query};
///
/// let query = Query::collection("sales")
///     .where_eq("customer.phone", "01711000000")
///     .order_by("date", Direction::Descending)
///     .limit(20);
/// assert_eq!(query.filters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Query {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((path.into(), value.into()));
        self
    }

    pub fn order_by(mut self, path: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((path.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every filter matches. A `null` filter also matches a
    /// missing field.
    pub fn matches(&self, data: &Value) -> bool {
        self.filters.iter().all(|(path, expected)| match field(data, path) {
            Some(actual) => values_equal(actual, expected),
            None => expected.is_null(),
        })
    }

    /// Applies ordering and limit to already-filtered documents.
    pub(crate) fn finish(&self, mut docs: Vec<Document>) -> Vec<Document> {
        if let Some((path, direction)) = &self.order_by {
            docs.sort_by(|a, b| {
                let ordering = compare_values(field(&a.data, path), field(&b.data, path));
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
        docs
    }
}

/// Numbers compare by value, so `1` equals `1.0`.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Missing < null < bool < number < string; other types compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// =============================================================================
// Change events
// =============================================================================

/// What a collection subscriber receives after each committed write.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Upserted { id: String, data: Value },
    Removed { id: String },
}

impl ChangeEvent {
    pub fn id(&self) -> &str {
        match self {
            ChangeEvent::Upserted { id, .. } | ChangeEvent::Removed { id } => id,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_dotted_path() {
        let doc = json!({"customer": {"phone": "01711000000"}, "total": 5});
        assert_eq!(field(&doc, "customer.phone"), Some(&json!("01711000000")));
        assert_eq!(field(&doc, "total"), Some(&json!(5)));
        assert_eq!(field(&doc, "customer.name"), None);
        assert_eq!(field(&doc, "total.value"), None);
    }

    #[test]
    fn test_merge_shallow() {
        let mut doc = json!({"name": "Karim", "address": "Mirpur"});
        merge_shallow(&mut doc, json!({"address": "Uttara", "email": "k@x.com"}));
        assert_eq!(doc, json!({"name": "Karim", "address": "Uttara", "email": "k@x.com"}));
    }

    #[test]
    fn test_decrement_saturates() {
        let mut doc = json!({"stock": 3});
        decrement_saturating(&mut doc, "stock", 2);
        assert_eq!(doc["stock"], 1);
        decrement_saturating(&mut doc, "stock", 5);
        assert_eq!(doc["stock"], 0);

        let mut doc = json!({});
        decrement_saturating(&mut doc, "stock", 1);
        assert_eq!(doc["stock"], 0);
    }

    #[test]
    fn test_query_matches_and_orders() {
        let query = Query::collection("sales")
            .where_eq("status", "Pending")
            .order_by("date", Direction::Descending)
            .limit(2);

        let docs = vec![
            Document::new("a", json!({"status": "Pending", "date": 1})),
            Document::new("b", json!({"status": "Pending", "date": 3})),
            Document::new("c", json!({"status": "Pending", "date": 2})),
            Document::new("d", json!({"status": "Delivered", "date": 4})),
        ];
        let matching: Vec<Document> = docs.into_iter().filter(|d| query.matches(&d.data)).collect();
        let ids: Vec<String> = query.finish(matching).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_numeric_equality() {
        let query = Query::collection("products").where_eq("stock", 1);
        assert!(query.matches(&json!({"stock": 1.0})));
        assert!(!query.matches(&json!({"stock": 2})));

        let missing = Query::collection("users").where_eq("email", Value::Null);
        assert!(missing.matches(&json!({"name": "x"})));
    }

    #[test]
    fn test_encode_requires_object() {
        assert!(encode(&json!({"a": 1})).is_ok());
        assert!(encode(&5).is_err());
    }
}
