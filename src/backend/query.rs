//! Query filters for the managed document database.
//!
//! Queries serialize to the backend's JSON form, e.g.
//! `{"method":"equal","attribute":"owner","values":["abc"]}`, and can also be
//! evaluated in-process against a [`Document`] by the memory backend.

use std::cmp::Ordering;

use serde_json::{json, Value};

use super::Document;

/// A single filter, sort or limit clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Attribute equals any of the values.
    Equal {
        attribute: String,
        values: Vec<Value>,
    },
    /// Attribute contains any of the values (substring for strings, element for arrays).
    Contains {
        attribute: String,
        values: Vec<Value>,
    },
    /// Any of the nested queries matches.
    Or(Vec<Query>),
    /// Maximum number of documents returned.
    Limit(usize),
    /// Ascending sort on an attribute.
    OrderAsc(String),
    /// Descending sort on an attribute.
    OrderDesc(String),
}

impl Query {
    pub fn equal<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Equal {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Contains {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn or(queries: Vec<Query>) -> Self {
        Query::Or(queries)
    }

    pub fn limit(limit: usize) -> Self {
        Query::Limit(limit)
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Query::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    /// Whether this clause filters documents (as opposed to sorting or limiting).
    pub fn is_filter(&self) -> bool {
        matches!(self, Query::Equal { .. } | Query::Contains { .. } | Query::Or(_))
    }

    /// JSON representation understood by the backend.
    pub fn to_value(&self) -> Value {
        match self {
            Query::Equal { attribute, values } => {
                json!({ "method": "equal", "attribute": attribute, "values": values })
            }
            Query::Contains { attribute, values } => {
                json!({ "method": "contains", "attribute": attribute, "values": values })
            }
            Query::Or(queries) => {
                let nested: Vec<Value> = queries.iter().map(Query::to_value).collect();
                json!({ "method": "or", "values": nested })
            }
            Query::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
            Query::OrderAsc(attribute) => json!({ "method": "orderAsc", "attribute": attribute }),
            Query::OrderDesc(attribute) => {
                json!({ "method": "orderDesc", "attribute": attribute })
            }
        }
    }

    /// Serialized form used in `queries[]` request parameters.
    pub fn to_query_string(&self) -> String {
        self.to_value().to_string()
    }

    /// Evaluate a filter clause against a document.
    ///
    /// Sort and limit clauses always match.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Query::Equal { attribute, values } => match document.attribute(attribute) {
                Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
                Some(Value::Null) | None => false,
                Some(value) => values.contains(&value),
            },
            Query::Contains { attribute, values } => match document.attribute(attribute) {
                Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
                Some(Value::String(text)) => values
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|needle| text.contains(needle)),
                _ => false,
            },
            Query::Or(queries) => queries.iter().any(|q| q.matches(document)),
            Query::Limit(_) | Query::OrderAsc(_) | Query::OrderDesc(_) => true,
        }
    }
}

/// Compare two documents on an attribute; missing values sort last.
pub(crate) fn compare_attribute(a: &Document, b: &Document, attribute: &str) -> Ordering {
    match (a.attribute(attribute), b.attribute(attribute)) {
        (Some(x), Some(y)) => compare_values(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
