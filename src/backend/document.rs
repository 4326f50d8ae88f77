//! Wire types shared by the backend implementations.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document stored in the managed database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// User-defined attributes.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Drop backend bookkeeping fields (`$collectionId`, `$permissions`, ...)
    /// that were captured by the flattened attribute map.
    pub fn strip_system_fields(mut self) -> Self {
        self.data.retain(|key, _| !key.starts_with('$'));
        self
    }

    /// Look up an attribute, including the `$id`/`$createdAt`/`$updatedAt` system fields.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "$id" => Some(Value::String(self.id.clone())),
            "$createdAt" => Some(Value::String(timestamp(&self.created_at))),
            "$updatedAt" => Some(Value::String(timestamp(&self.updated_at))),
            _ => self.data.get(name).cloned(),
        }
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// String attribute, empty when missing or null.
    pub fn string_or_empty(&self, name: &str) -> String {
        self.str_field(name).unwrap_or_default().to_string()
    }

    pub fn bool_field(&self, name: &str) -> bool {
        self.data.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn u64_field(&self, name: &str) -> u64 {
        self.data.get(name).and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn string_list(&self, name: &str) -> Vec<String> {
        self.data
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Result of a list query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

/// Metadata of an object in the storage bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "sizeOriginal")]
    pub size_original: u64,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
}

/// Account known to the backend's auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Backend timestamp format (RFC 3339, millisecond precision).
pub fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, false)
}
