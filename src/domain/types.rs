use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::http::method::HttpMethod;

pub const BODY_TYPE_NONE: &str = "none";
pub const BODY_TYPE_JSON: &str = "json";

// ─── Request Types ────────────────────────────────────────────────────────────

/// One header or query parameter row as edited in the request panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// Disabled rows and rows without a key are kept for editing only.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Vec<KeyValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: Vec<KeyValue>,
    #[serde(default)]
    pub body: String,
    /// Open tag: "none", "json", "raw", "form-data", ... Unknown tags are kept as-is.
    #[serde(default = "default_body_type")]
    pub body_type: String,
}

impl RequestData {
    pub fn new(id: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "New Request".into(),
            url: url.into(),
            method,
            headers: Vec::new(),
            params: Vec::new(),
            body: String::new(),
            body_type: default_body_type(),
        }
    }

    /// Whether the raw body goes on the wire for this method/body type pair.
    pub fn sends_body(&self) -> bool {
        self.method.allows_body() && self.body_type != BODY_TYPE_NONE
    }

    pub fn is_json(&self) -> bool {
        self.body_type == BODY_TYPE_JSON
    }

    pub fn active_headers(&self) -> impl Iterator<Item = &KeyValue> {
        self.headers.iter().filter(|header| header.is_active())
    }

    pub fn active_params(&self) -> impl Iterator<Item = &KeyValue> {
        self.params.iter().filter(|param| param.is_active())
    }
}

fn default_body_type() -> String {
    BODY_TYPE_NONE.to_string()
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Normalized result of one execution.
///
/// The body is held fully in memory; nothing bounds its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(rename = "time", default)]
    pub time_millis: i64,
    #[serde(rename = "size", default)]
    pub size_label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub content_type: String,
}

impl ResponseData {
    pub fn size_label(bytes: usize) -> String {
        format!("{bytes} B")
    }
}

// ─── Persisted Aggregates ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requests: Vec<RequestData>,
}

impl Collection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            requests: Vec::new(),
        }
    }

    pub fn find_request(&self, request_id: &str) -> Option<&RequestData> {
        self.requests.iter().find(|request| request.id == request_id)
    }
}

/// A past execution. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub request: RequestData,
    pub response: ResponseData,
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
}

/// Records written by older builds carry `null` for empty lists.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
