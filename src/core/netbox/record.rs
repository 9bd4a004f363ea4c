//! Shape-tolerant access to NetBox objects.
//!
//! NetBox does not serialize related objects uniformly: depending on the
//! endpoint, API version and `brief` mode a foreign key can arrive as a nested
//! object (`{"id": 3, "slug": "dc1", ...}`), a bare integer, or a numeric
//! string. List endpoints return either a paginated envelope or a bare array.
//! Everything that reads a field goes through [`FieldSource`] so that a raw
//! JSON mapping and a typed [`Record`] behave identically.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

use super::error::{NetBoxError, NetBoxResult};

/// Reference to a NetBox object: an integer ID or a human key (slug/name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ResourceRef {
    Id(i64),
    Key(String),
}

impl ResourceRef {
    /// Interpret a JSON value as a reference.
    ///
    /// Integers and all-digit strings are IDs; any other non-empty string is
    /// a key. Nested objects contribute their `id`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(id) = related_id(value) {
            return Some(Self::Id(id));
        }
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::Key(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl From<i64> for ResourceRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ResourceRef {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

/// Read-only field access over anything that looks like a NetBox object.
pub trait FieldSource {
    /// Raw value of a field, if present.
    fn field(&self, name: &str) -> Option<Cow<'_, Value>>;

    /// The object's own ID.
    fn id(&self) -> Option<i64> {
        self.field("id").and_then(|v| related_id(&v))
    }

    /// A field as a string (numbers are rendered).
    fn text(&self, name: &str) -> Option<String> {
        self.field(name).and_then(|v| match v.as_ref() {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// ID of a related object, whatever shape the relation arrived in.
    fn related_id(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(|v| related_id(&v))
    }

    /// Display label of a related object, falling back to its ID.
    fn related_label(&self, name: &str) -> Option<String> {
        self.field(name).and_then(|v| related_label(&v))
    }

    /// Best human label for the object itself.
    fn label(&self) -> String {
        ["display", "name", "address", "prefix", "model", "slug"]
            .iter()
            .find_map(|f| self.text(f))
            .or_else(|| self.id().map(|id| format!("#{id}")))
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}

impl FieldSource for Map<String, Value> {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).filter(|v| !v.is_null()).map(Cow::Borrowed)
    }
}

impl FieldSource for Value {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.as_object().and_then(|m| m.field(name))
    }
}

/// A typed view of a NetBox object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a JSON object.
    pub fn from_value(value: Value) -> NetBoxResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| NetBoxError::invalid_response(format!("not a NetBox object: {e}")))
    }
}

impl FieldSource for Record {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            "id" => Some(Cow::Owned(Value::from(self.id))),
            "display" => self.display.clone().map(|d| Cow::Owned(Value::String(d))),
            "url" => self.url.clone().map(|u| Cow::Owned(Value::String(u))),
            _ => self.fields.field(name),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    related_id(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {value}")))
}

/// Extract an ID from a related-field value of any supported shape.
pub fn related_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        Value::Object(map) => map.get("id").and_then(related_id),
        _ => None,
    }
}

fn related_label(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .label_field()
            .or_else(|| map.get("id").and_then(related_label)),
        Value::Number(n) => Some(format!("#{n}")),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

trait LabelField {
    fn label_field(&self) -> Option<String>;
}

impl LabelField for Map<String, Value> {
    fn label_field(&self) -> Option<String> {
        ["display", "name", "slug", "address", "model"]
            .iter()
            .find_map(|f| self.get(*f).and_then(Value::as_str).map(str::to_string))
    }
}

/// One page of a list response.
#[derive(Debug, Default)]
pub struct Page {
    pub results: Vec<Value>,
    pub next: Option<String>,
}

/// Split a list response into items and the next-page URL.
///
/// Accepts a paginated envelope, a bare array, or a single object.
pub fn parse_page(body: Value) -> NetBoxResult<Page> {
    match body {
        Value::Array(results) => Ok(Page {
            results,
            next: None,
        }),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(results)) => Ok(Page {
                results,
                next: map
                    .get("next")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            }),
            Some(other) => Err(NetBoxError::invalid_response(format!(
                "'results' is not an array: {other}"
            ))),
            None if map.contains_key("id") => Ok(Page {
                results: vec![Value::Object(map)],
                next: None,
            }),
            None => Err(NetBoxError::invalid_response(
                "list response has neither 'results' nor an object id",
            )),
        },
        other => Err(NetBoxError::invalid_response(format!(
            "unexpected list response: {other}"
        ))),
    }
}

/// Derive a NetBox slug from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
