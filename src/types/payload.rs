//! The flat, string-keyed request payload sent as `jData`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// A request payload.
///
/// Scalars are stored as JSON strings because the service expects every
/// numeric field stringified. Optional fields are simply not inserted when
/// absent, so an omitted field never turns into an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// An empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert `value` stringified.
    pub fn insert(&mut self, key: &str, value: impl ToString) {
        self.0
            .insert(key.to_owned(), Value::String(value.to_string()));
    }

    /// Insert `value` stringified if present.
    pub fn insert_opt<T: ToString>(&mut self, key: &str, value: Option<T>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    /// Insert `value` percent-encoded (for free-text fields such as trading
    /// symbols and search text).
    pub fn insert_encoded(&mut self, key: &str, value: &str) {
        self.insert(key, percent_encode(value));
    }

    /// Insert a structured JSON value as-is.
    pub fn insert_value(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_owned(), value);
    }

    /// The string value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to the JSON text sent as `jData`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

/// Form-style percent encoding: spaces become `+`, everything outside
/// `[A-Za-z0-9_.~-]` is `%XX`-escaped.
///
/// `form_urlencoded` keeps `*` and escapes `~`; the service expects the
/// reverse, so both are patched up here.
pub fn percent_encode(text: &str) -> String {
    text.split('~')
        .map(|part| {
            url::form_urlencoded::byte_serialize(part.as_bytes())
                .collect::<String>()
                .replace('*', "%2A")
        })
        .collect::<Vec<_>>()
        .join("~")
}
