//! Core domain types for the analytics bridge.
//!
//! This module defines:
//! - The dynamically-shaped values a host runtime passes in
//! - The canonical property document handed to the engine
//! - Events recorded by the reference engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Caller-side values
// ============================================================================

/// A loosely-typed value as received from the calling runtime
///
/// The host has a single numeric type, so every number arrives as `f64`.
#[derive(Clone, Debug, PartialEq)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Map(DynamicMap),
    Array(Vec<DynamicValue>),
}

/// An ordered key/value map from the calling runtime
///
/// Keys are optional because the host's map type does not rule out null keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DynamicMap {
    entries: Vec<(Option<String>, DynamicValue)>,
}

impl DynamicMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, replacing an earlier one with the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DynamicValue>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.as_deref() == Some(key.as_str()))
        {
            Some(slot) => slot.1 = value,
            None => self.entries.push((Some(key), value)),
        }
    }

    /// Builder-style variant of [`DynamicMap::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Append an entry without a key
    pub fn insert_null_key(&mut self, value: impl Into<DynamicValue>) {
        self.entries.push((None, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &DynamicValue)> {
        self.entries.iter().map(|(k, v)| (k.as_deref(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        DynamicValue::Number(v)
    }
}

impl From<i32> for DynamicValue {
    fn from(v: i32) -> Self {
        DynamicValue::Number(f64::from(v))
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::String(v.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::String(v)
    }
}

impl From<DynamicMap> for DynamicValue {
    fn from(v: DynamicMap) -> Self {
        DynamicValue::Map(v)
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(v: Vec<DynamicValue>) -> Self {
        DynamicValue::Array(v)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DynamicValue::Null, Into::into)
    }
}

/// JSON payloads from the host arrive with doubles only, like the runtime
impl From<serde_json::Value> for DynamicValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(DynamicValue::Null, DynamicValue::Number),
            serde_json::Value::String(s) => DynamicValue::String(s),
            serde_json::Value::Array(items) => {
                DynamicValue::Array(items.into_iter().map(DynamicValue::from).collect())
            }
            serde_json::Value::Object(map) => DynamicValue::Map(DynamicMap::from(map)),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for DynamicMap {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(k, v)| (Some(k), DynamicValue::from(v)))
                .collect(),
        }
    }
}

// ============================================================================
// Engine-side values
// ============================================================================

/// Canonical property document forwarded to the engine
///
/// Never contains explicit nulls; insertion order is preserved.
pub type PropertyDocument = serde_json::Map<String, serde_json::Value>;

/// What produced a tracked event
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Track,
    TimerEnd,
    ViewScreen,
    Installation,
    AppCrash,
}

/// An event as recorded by the reference engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackedEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub event: String,
    pub distinct_id: String,
    pub login_id: Option<String>,
    pub properties: PropertyDocument,
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut map = DynamicMap::new();
        assert!(map.is_empty());
        map.insert("a", 1);
        map.insert("b", "x");
        map.insert("a", 2);

        assert_eq!(map.len(), 2);
        assert!(!map.is_empty());
        assert_eq!(map.get("a"), Some(&DynamicValue::Number(2.0)));
    }

    #[test]
    fn test_from_json_keeps_order_and_shapes() {
        let value = DynamicValue::from(json!({
            "z": 1,
            "a": [true, null],
            "m": {"k": "v"}
        }));

        let DynamicValue::Map(map) = value else {
            panic!("expected map");
        };
        let keys: Vec<_> = map.iter().map(|(k, _)| k.unwrap().to_string()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(
            map.get("a"),
            Some(&DynamicValue::Array(vec![
                DynamicValue::Bool(true),
                DynamicValue::Null
            ]))
        );
    }

    #[test]
    fn test_option_into_dynamic_value() {
        let none: Option<&str> = None;
        assert_eq!(DynamicValue::from(none), DynamicValue::Null);
        assert_eq!(
            DynamicValue::from(Some("x")),
            DynamicValue::String("x".into())
        );
    }
}
