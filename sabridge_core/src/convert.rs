//! Conversion of caller-supplied dynamic maps into property documents.
//!
//! Rules applied at every nesting level:
//! - entries without a key are skipped
//! - entries whose value is null are omitted
//! - an entry that fails to convert is logged and dropped, the rest survive

use crate::logging::LOG_TAG;
use crate::{DynamicMap, DynamicValue, Error, PropertyDocument, Result};
use once_cell::sync::Lazy;
use serde_json::{Number, Value};

static DEFAULT_CONVERTER: Lazy<PropertyConverter> = Lazy::new(PropertyConverter::default);

/// Convert with the default nesting limit
pub fn convert(raw: Option<&DynamicMap>) -> Option<PropertyDocument> {
    DEFAULT_CONVERTER.convert(raw)
}

/// Turn a host-runtime double into a JSON number
///
/// Integral values that fit in an `i64` become integers so ids such as
/// `123456` reach the engine unchanged.
pub fn number_from_f64(value: f64) -> Option<Number> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

/// Recursive, null-dropping converter
#[derive(Clone, Debug)]
pub struct PropertyConverter {
    max_depth: usize,
}

impl Default for PropertyConverter {
    fn default() -> Self {
        Self { max_depth: 16 }
    }
}

impl PropertyConverter {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// `None` in, `None` out; otherwise a fresh document
    pub fn convert(&self, raw: Option<&DynamicMap>) -> Option<PropertyDocument> {
        raw.map(|map| self.convert_map(map, 1))
    }

    fn convert_map(&self, map: &DynamicMap, depth: usize) -> PropertyDocument {
        let mut doc = PropertyDocument::new();
        for (key, value) in map.iter() {
            let Some(key) = key else {
                tracing::debug!(target: LOG_TAG, "Skipping property entry without a key");
                continue;
            };
            match self.convert_value(key, value, depth) {
                Ok(Some(converted)) => {
                    doc.insert(key.to_string(), converted);
                }
                Ok(None) => {
                    tracing::debug!(target: LOG_TAG, key, "Dropping null property");
                }
                Err(e) => {
                    tracing::warn!(target: LOG_TAG, key, error = %e, "Dropping property");
                }
            }
        }
        doc
    }

    /// `Ok(None)` means the value resolved to null
    fn convert_value(&self, key: &str, value: &DynamicValue, depth: usize) -> Result<Option<Value>> {
        let converted = match value {
            DynamicValue::Null => return Ok(None),
            DynamicValue::Bool(b) => Value::Bool(*b),
            DynamicValue::String(s) => Value::String(s.clone()),
            DynamicValue::Number(n) => number_from_f64(*n)
                .map(Value::Number)
                .ok_or_else(|| Error::conversion(key, format!("non-finite number {}", n)))?,
            DynamicValue::Map(map) => {
                self.check_depth(key, depth)?;
                Value::Object(self.convert_map(map, depth + 1))
            }
            DynamicValue::Array(items) => {
                self.check_depth(key, depth)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    // A bad element fails the whole entry, never the document
                    if let Some(v) = self.convert_value(key, item, depth + 1)? {
                        out.push(v);
                    }
                }
                Value::Array(out)
            }
        };
        Ok(Some(converted))
    }

    fn check_depth(&self, key: &str, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::conversion(
                key,
                format!("nesting deeper than {} levels", self.max_depth),
            ));
        }
        Ok(())
    }
}
