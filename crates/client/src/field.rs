//! Per-type field schema and the value kinds entity fields can hold

use crate::err::{Result, StaplusError};
use crate::registry::EntityKind;
use crate::time::{TimeValue, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;
use tracing::debug;

/// A value that can live in an entity field and cross the wire as JSON.
///
/// `from_wire` is the validator: it returns `None` when the JSON does not
/// have the declared semantic type.
pub trait FieldValue: Clone + Debug + PartialEq + Sized {
    /// Human readable name of the accepted kind, used in validation errors.
    const EXPECTED: &'static str;

    fn from_wire(value: &Value) -> Option<Self>;

    fn to_wire(&self) -> Value;

    /// Blank values are left out of serialized payloads.
    fn is_blank(&self) -> bool {
        false
    }
}

impl FieldValue for String {
    const EXPECTED: &'static str = "string";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn to_wire(&self) -> Value {
        Value::String(self.clone())
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl FieldValue for Map<String, Value> {
    const EXPECTED: &'static str = "object";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }

    fn to_wire(&self) -> Value {
        Value::Object(self.clone())
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// Free-form JSON (results, GeoJSON, quality reports).
impl FieldValue for Value {
    const EXPECTED: &'static str = "any JSON value";

    fn from_wire(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn to_wire(&self) -> Value {
        self.clone()
    }

    fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl FieldValue for Timestamp {
    const EXPECTED: &'static str = "ISO-8601 timestamp";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| Timestamp::parse(s).ok())
    }

    fn to_wire(&self) -> Value {
        Value::String(self.to_iso_string())
    }
}

impl FieldValue for TimeValue {
    const EXPECTED: &'static str = "ISO-8601 instant or interval";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| TimeValue::parse(s).ok())
    }

    fn to_wire(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn from_wire(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_wire).collect()
    }

    fn to_wire(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::to_wire).collect())
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// Unit in which a datastream's results are expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfMeasurement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl UnitOfMeasurement {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            symbol: Some(symbol.into()),
            definition: Some(definition.into()),
        }
    }
}

impl FieldValue for UnitOfMeasurement {
    const EXPECTED: &'static str = "unit of measurement object";

    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    fn to_wire(&self) -> Value {
        let mut map = Map::new();
        for (key, part) in [
            ("name", &self.name),
            ("symbol", &self.symbol),
            ("definition", &self.definition),
        ] {
            if let Some(part) = part {
                map.insert(key.to_string(), Value::String(part.clone()));
            }
        }
        Value::Object(map)
    }
}

/// How a field participates in the entity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Value,
    ToOne(EntityKind),
    ToMany(EntityKind),
}

/// One row of an entity type's static field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// key used in the JSON payload
    pub name: &'static str,
    /// accepted value kind, for diagnostics
    pub expected: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn value(name: &'static str, expected: &'static str) -> Self {
        Self {
            name,
            expected,
            kind: FieldKind::Value,
        }
    }

    pub const fn to_one(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            expected: "entity",
            kind: FieldKind::ToOne(target),
        }
    }

    pub const fn to_many(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            expected: "entity list",
            kind: FieldKind::ToMany(target),
        }
    }

    pub fn is_relation(&self) -> bool {
        !matches!(self.kind, FieldKind::Value)
    }
}

/// Validates a JSON value against `T`; `null` clears the field.
pub(crate) fn coerce<T: FieldValue>(
    entity: &'static str,
    wire: &str,
    value: &Value,
) -> Result<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    T::from_wire(value)
        .map(Some)
        .ok_or_else(|| StaplusError::validation(entity, wire, T::EXPECTED))
}

/// Lenient read used when decoding server payloads: a value of the wrong kind
/// leaves the field at its default.
pub(crate) fn read_value<T: FieldValue>(
    map: &Map<String, Value>,
    entity: &'static str,
    wire: &str,
) -> Option<T> {
    let raw = map.get(wire)?;
    if raw.is_null() {
        return None;
    }
    let value = T::from_wire(raw);
    if value.is_none() {
        debug!(
            "ignoring {}.{}: expected {}, got {}",
            entity,
            wire,
            T::EXPECTED,
            raw
        );
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_rejects_wrong_kind() {
        let err = coerce::<String>("Thing", "name", &json!(42)).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Thing.name"));
    }

    #[test]
    fn test_coerce_null_clears() {
        assert_eq!(coerce::<String>("Thing", "name", &Value::Null).unwrap(), None);
    }

    #[test]
    fn test_timestamp_validated_on_coerce() {
        assert!(coerce::<Timestamp>("Campaign", "startTime", &json!("soon")).is_err());
        assert!(coerce::<Timestamp>("Campaign", "startTime", &json!("2024-01-01T00:00:00Z"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_vec_requires_every_element() {
        assert_eq!(
            Vec::<String>::from_wire(&json!(["a", "b"])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(Vec::<String>::from_wire(&json!(["a", 1])), None);
    }

    #[test]
    fn test_unit_of_measurement_skips_absent_parts() {
        let uom = UnitOfMeasurement {
            name: Some("degree Celsius".into()),
            symbol: Some("°C".into()),
            definition: None,
        };
        assert_eq!(
            uom.to_wire(),
            json!({"name": "degree Celsius", "symbol": "°C"})
        );
        assert_eq!(UnitOfMeasurement::from_wire(&uom.to_wire()), Some(uom));
        assert_eq!(UnitOfMeasurement::from_wire(&json!("C")), None);
    }

    #[test]
    fn test_blank_values() {
        assert!(String::new().is_blank());
        assert!(Map::new().is_blank());
        assert!(json!({}).is_blank());
        assert!(!json!(0).is_blank());
    }
}
