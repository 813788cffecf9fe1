//! Instances and field values of the dynamic runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A field value.
///
/// Deserializes from plain JSON: `null`, booleans, integers, floats,
/// strings, arrays, and objects of the form `{"class": ..., "fields": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
    Array(Vec<DynValue>),
    Object(Box<DynObject>),
}

impl From<bool> for DynValue {
    fn from(v: bool) -> Self {
        DynValue::Bool(v)
    }
}

impl From<i32> for DynValue {
    fn from(v: i32) -> Self {
        DynValue::Int(v.into())
    }
}

impl From<i64> for DynValue {
    fn from(v: i64) -> Self {
        DynValue::Int(v)
    }
}

impl From<u64> for DynValue {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(DynValue::UInt(v), DynValue::Int)
    }
}

impl From<f64> for DynValue {
    fn from(v: f64) -> Self {
        DynValue::Float(v)
    }
}

impl From<&str> for DynValue {
    fn from(v: &str) -> Self {
        DynValue::Str(v.to_string())
    }
}

impl From<String> for DynValue {
    fn from(v: String) -> Self {
        DynValue::Str(v)
    }
}

impl From<Vec<DynValue>> for DynValue {
    fn from(v: Vec<DynValue>) -> Self {
        DynValue::Array(v)
    }
}

impl From<DynObject> for DynValue {
    fn from(v: DynObject) -> Self {
        DynValue::Object(Box::new(v))
    }
}

impl<T: Into<DynValue>> From<Option<T>> for DynValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DynValue::Null, Into::into)
    }
}

/// An instance of a registered class.
///
/// Field values are keyed by declaring class, then field name, so a field
/// shadowed by a subclass keeps its own value. A declared field without an
/// entry reads as [`DynValue::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynObject {
    /// Identity used by [`ToStringHook::Identity`](super::ToStringHook::Identity).
    #[serde(default)]
    pub id: u64,

    pub class: String,

    #[serde(default)]
    pub fields: BTreeMap<String, BTreeMap<String, DynValue>>,
}

impl DynObject {
    /// An instance of `class` with id 0 and no fields set.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            id: 0,
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set the identity printed by [`ToStringHook::Identity`](super::ToStringHook::Identity).
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Set the value of `owner.field`, where `owner` is the declaring class.
    pub fn set(
        mut self,
        owner: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<DynValue>,
    ) -> Self {
        self.fields
            .entry(owner.into())
            .or_default()
            .insert(field.into(), value.into());
        self
    }

    /// Value of `owner.field`, if set.
    pub fn get(&self, owner: &str, field: &str) -> Option<&DynValue> {
        self.fields.get(owner).and_then(|slots| slots.get(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_plain_json() {
        let value: DynValue = serde_json::from_str(
            r#"[null, true, 3, 1.5, "x", [], {"class": "P", "fields": {"P": {"a": 1}}}]"#,
        )
        .unwrap();
        let DynValue::Array(items) = value else {
            panic!("expected array");
        };
        assert_eq!(items[0], DynValue::Null);
        assert_eq!(items[1], DynValue::Bool(true));
        assert_eq!(items[2], DynValue::Int(3));
        assert_eq!(items[3], DynValue::Float(1.5));
        assert_eq!(items[4], DynValue::Str("x".into()));
        assert_eq!(items[5], DynValue::Array(Vec::new()));
        let DynValue::Object(obj) = &items[6] else {
            panic!("expected object");
        };
        assert_eq!(obj.get("P", "a"), Some(&DynValue::Int(1)));
    }

    #[test]
    fn large_unsigned_integers_stay_integers() {
        let value: DynValue = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(value, DynValue::UInt(u64::MAX));
        assert_eq!(DynValue::from(7_u64), DynValue::Int(7));
        assert_eq!(DynValue::from(u64::MAX), DynValue::UInt(u64::MAX));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(DynValue::from(None::<i64>), DynValue::Null);
        assert_eq!(DynValue::from(Some("a")), DynValue::Str("a".into()));
    }
}
