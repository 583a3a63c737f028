use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::key::Symbol;

/// A value stored under a key of a tracked record.
///
/// Equality is same-value equality:
/// - numbers compare bit-for-bit, except that all NaNs are equal, so
///   `NaN == NaN` and `0.0 != -0.0`
/// - `List` and `Map` compare by allocation identity, never by content
///
/// `Undefined` and `Null` are real values, distinct from each other and
/// from a missing key.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Symbol(Symbol),
    List(Arc<[Value]>),
    Map(Arc<BTreeMap<String, Value>>),
}

impl Value {
    /// Same-value comparison used to decide whether a write is a change.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether an object entry holding this value is left out of JSON.
    pub(crate) fn is_skipped_in_json(&self) -> bool {
        matches!(self, Value::Undefined | Value::Symbol(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

// Same-value equality is reflexive, NaN included.
impl Eq for Value {}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Symbol(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(_) => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(None)?;
                for (key, value) in map.iter().filter(|(_, v)| !v.is_skipped_in_json()) {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(Arc::from(s)),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(Arc::new(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::from(items))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_same_as_nan() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(Value::Number(f64::NAN), Value::Number(-f64::NAN));
    }

    #[test]
    fn test_signed_zeros_differ() {
        assert_ne!(Value::Number(0.0), Value::Number(-0.0));
        assert_eq!(Value::Number(-0.0), Value::Number(-0.0));
    }

    #[test]
    fn test_undefined_and_null_are_distinct() {
        assert_ne!(Value::Undefined, Value::Null);
        assert_ne!(Value::Null, Value::Bool(false));
        assert_ne!(Value::Number(0.0), Value::Bool(false));
        assert_ne!(Value::from("1"), Value::from(1));
    }

    #[test]
    fn test_lists_compare_by_identity() {
        let a = Value::from(vec![Value::from(1)]);
        let b = Value::from(vec![Value::from(1)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_maps_compare_by_identity() {
        let a = Value::from(serde_json::json!({ "x": 1 }));
        let b = Value::from(serde_json::json!({ "x": 1 }));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_serialize_follows_json_rules() {
        let value = Value::from(serde_json::json!({ "n": 1.5, "list": [true, null] }));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({ "n": 1.5, "list": [true, null] }));

        let nan = serde_json::to_value(Value::Number(f64::NAN)).unwrap();
        assert!(nan.is_null());

        let mut map = BTreeMap::new();
        map.insert("gone".to_string(), Value::Undefined);
        map.insert("tag".to_string(), Value::from(Symbol::new("tag")));
        map.insert("kept".to_string(), Value::from("yes"));
        let json = serde_json::to_value(Value::from(map)).unwrap();
        assert_eq!(json, serde_json::json!({ "kept": "yes" }));

        let list = Value::from(vec![Value::Undefined, Value::from(Symbol::anonymous())]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json, serde_json::json!([null, null]));
    }

    #[test]
    fn test_default_is_undefined() {
        assert!(Value::default().is_undefined());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
