//! The plain-value model shared by contexts, node payloads and evaluation results.

use crate::nodes::Pyson;
use crate::types::{PysonType, TypeSet};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde_json::Number;

/// Ordered string-keyed mapping, the shape of both JSON objects and contexts.
pub type Map = IndexMap<String, Value>;

/// Any value PYSON can carry.
///
/// Besides the JSON kinds this holds the temporal, decimal and binary values the
/// RPC layer transports as tagged objects, and embedded expression nodes (which
/// only appear in graphs handed to the encoder or produced by a non-evaluating
/// decode, never in evaluation results).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    TimeDelta(chrono::TimeDelta),
    /// Decimal kept in its canonical text form.
    Decimal(String),
    Bytes(Vec<u8>),
    Pyson(Box<Pyson>),
}

pub(crate) static NULL: Value = Value::Null;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_pyson(&self) -> Option<&Pyson> {
        match self {
            Value::Pyson(node) => Some(node),
            _ => None,
        }
    }

    /// The type tags this value can evaluate to.
    pub fn types(&self) -> TypeSet {
        match self {
            Value::Pyson(node) => node.types(),
            other => TypeSet::of(other.plain_type()),
        }
    }

    fn plain_type(&self) -> PysonType {
        match self {
            Value::Null => PysonType::Null,
            Value::Bool(_) => PysonType::Boolean,
            Value::Number(_) | Value::Decimal(_) => PysonType::Number,
            Value::String(_) => PysonType::String,
            Value::Array(_) => PysonType::Array,
            Value::Date(_) => PysonType::Date,
            Value::DateTime(_) => PysonType::DateTime,
            Value::TimeDelta(_) => PysonType::TimeDelta,
            Value::Object(_) | Value::Time(_) | Value::Bytes(_) | Value::Pyson(_) => {
                PysonType::Object
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(Number::from(n))
    }
}

/// Non-finite floats have no JSON form and become `null`.
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<chrono::TimeDelta> for Value {
    fn from(td: chrono::TimeDelta) -> Self {
        Value::TimeDelta(td)
    }
}

impl From<Pyson> for Value {
    fn from(node: Pyson) -> Self {
        Value::Pyson(Box::new(node))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Plain structural conversion: `__class__` tags are not interpreted.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_finite_float_is_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert_eq!(Value::from(1.5), Value::Number(Number::from_f64(1.5).unwrap()));
    }

    #[test]
    fn json_conversion_keeps_tags_as_plain_objects() {
        let v = Value::from(json!({"__class__": "date", "year": 2020}));
        let obj = v.as_object().unwrap();
        assert_eq!(obj.get("__class__"), Some(&Value::from("date")));
        assert_eq!(obj.get("year").and_then(Value::as_i64), Some(2020));
    }

    #[test]
    fn plain_types() {
        assert!(Value::from("x").types().contains(PysonType::String));
        assert!(Value::Decimal("1.5".into()).types().contains(PysonType::Number));
        assert!(Value::Bytes(vec![1]).types().contains(PysonType::Object));
    }
}
