//! Container nodes: `Get`, `In`, `Len`.

use super::{wire, Pyson};
use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::types::{expect_types, NodeDefinition, PysonType};
use crate::util::{self, field, is_truthy, key_str, strict_eq};
use crate::value::{Map, Value};
use std::sync::Arc;

/// `Get(obj, key, default)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Get {
    obj: Value,
    key: Value,
    default: Value,
}

impl Get {
    pub const CLASS: &'static str = "Get";

    pub fn new(
        obj: impl Into<Value>,
        key: impl Into<Value>,
        default: impl Into<Value>,
    ) -> Result<Self, PysonError> {
        let (obj, key) = (obj.into(), key.into());
        expect_types(Self::CLASS, "object", &obj, &[PysonType::Object])?;
        expect_types(Self::CLASS, "key", &key, &[PysonType::String])?;
        Ok(Get {
            obj,
            key,
            default: default.into(),
        })
    }

    pub fn obj(&self) -> &Value {
        &self.obj
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn pyson(&self) -> Map {
        wire(
            Self::CLASS,
            vec![
                ("v", self.obj.clone()),
                ("k", self.key.clone()),
                ("d", self.default.clone()),
            ],
        )
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![self.obj.clone(), self.key.clone(), self.default.clone()]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        let found = match (field(obj, "v"), key_str(field(obj, "k"))) {
            (Value::Object(map), Some(key)) => map.get(&key),
            _ => None,
        };
        found.unwrap_or_else(|| field(obj, "d")).clone()
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(Get::new(
            field(obj, "v").clone(),
            field(obj, "k").clone(),
            field(obj, "d").clone(),
        )?
        .into())
    }
}

/// `In(key, obj)`: membership in an array or truthy entry in an object.
#[derive(Debug, Clone, PartialEq)]
pub struct In {
    key: Value,
    obj: Value,
}

impl In {
    pub const CLASS: &'static str = "In";

    pub fn new(key: impl Into<Value>, obj: impl Into<Value>) -> Result<Self, PysonError> {
        let (key, obj) = (key.into(), obj.into());
        expect_types(
            Self::CLASS,
            "key",
            &key,
            &[PysonType::String, PysonType::Number],
        )?;
        expect_types(
            Self::CLASS,
            "container",
            &obj,
            &[PysonType::Object, PysonType::Array],
        )?;
        Ok(In { key, obj })
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn obj(&self) -> &Value {
        &self.obj
    }

    pub fn pyson(&self) -> Map {
        wire(
            Self::CLASS,
            vec![("k", self.key.clone()), ("v", self.obj.clone())],
        )
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![self.key.clone(), self.obj.clone()]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        let (key, container) = (field(obj, "k"), field(obj, "v"));
        if !is_truthy(container) {
            return Value::Bool(false);
        }
        let found = match container {
            Value::Array(arr) => arr.iter().any(|item| strict_eq(item, key)),
            Value::String(s) => key.as_str().is_some_and(|k| s.contains(k)),
            Value::Object(map) => key_str(key)
                .and_then(|k| map.get(&k))
                .is_some_and(is_truthy),
            _ => false,
        };
        Value::Bool(found)
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(In::new(field(obj, "k").clone(), field(obj, "v").clone())?.into())
    }
}

/// `Len(value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Len {
    value: Value,
}

impl Len {
    pub const CLASS: &'static str = "Len";

    pub fn new(value: impl Into<Value>) -> Result<Self, PysonError> {
        let value = value.into();
        expect_types(
            Self::CLASS,
            "operand",
            &value,
            &[PysonType::Object, PysonType::Array, PysonType::String],
        )?;
        Ok(Len { value })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn pyson(&self) -> Map {
        wire(Self::CLASS, vec![("v", self.value.clone())])
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![self.value.clone()]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        Value::from(util::len(field(obj, "v")))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(Len::new(field(obj, "v").clone())?.into())
    }
}

pub fn definitions() -> Vec<Arc<NodeDefinition>> {
    vec![
        Arc::new(NodeDefinition {
            class: Get::CLASS,
            eval_fn: Get::eval_,
            init_fn: Get::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: In::CLASS,
            eval_fn: In::eval_,
            init_fn: In::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: Len::CLASS,
            eval_fn: Len::eval_,
            init_fn: Len::init_from_object,
        }),
    ]
}
