//! Comparison nodes: `Equal`, `Greater`, `Less`.

use super::{boolean_operand, wire, Pyson};
use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::types::{expect_types, NodeDefinition, PysonType};
use crate::util::{field, is_truthy, num, pyson_eq};
use crate::value::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Equal {
    s1: Value,
    s2: Value,
}

impl Equal {
    pub const CLASS: &'static str = "Equal";

    pub fn new(s1: impl Into<Value>, s2: impl Into<Value>) -> Result<Self, PysonError> {
        let (s1, s2) = (s1.into(), s2.into());
        if !s1.types().intersects(&s2.types()) {
            tracing::debug!(left = %s1.types(), right = %s2.types(), "rejected Equal operands");
            return Err(PysonError::IncompatibleTypes(Self::CLASS));
        }
        Ok(Equal { s1, s2 })
    }

    pub fn operands(&self) -> (&Value, &Value) {
        (&self.s1, &self.s2)
    }

    pub fn pyson(&self) -> Map {
        wire(
            Self::CLASS,
            vec![("s1", self.s1.clone()), ("s2", self.s2.clone())],
        )
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![self.s1.clone(), self.s2.clone()]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        Value::Bool(pyson_eq(field(obj, "s1"), field(obj, "s2")))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(Equal::new(field(obj, "s1").clone(), field(obj, "s2").clone())?.into())
    }
}

const COMPARABLE: &[PysonType] = &[
    PysonType::Number,
    PysonType::Date,
    PysonType::DateTime,
    PysonType::TimeDelta,
];

/// Operands of an ordering node after validation: `(s1, s2, equal)`.
fn ordering_operands(
    class: &'static str,
    s1: Value,
    s2: Value,
    equal: Value,
) -> Result<(Value, Value, Value), PysonError> {
    expect_types(class, "first operand", &s1, COMPARABLE)?;
    expect_types(class, "second operand", &s2, COMPARABLE)?;
    Ok((s1, s2, boolean_operand(equal)))
}

fn ordering_shape(class: &'static str, s1: &Value, s2: &Value, equal: &Value) -> Map {
    wire(
        class,
        vec![("s1", s1.clone()), ("s2", s2.clone()), ("e", equal.clone())],
    )
}

/// Compares the converted operands of a decoded shape; null on either side is false.
fn compare(obj: &Map, strict: fn(f64, f64) -> bool, inclusive: fn(f64, f64) -> bool) -> Value {
    let (s1, s2) = (field(obj, "s1"), field(obj, "s2"));
    if s1.is_null() || s2.is_null() {
        return Value::Bool(false);
    }
    let (a, b) = (num(s1), num(s2));
    if is_truthy(field(obj, "e")) {
        Value::Bool(inclusive(a, b))
    } else {
        Value::Bool(strict(a, b))
    }
}

fn shape_equal(obj: &Map) -> Value {
    obj.get("e").cloned().unwrap_or(Value::Bool(false))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Greater {
    s1: Value,
    s2: Value,
    equal: Value,
}

impl Greater {
    pub const CLASS: &'static str = "Greater";

    pub fn new(
        s1: impl Into<Value>,
        s2: impl Into<Value>,
        equal: impl Into<Value>,
    ) -> Result<Self, PysonError> {
        let (s1, s2, equal) = ordering_operands(Self::CLASS, s1.into(), s2.into(), equal.into())?;
        Ok(Greater { s1, s2, equal })
    }

    pub fn operands(&self) -> (&Value, &Value) {
        (&self.s1, &self.s2)
    }

    pub fn pyson(&self) -> Map {
        ordering_shape(Self::CLASS, &self.s1, &self.s2, &self.equal)
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![self.s1.clone(), self.s2.clone(), self.equal.clone()]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        compare(obj, |a, b| a > b, |a, b| a >= b)
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        let (s1, s2) = (field(obj, "s1").clone(), field(obj, "s2").clone());
        Ok(Greater::new(s1, s2, shape_equal(obj))?.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Less {
    s1: Value,
    s2: Value,
    equal: Value,
}

impl Less {
    pub const CLASS: &'static str = "Less";

    pub fn new(
        s1: impl Into<Value>,
        s2: impl Into<Value>,
        equal: impl Into<Value>,
    ) -> Result<Self, PysonError> {
        let (s1, s2, equal) = ordering_operands(Self::CLASS, s1.into(), s2.into(), equal.into())?;
        Ok(Less { s1, s2, equal })
    }

    pub fn operands(&self) -> (&Value, &Value) {
        (&self.s1, &self.s2)
    }

    pub fn pyson(&self) -> Map {
        ordering_shape(Self::CLASS, &self.s1, &self.s2, &self.equal)
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![self.s1.clone(), self.s2.clone(), self.equal.clone()]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        compare(obj, |a, b| a < b, |a, b| a <= b)
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        let (s1, s2) = (field(obj, "s1").clone(), field(obj, "s2").clone());
        Ok(Less::new(s1, s2, shape_equal(obj))?.into())
    }
}

pub fn definitions() -> Vec<Arc<NodeDefinition>> {
    vec![
        Arc::new(NodeDefinition {
            class: Equal::CLASS,
            eval_fn: Equal::eval_,
            init_fn: Equal::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: Greater::CLASS,
            eval_fn: Greater::eval_,
            init_fn: Greater::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: Less::CLASS,
            eval_fn: Less::eval_,
            init_fn: Less::init_from_object,
        }),
    ]
}
