//! Boolean nodes: `Not`, `Bool`, `And`, `Or`.

use super::{boolean_operand, wire, Pyson};
use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::types::{NodeDefinition, PysonType, TypeSet};
use crate::util::{bool_value, field, is_truthy};
use crate::value::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Not {
    value: Value,
}

impl Not {
    pub const CLASS: &'static str = "Not";

    pub fn new(value: impl Into<Value>) -> Self {
        Not {
            value: boolean_operand(value.into()),
        }
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
        Value::Bool(!bool_value(field(obj, "v")))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(Not::new(field(obj, "v").clone()).into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bool {
    value: Value,
}

impl Bool {
    pub const CLASS: &'static str = "Bool";

    pub fn new(value: impl Into<Value>) -> Self {
        Bool {
            value: value.into(),
        }
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
        Value::Bool(bool_value(field(obj, "v")))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(Bool::new(field(obj, "v").clone()).into())
    }
}

/// Validates and coerces the statements shared by `And` and `Or`.
fn coerce_statements(
    class: &'static str,
    statements: Vec<Value>,
) -> Result<Vec<Value>, PysonError> {
    if statements.len() < 2 {
        tracing::debug!(class, count = statements.len(), "rejected statements");
        return Err(PysonError::Arity(format!(
            "\"{}\" must have at least 2 statements.",
            class
        )));
    }
    Ok(statements.into_iter().map(boolean_operand).collect())
}

fn shape_statements(class: &'static str, obj: &Map) -> Result<Vec<Value>, PysonError> {
    match field(obj, "s") {
        Value::Array(s) => Ok(s.clone()),
        _ => Err(PysonError::shape(class, "\"s\" must be an array")),
    }
}

fn statement_values(obj: &Map) -> impl Iterator<Item = bool> + '_ {
    field(obj, "s")
        .as_array()
        .into_iter()
        .flatten()
        .map(is_truthy)
}

#[derive(Debug, Clone, PartialEq)]
pub struct And {
    statements: Vec<Value>,
}

impl And {
    pub const CLASS: &'static str = "And";

    pub fn new(statements: Vec<Value>) -> Result<Self, PysonError> {
        Ok(And {
            statements: coerce_statements(Self::CLASS, statements)?,
        })
    }

    /// Two statements always satisfy the arity rule.
    pub(crate) fn pair(first: Value, second: Value) -> Self {
        And {
            statements: vec![boolean_operand(first), boolean_operand(second)],
        }
    }

    pub(crate) fn push(mut self, statement: Value) -> Self {
        self.statements.push(boolean_operand(statement));
        self
    }

    pub fn statements(&self) -> &[Value] {
        &self.statements
    }

    pub fn pyson(&self) -> Map {
        wire(Self::CLASS, vec![("s", Value::Array(self.statements.clone()))])
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        self.statements.clone()
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        let mut values = statement_values(obj);
        Value::Bool(values.all(|b| b))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(And::new(shape_statements(Self::CLASS, obj)?)?.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Or {
    statements: Vec<Value>,
}

impl Or {
    pub const CLASS: &'static str = "Or";

    pub fn new(statements: Vec<Value>) -> Result<Self, PysonError> {
        Ok(Or {
            statements: coerce_statements(Self::CLASS, statements)?,
        })
    }

    /// Two statements always satisfy the arity rule.
    pub(crate) fn pair(first: Value, second: Value) -> Self {
        Or {
            statements: vec![boolean_operand(first), boolean_operand(second)],
        }
    }

    pub(crate) fn push(mut self, statement: Value) -> Self {
        self.statements.push(boolean_operand(statement));
        self
    }

    pub fn statements(&self) -> &[Value] {
        &self.statements
    }

    pub fn pyson(&self) -> Map {
        wire(Self::CLASS, vec![("s", Value::Array(self.statements.clone()))])
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        self.statements.clone()
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        let mut values = statement_values(obj);
        Value::Bool(values.any(|b| b))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(Or::new(shape_statements(Self::CLASS, obj)?)?.into())
    }
}

pub(crate) fn boolean_types() -> TypeSet {
    TypeSet::of(PysonType::Boolean)
}

pub fn definitions() -> Vec<Arc<NodeDefinition>> {
    vec![
        Arc::new(NodeDefinition {
            class: Not::CLASS,
            eval_fn: Not::eval_,
            init_fn: Not::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: Bool::CLASS,
            eval_fn: Bool::eval_,
            init_fn: Bool::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: And::CLASS,
            eval_fn: And::eval_,
            init_fn: And::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: Or::CLASS,
            eval_fn: Or::eval_,
            init_fn: Or::init_from_object,
        }),
    ]
}
