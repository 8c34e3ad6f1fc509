//! Variable lookup in the evaluation context.

use super::{wire, Pyson};
use crate::context;
use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::types::{NodeDefinition, TypeSet};
use crate::util::field;
use crate::value::{Map, Value};
use std::sync::Arc;

/// `Eval(name, default)`: the value bound to `name`, or `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct Eval {
    name: String,
    default: Value,
}

impl Eval {
    pub const CLASS: &'static str = "Eval";

    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Eval {
            name: name.into(),
            default: default.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn pyson(&self) -> Map {
        wire(
            Self::CLASS,
            vec![("v", Value::from(self.name.as_str())), ("d", self.default.clone())],
        )
    }

    pub fn types(&self) -> TypeSet {
        self.default.types()
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![Value::from(self.name.as_str()), self.default.clone()]
    }

    pub fn eval_(obj: &Map, ctx: &EvalCtx<'_>) -> Value {
        let default = field(obj, "d");
        match field(obj, "v") {
            Value::String(name) => context::lookup(ctx.context.as_map(), name, default),
            _ => default.clone(),
        }
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        let name = field(obj, "v")
            .as_str()
            .ok_or_else(|| PysonError::shape(Self::CLASS, "\"v\" must be a string"))?;
        Ok(Eval::new(name, field(obj, "d").clone()).into())
    }
}

pub fn definitions() -> Vec<Arc<NodeDefinition>> {
    vec![Arc::new(NodeDefinition {
        class: Eval::CLASS,
        eval_fn: Eval::eval_,
        init_fn: Eval::init_from_object,
    })]
}
