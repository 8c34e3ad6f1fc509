//! Conditional node: `If`.

use super::{boolean_operand, wire, Pyson};
use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::types::{NodeDefinition, TypeSet};
use crate::util::{field, is_truthy};
use crate::value::{Map, Value};
use std::sync::Arc;

/// `If(condition, then, else)`.
///
/// The branches may report different types; the node reports their union.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    condition: Value,
    then_statement: Value,
    else_statement: Value,
}

impl If {
    pub const CLASS: &'static str = "If";

    pub fn new(
        condition: impl Into<Value>,
        then_statement: impl Into<Value>,
        else_statement: impl Into<Value>,
    ) -> Self {
        If {
            condition: boolean_operand(condition.into()),
            then_statement: then_statement.into(),
            else_statement: else_statement.into(),
        }
    }

    pub fn condition(&self) -> &Value {
        &self.condition
    }

    pub fn then_statement(&self) -> &Value {
        &self.then_statement
    }

    pub fn else_statement(&self) -> &Value {
        &self.else_statement
    }

    pub fn pyson(&self) -> Map {
        wire(
            Self::CLASS,
            vec![
                ("c", self.condition.clone()),
                ("t", self.then_statement.clone()),
                ("e", self.else_statement.clone()),
            ],
        )
    }

    pub fn types(&self) -> TypeSet {
        self.then_statement
            .types()
            .union(&self.else_statement.types())
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![
            self.condition.clone(),
            self.then_statement.clone(),
            self.else_statement.clone(),
        ]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        if is_truthy(field(obj, "c")) {
            field(obj, "t").clone()
        } else {
            field(obj, "e").clone()
        }
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(If::new(
            field(obj, "c").clone(),
            field(obj, "t").clone(),
            field(obj, "e").clone(),
        )
        .into())
    }
}

pub fn definitions() -> Vec<Arc<NodeDefinition>> {
    vec![Arc::new(NodeDefinition {
        class: If::CLASS,
        eval_fn: If::eval_,
        init_fn: If::init_from_object,
    })]
}
