//! Node variants and the closed registry the decoder dispatches on.

pub mod branching;
pub mod comparison;
pub mod container;
pub mod eval;
pub mod logical;
pub mod temporal;

pub use branching::If;
pub use comparison::{Equal, Greater, Less};
pub use container::{Get, In, Len};
pub use eval::Eval;
pub use logical::{And, Bool, Not, Or};
pub use temporal::{Date, DateArgs, DateTime, DateTimeArgs, TimeDelta};

use crate::encoder;
use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::types::{definitions_to_registry, NodeDefinition, NodeRegistry, PysonType, TypeSet};
use crate::value::{Map, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Wire tag key carried by every tagged object.
pub const CLASS_KEY: &str = "__class__";

/// An immutable PYSON expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Pyson {
    Eval(Eval),
    Not(Not),
    Bool(Bool),
    And(And),
    Or(Or),
    Equal(Equal),
    Greater(Greater),
    Less(Less),
    If(If),
    Get(Get),
    In(In),
    Date(Date),
    DateTime(DateTime),
    TimeDelta(TimeDelta),
    Len(Len),
}

macro_rules! node_conversions {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Pyson {
                fn from(node: $variant) -> Self {
                    Pyson::$variant(node)
                }
            }

            impl From<$variant> for Value {
                fn from(node: $variant) -> Self {
                    Value::Pyson(Box::new(Pyson::$variant(node)))
                }
            }
        )*
    };
}

node_conversions!(
    Eval, Not, Bool, And, Or, Equal, Greater, Less, If, Get, In, Date, DateTime, TimeDelta, Len,
);

impl Pyson {
    /// The `__class__` tag of this node.
    pub fn class(&self) -> &'static str {
        match self {
            Pyson::Eval(_) => Eval::CLASS,
            Pyson::Not(_) => Not::CLASS,
            Pyson::Bool(_) => Bool::CLASS,
            Pyson::And(_) => And::CLASS,
            Pyson::Or(_) => Or::CLASS,
            Pyson::Equal(_) => Equal::CLASS,
            Pyson::Greater(_) => Greater::CLASS,
            Pyson::Less(_) => Less::CLASS,
            Pyson::If(_) => If::CLASS,
            Pyson::Get(_) => Get::CLASS,
            Pyson::In(_) => In::CLASS,
            Pyson::Date(_) => Date::CLASS,
            Pyson::DateTime(_) => DateTime::CLASS,
            Pyson::TimeDelta(_) => TimeDelta::CLASS,
            Pyson::Len(_) => Len::CLASS,
        }
    }

    /// Wire shape; children are left as they are (nested nodes stay nodes).
    pub fn pyson(&self) -> Map {
        match self {
            Pyson::Eval(n) => n.pyson(),
            Pyson::Not(n) => n.pyson(),
            Pyson::Bool(n) => n.pyson(),
            Pyson::And(n) => n.pyson(),
            Pyson::Or(n) => n.pyson(),
            Pyson::Equal(n) => n.pyson(),
            Pyson::Greater(n) => n.pyson(),
            Pyson::Less(n) => n.pyson(),
            Pyson::If(n) => n.pyson(),
            Pyson::Get(n) => n.pyson(),
            Pyson::In(n) => n.pyson(),
            Pyson::Date(n) => n.pyson(),
            Pyson::DateTime(n) => n.pyson(),
            Pyson::TimeDelta(n) => n.pyson(),
            Pyson::Len(n) => n.pyson(),
        }
    }

    /// Type tags this node can evaluate to.
    pub fn types(&self) -> TypeSet {
        match self {
            Pyson::Eval(n) => n.types(),
            Pyson::Not(_)
            | Pyson::Bool(_)
            | Pyson::And(_)
            | Pyson::Or(_)
            | Pyson::Equal(_)
            | Pyson::Greater(_)
            | Pyson::Less(_)
            | Pyson::In(_) => logical::boolean_types(),
            Pyson::If(n) => n.types(),
            Pyson::Get(n) => n.default().types(),
            Pyson::Date(n) => n.types(),
            Pyson::DateTime(n) => n.types(),
            Pyson::TimeDelta(n) => n.types(),
            Pyson::Len(_) => TypeSet::of(PysonType::Number),
        }
    }

    fn params(&self) -> Vec<Value> {
        match self {
            Pyson::Eval(n) => n.params(),
            Pyson::Not(n) => n.params(),
            Pyson::Bool(n) => n.params(),
            Pyson::And(n) => n.params(),
            Pyson::Or(n) => n.params(),
            Pyson::Equal(n) => n.params(),
            Pyson::Greater(n) => n.params(),
            Pyson::Less(n) => n.params(),
            Pyson::If(n) => n.params(),
            Pyson::Get(n) => n.params(),
            Pyson::In(n) => n.params(),
            Pyson::Date(n) => n.params(),
            Pyson::DateTime(n) => n.params(),
            Pyson::TimeDelta(n) => n.params(),
            Pyson::Len(n) => n.params(),
        }
    }

    /// Evaluates the node bottom-up: children first, then this node's rule
    /// applied to its wire shape.
    pub fn evaluate(&self, ctx: &EvalCtx<'_>) -> Value {
        let shape: Map = self
            .pyson()
            .into_iter()
            .map(|(k, v)| (k, crate::evaluate(&v, ctx)))
            .collect();
        match self {
            Pyson::Eval(_) => Eval::eval_(&shape, ctx),
            Pyson::Not(_) => Not::eval_(&shape, ctx),
            Pyson::Bool(_) => Bool::eval_(&shape, ctx),
            Pyson::And(_) => And::eval_(&shape, ctx),
            Pyson::Or(_) => Or::eval_(&shape, ctx),
            Pyson::Equal(_) => Equal::eval_(&shape, ctx),
            Pyson::Greater(_) => Greater::eval_(&shape, ctx),
            Pyson::Less(_) => Less::eval_(&shape, ctx),
            Pyson::If(_) => If::eval_(&shape, ctx),
            Pyson::Get(_) => Get::eval_(&shape, ctx),
            Pyson::In(_) => In::eval_(&shape, ctx),
            Pyson::Date(_) => Date::eval_(&shape, ctx),
            Pyson::DateTime(_) => DateTime::eval_(&shape, ctx),
            Pyson::TimeDelta(_) => TimeDelta::eval_(&shape, ctx),
            Pyson::Len(_) => Len::eval_(&shape, ctx),
        }
    }

    /// `In(key, self)`.
    pub fn contains(self, key: impl Into<Value>) -> Result<Pyson, PysonError> {
        Ok(In::new(key, self)?.into())
    }

    /// `Get(self, key, default)`.
    pub fn get(self, key: impl Into<Value>, default: impl Into<Value>) -> Result<Pyson, PysonError> {
        Ok(Get::new(self, key, default)?.into())
    }
}

impl std::ops::Not for Pyson {
    type Output = Pyson;

    fn not(self) -> Pyson {
        Not::new(self).into()
    }
}

/// `a & b` extends an existing `And` instead of nesting.
impl<T: Into<Value>> std::ops::BitAnd<T> for Pyson {
    type Output = Pyson;

    fn bitand(self, other: T) -> Pyson {
        match self {
            Pyson::And(and) => and.push(other.into()).into(),
            node => And::pair(node.into(), other.into()).into(),
        }
    }
}

/// `a | b` extends an existing `Or` instead of nesting.
impl<T: Into<Value>> std::ops::BitOr<T> for Pyson {
    type Output = Pyson;

    fn bitor(self, other: T) -> Pyson {
        match self {
            Pyson::Or(or) => or.push(other.into()).into(),
            node => Or::pair(node.into(), other.into()).into(),
        }
    }
}

impl fmt::Display for Pyson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class())?;
        for (i, param) in self.params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match param {
                Value::Pyson(node) => write!(f, "{}", node)?,
                plain => f.write_str(&encoder::to_json_string(plain))?,
            }
        }
        f.write_str(")")
    }
}

/// Builds a wire shape: the class tag followed by `fields` in order.
pub(crate) fn wire(class: &'static str, fields: Vec<(&str, Value)>) -> Map {
    let mut map = Map::with_capacity(fields.len() + 1);
    map.insert(CLASS_KEY.to_string(), Value::from(class));
    for (key, value) in fields {
        map.insert(key.to_string(), value);
    }
    map
}

/// Wraps anything not already boolean-typed in `Bool`.
pub(crate) fn boolean_operand(value: Value) -> Value {
    if value.types().is_only(PysonType::Boolean) {
        value
    } else {
        Bool::new(value).into()
    }
}

/// All node kinds.
pub fn all_definitions() -> Vec<Arc<NodeDefinition>> {
    let mut defs = Vec::new();
    defs.extend(eval::definitions());
    defs.extend(logical::definitions());
    defs.extend(comparison::definitions());
    defs.extend(branching::definitions());
    defs.extend(container::definitions());
    defs.extend(temporal::definitions());
    defs
}

/// The registry of node kinds by `__class__` tag, built on first use.
pub fn registry() -> &'static NodeRegistry {
    static REGISTRY: OnceLock<NodeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| definitions_to_registry(all_definitions()))
}
