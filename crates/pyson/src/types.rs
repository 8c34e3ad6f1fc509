use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::nodes::Pyson;
use crate::value::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Plain-value type tag reported by `types()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PysonType {
    Boolean,
    /// Integers, floats and decimals.
    Number,
    String,
    Object,
    Array,
    Null,
    Date,
    DateTime,
    TimeDelta,
}

impl fmt::Display for PysonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PysonType::Boolean => "boolean",
            PysonType::Number => "number",
            PysonType::String => "string",
            PysonType::Object => "object",
            PysonType::Array => "array",
            PysonType::Null => "null",
            PysonType::Date => "date",
            PysonType::DateTime => "datetime",
            PysonType::TimeDelta => "timedelta",
        };
        f.write_str(name)
    }
}

/// Set of type tags a value or node can evaluate to.
///
/// `Null` is compatible with everything: a null operand never makes a
/// composition invalid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSet(BTreeSet<PysonType>);

impl TypeSet {
    pub fn of(t: PysonType) -> Self {
        TypeSet(BTreeSet::from([t]))
    }

    pub fn contains(&self, t: PysonType) -> bool {
        self.0.contains(&t)
    }

    pub fn union(&self, other: &TypeSet) -> TypeSet {
        TypeSet(self.0.union(&other.0).copied().collect())
    }

    pub fn intersects(&self, other: &TypeSet) -> bool {
        self.contains(PysonType::Null)
            || other.contains(PysonType::Null)
            || !self.0.is_disjoint(&other.0)
    }

    /// True when every tag is `Null` or one of `allowed`.
    pub fn within(&self, allowed: &[PysonType]) -> bool {
        self.0
            .iter()
            .all(|t| *t == PysonType::Null || allowed.contains(t))
    }

    /// True when the set is exactly `{t}`.
    pub fn is_only(&self, t: PysonType) -> bool {
        self.0.len() == 1 && self.contains(t)
    }

    pub fn iter(&self) -> impl Iterator<Item = PysonType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<PysonType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = PysonType>>(iter: I) -> Self {
        TypeSet(iter.into_iter().collect())
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|t| t.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Rejects `value` unless all of its types are in `allowed`.
pub fn expect_types(
    class: &'static str,
    role: &str,
    value: &Value,
    allowed: &[PysonType],
) -> Result<(), PysonError> {
    let types = value.types();
    if types.within(allowed) {
        return Ok(());
    }
    let expected: Vec<String> = allowed.iter().map(|t| t.to_string()).collect();
    tracing::debug!(class, role, found = %types, "rejected operand");
    Err(PysonError::InvalidOperand(format!(
        "\"{}\" {} must be {}, found {}.",
        class,
        role,
        expected.join(" or "),
        types
    )))
}

/// Evaluates a decoded wire shape whose children are already plain values.
pub type EvalFn = for<'a> fn(&Map, &EvalCtx<'a>) -> Value;

/// Rebuilds a live node from a decoded wire shape.
pub type InitFn = fn(&Map) -> Result<Pyson, PysonError>;

/// A node kind as seen by the decoder.
pub struct NodeDefinition {
    pub class: &'static str,
    pub eval_fn: EvalFn,
    pub init_fn: InitFn,
}

/// Map of `__class__` tag -> definition.
pub type NodeRegistry = HashMap<&'static str, Arc<NodeDefinition>>;

/// Builds a `NodeRegistry` from a list of node definitions.
pub fn definitions_to_registry(definitions: Vec<Arc<NodeDefinition>>) -> NodeRegistry {
    let mut map = HashMap::new();
    for def in definitions {
        map.insert(def.class, def);
    }
    map
}
