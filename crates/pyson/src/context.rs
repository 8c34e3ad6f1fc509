use crate::decoder;
use crate::error::PysonError;
use crate::value::{Map, Value};

const PARENT_MARKER: &str = "_parent_";

/// Variable bindings an expression is evaluated against.
///
/// Keeps insertion order. The evaluator only ever reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: Map,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// Builds a context from JSON text, reviving RPC-tagged values
    /// (`date`, `datetime`, `Decimal`, ...) along the way.
    pub fn from_json(text: &str) -> Result<Self, PysonError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        match decoder::revive_plain(json)? {
            Value::Object(vars) => Ok(Context { vars }),
            Value::Null => Ok(Context::new()),
            _ => Err(PysonError::InvalidOperand(
                "context must be a JSON object.".to_string(),
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn del(&mut self, name: &str) -> bool {
        self.vars.shift_remove(name).is_some()
    }

    pub fn as_map(&self) -> &Map {
        &self.vars
    }

    /// Resolves `name` the way `Eval` does, falling back to `default`.
    pub fn lookup(&self, name: &str, default: &Value) -> Value {
        lookup(&self.vars, name, default)
    }
}

impl From<Map> for Context {
    fn from(vars: Map) -> Self {
        Context { vars }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Context {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Resolves `name` against `vars`. The literal name is tried first; a
/// leading `_parent_` marker is dropped only when neither the name nor its
/// dotted prefix is bound.
pub(crate) fn lookup(vars: &Map, name: &str, default: &Value) -> Value {
    let name = match name.strip_prefix(PARENT_MARKER) {
        Some(stripped) if !is_bound(vars, name) => stripped,
        _ => name,
    };
    resolve(vars, name, default)
}

fn is_bound(vars: &Map, name: &str) -> bool {
    vars.contains_key(name)
        || name
            .split_once('.')
            .is_some_and(|(prefix, _)| vars.contains_key(prefix))
}

/// Dotted names descend into nested mappings when the full name is not bound.
fn resolve(vars: &Map, name: &str, default: &Value) -> Value {
    if let Some((prefix, rest)) = name.split_once('.') {
        if !vars.contains_key(name) {
            return match vars.get(prefix) {
                Some(Value::Object(nested)) => resolve(nested, rest, default),
                _ => default.clone(),
            };
        }
    }
    vars.get(name).cloned().unwrap_or_else(|| default.clone())
}
