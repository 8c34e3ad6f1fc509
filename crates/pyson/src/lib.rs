//! PYSON: a small serializable expression language.
//!
//! # Overview
//!
//! Expressions are trees of typed nodes (`Eval`, `And`, `Greater`, `Date`, ...)
//! shipped as JSON objects tagged with `__class__`, e.g.
//! `{"__class__": "Eval", "v": "state", "d": ""}`. Decoding either evaluates
//! each node against a [`Context`] as it is parsed, or rebuilds the node tree
//! for later use.
//!
//! # Example
//!
//! ```
//! use pyson::{decode, encode, Context, Equal, Eval, Value};
//!
//! let expr = Equal::new(Eval::new("state", ""), "draft").unwrap();
//! let text = encode(&expr.into()).unwrap();
//!
//! let mut context = Context::new();
//! context.set("state", "draft");
//! assert_eq!(decode(&text, &context).unwrap(), Value::Bool(true));
//! ```

pub mod context;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod eval_ctx;
pub mod evaluate;
pub mod nodes;
pub mod types;
pub mod util;
pub mod value;

pub use context::Context;
pub use decoder::{Decoder, DecoderOptions};
pub use encoder::{Encoder, EncoderOptions};
pub use error::PysonError;
pub use eval_ctx::EvalCtx;
pub use evaluate::evaluate;
pub use nodes::{
    registry, And, Bool, Date, DateArgs, DateTime, DateTimeArgs, Equal, Eval, Get, Greater, If,
    In, Len, Less, Not, Or, Pyson, TimeDelta,
};
pub use types::{NodeDefinition, NodeRegistry, PysonType, TypeSet};
pub use value::{Map, Value};

/// Encodes a value graph, which may embed nodes, to JSON text.
pub fn encode(value: &Value) -> Result<String, PysonError> {
    Encoder::new().encode(value)
}

/// Decodes JSON text, evaluating every node against `context`.
pub fn decode(text: &str, context: &Context) -> Result<Value, PysonError> {
    Decoder::new(context.clone()).decode(text)
}
