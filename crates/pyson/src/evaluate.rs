//! Evaluation of value graphs that may embed expression nodes.

use crate::eval_ctx::EvalCtx;
use crate::value::Value;

/// Replaces every embedded node in `value` by its evaluation result.
///
/// Plain values are returned as they are; arrays and objects are rebuilt
/// with their children evaluated.
pub fn evaluate(value: &Value, ctx: &EvalCtx<'_>) -> Value {
    match value {
        Value::Pyson(node) => node.evaluate(ctx),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| evaluate(v, ctx)).collect()),
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), evaluate(v, ctx)))
                .collect(),
        ),
        other => other.clone(),
    }
}
