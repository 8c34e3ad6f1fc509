//! PYSON decoder: JSON text to evaluated values or live node trees.
//!
//! The text is parsed with `serde_json`, then walked post-order: each object
//! is rebuilt from its already converted children and, if it carries a known
//! `__class__` tag, replaced. RPC tags (`date`, `datetime`, `time`,
//! `timedelta`, `Decimal`, `bytes`) always become typed values. Node tags are
//! evaluated against the context, or rebuilt into nodes when evaluation is
//! off. Unknown tags pass through as plain objects.

use crate::context::Context;
use crate::error::PysonError;
use crate::eval_ctx::{EvalCtx, NowFn};
use crate::nodes::{registry, Pyson, CLASS_KEY};
use crate::value::{Map, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

/// Options controlling decoding.
#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
    /// Rebuild node trees instead of evaluating them.
    pub noeval: bool,
}

/// PYSON decoder bound to one context.
#[derive(Clone, Default)]
pub struct Decoder {
    context: Context,
    options: DecoderOptions,
    now: Option<Arc<NowFn>>,
}

impl Decoder {
    /// An evaluating decoder.
    pub fn new(context: Context) -> Self {
        Decoder {
            context,
            ..Default::default()
        }
    }

    /// A non-evaluating decoder producing live nodes.
    pub fn noeval() -> Self {
        Decoder::with_options(Context::new(), DecoderOptions { noeval: true })
    }

    pub fn with_options(context: Context, options: DecoderOptions) -> Self {
        Decoder {
            context,
            options,
            now: None,
        }
    }

    /// Overrides the clock used by `Date`/`DateTime` without a start value.
    pub fn with_now(mut self, now: Arc<NowFn>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    fn eval_ctx(&self) -> EvalCtx<'_> {
        EvalCtx {
            context: &self.context,
            now: self.now.clone(),
        }
    }

    /// Decodes JSON text.
    pub fn decode(&self, text: &str) -> Result<Value, PysonError> {
        tracing::debug!(noeval = self.options.noeval, len = text.len(), "decoding");
        let json: serde_json::Value = serde_json::from_str(text)?;
        self.decode_json(json)
    }

    /// Decodes an already parsed JSON tree.
    pub fn decode_json(&self, json: serde_json::Value) -> Result<Value, PysonError> {
        revive(json, self.options.noeval, &self.eval_ctx())
    }

    /// Decodes text whose root must be an expression. Only a non-evaluating
    /// decoder can produce one.
    pub fn decode_node(&self, text: &str) -> Result<Pyson, PysonError> {
        match self.decode(text)? {
            Value::Pyson(node) => Ok(*node),
            _ => Err(PysonError::NotAnExpression),
        }
    }
}

/// Decodes `json`, evaluating nodes in `ctx` unless `noeval`.
fn revive(
    json: serde_json::Value,
    noeval: bool,
    ctx: &EvalCtx<'_>,
) -> Result<Value, PysonError> {
    walk(json, &|obj: Map| {
        let Some(class) = obj.get(CLASS_KEY).and_then(Value::as_str).map(str::to_owned) else {
            return Ok(Value::Object(obj));
        };
        if let Some(value) = rpc_value(&class, &obj)? {
            return Ok(value);
        }
        match registry().get(class.as_str()) {
            Some(def) if noeval => (def.init_fn)(&obj).map(Value::from),
            Some(def) => Ok((def.eval_fn)(&obj, ctx)),
            None => {
                tracing::trace!(class = %class, "passing through unknown __class__");
                Ok(Value::Object(obj))
            }
        }
    })
}

/// Decodes `json` reviving only RPC tags; node tags stay plain objects.
pub(crate) fn revive_plain(json: serde_json::Value) -> Result<Value, PysonError> {
    walk(json, &|obj: Map| {
        let rpc = match obj.get(CLASS_KEY).and_then(Value::as_str) {
            Some(class) => rpc_value(class, &obj)?,
            None => None,
        };
        Ok(rpc.unwrap_or(Value::Object(obj)))
    })
}

type ObjectFn<'f> = dyn Fn(Map) -> Result<Value, PysonError> + 'f;

fn walk(json: serde_json::Value, on_object: &ObjectFn<'_>) -> Result<Value, PysonError> {
    match json {
        serde_json::Value::Array(arr) => Ok(Value::Array(
            arr.into_iter()
                .map(|v| walk(v, on_object))
                .collect::<Result<_, _>>()?,
        )),
        serde_json::Value::Object(obj) => {
            let mut map = Map::with_capacity(obj.len());
            for (key, value) in obj {
                map.insert(key, walk(value, on_object)?);
            }
            on_object(map)
        }
        other => Ok(Value::from(other)),
    }
}

fn int(obj: &Map, key: &str) -> Option<i64> {
    obj.get(key).and_then(Value::as_i64)
}

/// Optional time component, `0` when absent.
fn part<T: TryFrom<i64>>(obj: &Map, key: &str) -> Option<T> {
    T::try_from(int(obj, key).unwrap_or(0)).ok()
}

fn date_of(obj: &Map) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(int(obj, "year")?).ok()?,
        u32::try_from(int(obj, "month")?).ok()?,
        u32::try_from(int(obj, "day")?).ok()?,
    )
}

fn time_of(obj: &Map) -> Option<NaiveTime> {
    NaiveTime::from_hms_micro_opt(
        part(obj, "hour")?,
        part(obj, "minute")?,
        part(obj, "second")?,
        part(obj, "microsecond")?,
    )
}

/// Typed value for an RPC-tagged object, `None` for any other tag.
fn rpc_value(class: &str, obj: &Map) -> Result<Option<Value>, PysonError> {
    let value = match class {
        "date" => Value::Date(date_of(obj).ok_or(PysonError::InvalidWireValue("date"))?),
        "datetime" => {
            let date = date_of(obj).ok_or(PysonError::InvalidWireValue("datetime"))?;
            let time = time_of(obj).ok_or(PysonError::InvalidWireValue("datetime"))?;
            Value::DateTime(date.and_time(time))
        }
        "time" => Value::Time(time_of(obj).ok_or(PysonError::InvalidWireValue("time"))?),
        "timedelta" => {
            let seconds = obj
                .get("seconds")
                .and_then(Value::as_f64)
                .ok_or(PysonError::InvalidWireValue("timedelta"))?;
            Value::TimeDelta(chrono::TimeDelta::microseconds((seconds * 1e6).round() as i64))
        }
        "Decimal" => match obj.get("decimal") {
            Some(Value::String(s)) => Value::Decimal(s.clone()),
            Some(Value::Number(n)) => Value::Decimal(n.to_string()),
            _ => return Err(PysonError::InvalidWireValue("Decimal")),
        },
        "bytes" => {
            let encoded = obj
                .get("base64")
                .and_then(Value::as_str)
                .ok_or(PysonError::InvalidWireValue("bytes"))?;
            Value::Bytes(
                STANDARD
                    .decode(encoded)
                    .map_err(|_| PysonError::InvalidWireValue("bytes"))?,
            )
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}
