//! PYSON encoder: value graph (possibly embedding nodes) to JSON text.
//!
//! Nodes are replaced by their wire shape; temporal, decimal and binary
//! values by the tagged objects the RPC layer uses:
//!
//! ```text
//! {"__class__": "date", "year", "month", "day"}
//! {"__class__": "datetime", "year", "month", "day", "hour", "minute", "second", "microsecond"}
//! {"__class__": "time", "hour", "minute", "second", "microsecond"}
//! {"__class__": "timedelta", "seconds"}
//! {"__class__": "Decimal", "decimal"}
//! {"__class__": "bytes", "base64"}
//! ```

use crate::error::PysonError;
use crate::nodes::CLASS_KEY;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{Datelike, Timelike};
use serde_json::{json, Number};

/// Options controlling encoding.
#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    /// Emit object keys in sorted order for byte-stable output.
    pub sort_keys: bool,
}

/// PYSON encoder. Never mutates its input.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    pub options: EncoderOptions,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder::default()
    }

    pub fn with_options(options: EncoderOptions) -> Self {
        Encoder { options }
    }

    /// Encodes `value` to JSON text.
    pub fn encode(&self, value: &Value) -> Result<String, PysonError> {
        Ok(serde_json::to_string(&self.prepare(value))?)
    }

    /// Builds the JSON-compatible structure `encode` serializes.
    pub fn prepare(&self, value: &Value) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(|v| self.prepare(v)).collect())
            }
            Value::Object(obj) => self.object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), self.prepare(v)))
                    .collect(),
            ),
            Value::Pyson(node) => self.prepare(&Value::Object(node.pyson())),
            tagged => self.object(tagged_fields(tagged)),
        }
    }

    fn object(&self, mut entries: Vec<(String, serde_json::Value)>) -> serde_json::Value {
        if self.options.sort_keys {
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        }
        serde_json::Value::Object(entries.into_iter().collect())
    }
}

fn tag(class: &str, fields: serde_json::Value) -> Vec<(String, serde_json::Value)> {
    let mut entries = vec![(CLASS_KEY.to_string(), json!(class))];
    if let serde_json::Value::Object(fields) = fields {
        entries.extend(fields);
    }
    entries
}

fn tagged_fields(value: &Value) -> Vec<(String, serde_json::Value)> {
    match value {
        Value::Date(d) => tag(
            "date",
            json!({"year": d.year(), "month": d.month(), "day": d.day()}),
        ),
        Value::DateTime(dt) => tag(
            "datetime",
            json!({
                "year": dt.year(),
                "month": dt.month(),
                "day": dt.day(),
                "hour": dt.hour(),
                "minute": dt.minute(),
                "second": dt.second(),
                "microsecond": (dt.nanosecond() % 1_000_000_000) / 1000,
            }),
        ),
        Value::Time(t) => tag(
            "time",
            json!({
                "hour": t.hour(),
                "minute": t.minute(),
                "second": t.second(),
                "microsecond": (t.nanosecond() % 1_000_000_000) / 1000,
            }),
        ),
        Value::TimeDelta(td) => {
            let seconds = match td.num_microseconds() {
                Some(us) => us as f64 / 1e6,
                None => td.num_seconds() as f64,
            };
            let seconds = Number::from_f64(seconds)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null);
            tag("timedelta", json!({ "seconds": seconds }))
        }
        Value::Decimal(s) => tag("Decimal", json!({ "decimal": s })),
        Value::Bytes(bytes) => tag("bytes", json!({ "base64": STANDARD.encode(bytes) })),
        _ => Vec::new(),
    }
}

/// Compact JSON text of a value with its keys in insertion order.
pub(crate) fn to_json_string(value: &Value) -> String {
    Encoder::new().prepare(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    #[test]
    fn date_shape() {
        let d = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(
            Encoder::new().prepare(&d),
            json!({"__class__": "date", "year": 2024, "month": 3, "day": 9})
        );
    }

    #[test]
    fn timedelta_shape_is_seconds() {
        let td = Value::TimeDelta(TimeDelta::milliseconds(1500));
        assert_eq!(
            Encoder::new().prepare(&td),
            json!({"__class__": "timedelta", "seconds": 1.5})
        );
    }

    #[test]
    fn bytes_and_decimal_shapes() {
        let enc = Encoder::new();
        assert_eq!(
            enc.prepare(&Value::Bytes(b"hi".to_vec())),
            json!({"__class__": "bytes", "base64": "aGk="})
        );
        assert_eq!(
            enc.prepare(&Value::Decimal("1.50".into())),
            json!({"__class__": "Decimal", "decimal": "1.50"})
        );
    }

    #[test]
    fn sorted_keys() {
        let value = Value::from(json!({"b": 1, "a": {"d": 2, "c": 3}}));
        let text = Encoder::with_options(EncoderOptions { sort_keys: true })
            .encode(&value)
            .unwrap();
        assert_eq!(text, r#"{"a":{"c":3,"d":2},"b":1}"#);
        let text = Encoder::new().encode(&value).unwrap();
        assert_eq!(text, r#"{"b":1,"a":{"d":2,"c":3}}"#);
    }
}
