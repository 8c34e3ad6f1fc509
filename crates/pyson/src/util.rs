//! Coercion, comparison and calendar helpers shared by the node variants.

use crate::value::{Map, Value, NULL};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

// ----------------------------------------------------------------- Shape helpers

/// Field of a decoded wire shape, `null` when absent.
pub fn field<'m>(obj: &'m Map, key: &str) -> &'m Value {
    obj.get(key).unwrap_or(&NULL)
}

// ----------------------------------------------------------------- Truthiness

/// Loose truthiness: `null`, `false`, `0`, `NaN` and `""` are false, every
/// container or temporal value is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Truthiness as `Bool` defines it: empty containers, zero durations,
/// zero decimals and midnight are false.
pub fn bool_value(value: &Value) -> bool {
    match value {
        Value::Time(t) => *t != NaiveTime::default(),
        Value::TimeDelta(td) => !td.is_zero(),
        Value::Decimal(_) => {
            let n = num(value);
            n != 0.0 && !n.is_nan()
        }
        Value::Object(map) => !map.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Bytes(bytes) => !bytes.is_empty(),
        other => is_truthy(other),
    }
}

// ----------------------------------------------------------------- Numeric helpers

/// Converts a value to a number for ordering.
///
/// Dates and datetimes become epoch milliseconds (dates at midnight UTC),
/// times milliseconds since midnight, durations milliseconds. Strings are
/// parsed after trimming, the empty string is `0`. Anything else is `NaN`.
pub fn num(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) | Value::Decimal(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Date(d) => epoch_millis(d.and_time(NaiveTime::default())),
        Value::DateTime(dt) => epoch_millis(*dt),
        Value::Time(t) => {
            t.num_seconds_from_midnight() as f64 * 1000.0 + (t.nanosecond() as f64) / 1e6
        }
        Value::TimeDelta(td) => duration_millis(td),
        Value::Array(_) | Value::Object(_) | Value::Bytes(_) | Value::Pyson(_) => f64::NAN,
    }
}

fn epoch_millis(dt: NaiveDateTime) -> f64 {
    let utc = dt.and_utc();
    utc.timestamp() as f64 * 1000.0 + utc.timestamp_subsec_micros() as f64 / 1000.0
}

fn duration_millis(td: &TimeDelta) -> f64 {
    match td.num_microseconds() {
        Some(us) => us as f64 / 1000.0,
        None => td.num_milliseconds() as f64,
    }
}

// -------------------------------------------------------------- Comparison helpers

/// Loose equality between plain values.
///
/// Scalars (booleans, numbers, decimals, strings) compare numerically unless
/// both are strings; everything else compares structurally.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (
            Value::Bool(_) | Value::Number(_) | Value::Decimal(_) | Value::String(_),
            Value::Bool(_) | Value::Number(_) | Value::Decimal(_) | Value::String(_),
        ) => num(a) == num(b),
        _ => a == b,
    }
}

/// Equality as `Equal` evaluates it.
pub fn pyson_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| pyson_eq(p, q))
        }
        (
            Value::Date(_) | Value::DateTime(_) | Value::Time(_),
            Value::Date(_) | Value::DateTime(_) | Value::Time(_),
        ) => std::mem::discriminant(a) == std::mem::discriminant(b) && num(a) == num(b),
        (Value::TimeDelta(x), Value::TimeDelta(y)) => x == y,
        _ => loose_eq(a, b),
    }
}

/// Strict membership used by `In` over arrays: no cross-kind coercion.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

// ------------------------------------------------------------ Container helpers

/// Key count of an object, element count of an array, character count of a
/// string, `0` otherwise.
pub fn len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(arr) => arr.len(),
        Value::Object(obj) => obj.len(),
        Value::Bytes(bytes) => bytes.len(),
        _ => 0,
    }
}

/// Object key for a string or number operand.
pub fn key_str(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ------------------------------------------------------------- Calendar helpers

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Builds a date from a year, a zero-based month that may overflow into
/// adjacent years, and a day clamped to the resulting month.
fn ymd(year: i64, month0: i64, day: i64) -> Option<NaiveDate> {
    let year = i32::try_from(year.checked_add(month0.div_euclid(12))?).ok()?;
    let month = u32::try_from(month0.rem_euclid(12) + 1).ok()?;
    let last = days_in_month(year, month)?;
    let day = u32::try_from(day.clamp(1, last as i64)).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn set_year(date: NaiveDate, year: i64) -> NaiveDate {
    ymd(year, date.month0() as i64, date.day() as i64).unwrap_or(date)
}

/// `month` is one-based.
pub fn set_month(date: NaiveDate, month: i64) -> NaiveDate {
    month
        .checked_sub(1)
        .and_then(|m0| ymd(date.year() as i64, m0, date.day() as i64))
        .unwrap_or(date)
}

pub fn set_day(date: NaiveDate, day: i64) -> NaiveDate {
    ymd(date.year() as i64, date.month0() as i64, day).unwrap_or(date)
}

pub fn add_years(date: NaiveDate, years: i64) -> NaiveDate {
    (date.year() as i64)
        .checked_add(years)
        .and_then(|y| ymd(y, date.month0() as i64, date.day() as i64))
        .unwrap_or(date)
}

pub fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    (date.month0() as i64)
        .checked_add(months)
        .and_then(|m0| ymd(date.year() as i64, m0, date.day() as i64))
        .unwrap_or(date)
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(date)
}

/// Adds `delta` to `dt`, leaving it unchanged on overflow.
pub fn shift(dt: NaiveDateTime, delta: Option<TimeDelta>) -> NaiveDateTime {
    delta
        .and_then(|delta| dt.checked_add_signed(delta))
        .unwrap_or(dt)
}

/// Applies a date-only operation to the date part of a datetime.
pub fn on_date(dt: NaiveDateTime, op: impl FnOnce(NaiveDate) -> NaiveDate) -> NaiveDateTime {
    op(dt.date()).and_time(dt.time())
}

pub fn set_hour(dt: NaiveDateTime, hour: i64) -> NaiveDateTime {
    shift(dt, hour.checked_sub(dt.hour() as i64).and_then(TimeDelta::try_hours))
}

pub fn set_minute(dt: NaiveDateTime, minute: i64) -> NaiveDateTime {
    shift(dt, minute.checked_sub(dt.minute() as i64).and_then(TimeDelta::try_minutes))
}

pub fn set_second(dt: NaiveDateTime, second: i64) -> NaiveDateTime {
    shift(dt, second.checked_sub(dt.second() as i64).and_then(TimeDelta::try_seconds))
}

pub fn set_microsecond(dt: NaiveDateTime, microsecond: i64) -> NaiveDateTime {
    let current = (dt.nanosecond() % 1_000_000_000) as i64 / 1000;
    shift(dt, microsecond.checked_sub(current).map(TimeDelta::microseconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&Value::from(0)));
        assert!(!is_truthy(&Value::from("")));
        assert!(is_truthy(&Value::from(json!({}))));
        assert!(is_truthy(&Value::from(json!([]))));
    }

    #[test]
    fn bool_semantics() {
        assert!(!bool_value(&Value::from(json!({}))));
        assert!(bool_value(&Value::from(json!({"foo": "bar"}))));
        assert!(!bool_value(&Value::from(json!([]))));
        assert!(bool_value(&Value::from(json!(["x"]))));
        assert!(!bool_value(&Value::Time(NaiveTime::default())));
        assert!(bool_value(&Value::Time(NaiveTime::from_hms_opt(0, 0, 1).unwrap())));
        assert!(!bool_value(&Value::TimeDelta(TimeDelta::zero())));
        assert!(!bool_value(&Value::Decimal("0.00".into())));
        assert!(bool_value(&Value::Decimal("0.01".into())));
        assert!(bool_value(&Value::Date(date(1970, 1, 1))));
    }

    #[test]
    fn numeric_conversion() {
        assert_eq!(num(&Value::from(" 12 ")), 12.0);
        assert_eq!(num(&Value::from("")), 0.0);
        assert!(num(&Value::from("abc")).is_nan());
        assert_eq!(num(&Value::Date(date(1970, 1, 2))), 86_400_000.0);
        assert_eq!(num(&Value::TimeDelta(TimeDelta::microseconds(1500))), 1.5);
    }

    #[test]
    fn loose_equality() {
        assert!(loose_eq(&Value::from(1), &Value::from("1")));
        assert!(loose_eq(&Value::from(1), &Value::from(1.0)));
        assert!(loose_eq(&Value::from(true), &Value::from(1)));
        assert!(!loose_eq(&Value::from("a"), &Value::from("b")));
        assert!(!loose_eq(&Value::Null, &Value::from(0)));
        assert!(loose_eq(&Value::from(json!({"a": 1})), &Value::from(json!({"a": 1}))));
    }

    #[test]
    fn temporal_equality_requires_same_kind() {
        let d = Value::Date(date(2020, 1, 1));
        let dt = Value::DateTime(date(2020, 1, 1).and_time(NaiveTime::default()));
        assert!(pyson_eq(&d, &d.clone()));
        assert!(!pyson_eq(&d, &dt));
    }

    #[test]
    fn month_override_clamps_day() {
        assert_eq!(set_month(date(2020, 1, 31), 2), date(2020, 2, 29));
        assert_eq!(set_month(date(2020, 1, 15), 13), date(2021, 1, 15));
        assert_eq!(set_day(date(2021, 2, 1), 31), date(2021, 2, 28));
    }

    #[test]
    fn year_and_month_deltas_clamp() {
        assert_eq!(add_years(date(2020, 2, 29), 1), date(2021, 2, 28));
        assert_eq!(add_months(date(2020, 3, 31), -1), date(2020, 2, 29));
        assert_eq!(add_months(date(2020, 11, 30), 3), date(2021, 2, 28));
        assert_eq!(add_days(date(2020, 12, 31), 1), date(2021, 1, 1));
    }

    #[test]
    fn time_overrides_carry() {
        let dt = date(2020, 1, 1).and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(set_hour(dt, 25), date(2020, 1, 2).and_hms_opt(1, 30, 0).unwrap());
        assert_eq!(set_minute(dt, 0), date(2020, 1, 1).and_hms_opt(10, 0, 0).unwrap());
        assert_eq!(
            set_microsecond(dt, 250),
            date(2020, 1, 1).and_hms_micro_opt(10, 30, 0, 250).unwrap()
        );
    }
}
