//! Temporal nodes: `Date`, `DateTime`, `TimeDelta`.
//!
//! Absolute fields are applied first (zero or null leaves `y`/`M`/`d`
//! untouched, null leaves the time fields untouched), then deltas, each in
//! declared order. `ms` and `dms` carry microseconds.

use super::{wire, Pyson};
use crate::error::PysonError;
use crate::eval_ctx::EvalCtx;
use crate::types::{expect_types, NodeDefinition, PysonType, TypeSet};
use crate::util::{self, field, on_date, shift};
use crate::value::{Map, Value};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

fn expect_integer(class: &'static str, role: &str, value: &Value) -> Result<(), PysonError> {
    match value {
        Value::Null => Ok(()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
        Value::Pyson(_) => expect_types(class, role, value, &[PysonType::Number]),
        _ => {
            tracing::debug!(class, role, "rejected non-integer operand");
            Err(PysonError::InvalidOperand(format!(
                "\"{}\" {} must be an integer or null.",
                class, role
            )))
        }
    }
}

fn int_field(obj: &Map, key: &str) -> Option<i64> {
    match field(obj, key) {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

fn nonzero_field(obj: &Map, key: &str) -> Option<i64> {
    int_field(obj, key).filter(|n| *n != 0)
}

fn absolute_date(mut date: NaiveDate, obj: &Map) -> NaiveDate {
    if let Some(year) = nonzero_field(obj, "y") {
        date = util::set_year(date, year);
    }
    if let Some(month) = nonzero_field(obj, "M") {
        date = util::set_month(date, month);
    }
    if let Some(day) = nonzero_field(obj, "d") {
        date = util::set_day(date, day);
    }
    date
}

fn date_deltas(mut date: NaiveDate, obj: &Map) -> NaiveDate {
    if let Some(years) = nonzero_field(obj, "dy") {
        date = util::add_years(date, years);
    }
    if let Some(months) = nonzero_field(obj, "dM") {
        date = util::add_months(date, months);
    }
    if let Some(days) = nonzero_field(obj, "dd") {
        date = util::add_days(date, days);
    }
    date
}

/// Arguments of `Date`, every field `null` unless set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateArgs {
    pub year: Value,
    pub month: Value,
    pub day: Value,
    pub delta_years: Value,
    pub delta_months: Value,
    pub delta_days: Value,
    pub start: Value,
}

impl DateArgs {
    pub fn ymd(year: i64, month: i64, day: i64) -> Self {
        DateArgs {
            year: year.into(),
            month: month.into(),
            day: day.into(),
            ..Default::default()
        }
    }

    fn validate(&self, class: &'static str) -> Result<(), PysonError> {
        expect_integer(class, "year", &self.year)?;
        expect_integer(class, "month", &self.month)?;
        expect_integer(class, "day", &self.day)?;
        expect_integer(class, "delta_years", &self.delta_years)?;
        expect_integer(class, "delta_months", &self.delta_months)?;
        expect_integer(class, "delta_days", &self.delta_days)
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("y", self.year.clone()),
            ("M", self.month.clone()),
            ("d", self.day.clone()),
            ("dy", self.delta_years.clone()),
            ("dM", self.delta_months.clone()),
            ("dd", self.delta_days.clone()),
        ]
    }

    fn from_shape(obj: &Map) -> Self {
        DateArgs {
            year: field(obj, "y").clone(),
            month: field(obj, "M").clone(),
            day: field(obj, "d").clone(),
            delta_years: field(obj, "dy").clone(),
            delta_months: field(obj, "dM").clone(),
            delta_days: field(obj, "dd").clone(),
            start: field(obj, "start").clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Date {
    args: DateArgs,
}

impl Date {
    pub const CLASS: &'static str = "Date";

    pub fn new(args: DateArgs) -> Result<Self, PysonError> {
        args.validate(Self::CLASS)?;
        Ok(Date { args })
    }

    pub fn args(&self) -> &DateArgs {
        &self.args
    }

    pub fn pyson(&self) -> Map {
        let mut fields = self.args.fields();
        fields.push(("start", self.args.start.clone()));
        wire(Self::CLASS, fields)
    }

    pub fn types(&self) -> TypeSet {
        TypeSet::of(PysonType::Date)
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        let mut params: Vec<Value> = self.args.fields().into_iter().map(|(_, v)| v).collect();
        params.push(self.args.start.clone());
        params
    }

    pub fn eval_(obj: &Map, ctx: &EvalCtx<'_>) -> Value {
        let start = match field(obj, "start") {
            Value::Date(d) => *d,
            Value::DateTime(dt) => dt.date(),
            _ => ctx.today(),
        };
        Value::Date(date_deltas(absolute_date(start, obj), obj))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(Date::new(DateArgs::from_shape(obj))?.into())
    }
}

/// Arguments of `DateTime`: the `Date` fields plus the time-of-day fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateTimeArgs {
    pub date: DateArgs,
    pub hour: Value,
    pub minute: Value,
    pub second: Value,
    pub microsecond: Value,
    pub delta_hours: Value,
    pub delta_minutes: Value,
    pub delta_seconds: Value,
    pub delta_microseconds: Value,
}

impl DateTimeArgs {
    fn validate(&self, class: &'static str) -> Result<(), PysonError> {
        self.date.validate(class)?;
        for (role, value) in self.time_fields() {
            expect_integer(class, role, &value)?;
        }
        Ok(())
    }

    fn time_fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("h", self.hour.clone()),
            ("m", self.minute.clone()),
            ("s", self.second.clone()),
            ("ms", self.microsecond.clone()),
            ("dh", self.delta_hours.clone()),
            ("dm", self.delta_minutes.clone()),
            ("ds", self.delta_seconds.clone()),
            ("dms", self.delta_microseconds.clone()),
        ]
    }

    fn from_shape(obj: &Map) -> Self {
        DateTimeArgs {
            date: DateArgs::from_shape(obj),
            hour: field(obj, "h").clone(),
            minute: field(obj, "m").clone(),
            second: field(obj, "s").clone(),
            microsecond: field(obj, "ms").clone(),
            delta_hours: field(obj, "dh").clone(),
            delta_minutes: field(obj, "dm").clone(),
            delta_seconds: field(obj, "ds").clone(),
            delta_microseconds: field(obj, "dms").clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTime {
    args: DateTimeArgs,
}

impl DateTime {
    pub const CLASS: &'static str = "DateTime";

    pub fn new(args: DateTimeArgs) -> Result<Self, PysonError> {
        args.validate(Self::CLASS)?;
        Ok(DateTime { args })
    }

    pub fn args(&self) -> &DateTimeArgs {
        &self.args
    }

    pub fn pyson(&self) -> Map {
        let mut fields = self.args.date.fields();
        fields.extend(self.args.time_fields());
        fields.push(("start", self.args.date.start.clone()));
        wire(Self::CLASS, fields)
    }

    pub fn types(&self) -> TypeSet {
        TypeSet::of(PysonType::DateTime)
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        let date = self.args.date.fields();
        let time = self.args.time_fields();
        // year, month, day, hour, minute, second, microsecond, then the deltas
        let mut params: Vec<Value> = date[..3]
            .iter()
            .chain(&time[..4])
            .chain(&date[3..])
            .chain(&time[4..])
            .map(|(_, v)| v.clone())
            .collect();
        params.push(self.args.date.start.clone());
        params
    }

    pub fn eval_(obj: &Map, ctx: &EvalCtx<'_>) -> Value {
        let start = match field(obj, "start") {
            Value::DateTime(dt) => *dt,
            Value::Date(d) => d.and_time(NaiveTime::default()),
            _ => ctx.now(),
        };
        let mut dt = on_date(start, |d| absolute_date(d, obj));
        if let Some(hour) = int_field(obj, "h") {
            dt = util::set_hour(dt, hour);
        }
        if let Some(minute) = int_field(obj, "m") {
            dt = util::set_minute(dt, minute);
        }
        if let Some(second) = int_field(obj, "s") {
            dt = util::set_second(dt, second);
        }
        if let Some(microsecond) = int_field(obj, "ms") {
            dt = util::set_microsecond(dt, microsecond);
        }
        dt = on_date(dt, |d| date_deltas(d, obj));
        if let Some(hours) = nonzero_field(obj, "dh") {
            dt = shift(dt, chrono::TimeDelta::try_hours(hours));
        }
        if let Some(minutes) = nonzero_field(obj, "dm") {
            dt = shift(dt, chrono::TimeDelta::try_minutes(minutes));
        }
        if let Some(seconds) = nonzero_field(obj, "ds") {
            dt = shift(dt, chrono::TimeDelta::try_seconds(seconds));
        }
        if let Some(microseconds) = nonzero_field(obj, "dms") {
            dt = shift(dt, Some(chrono::TimeDelta::microseconds(microseconds)));
        }
        Value::DateTime(dt)
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        Ok(DateTime::new(DateTimeArgs::from_shape(obj))?.into())
    }
}

/// `TimeDelta(days, seconds, microseconds)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDelta {
    days: Value,
    seconds: Value,
    microseconds: Value,
}

impl TimeDelta {
    pub const CLASS: &'static str = "TimeDelta";

    pub fn new(
        days: impl Into<Value>,
        seconds: impl Into<Value>,
        microseconds: impl Into<Value>,
    ) -> Result<Self, PysonError> {
        let (days, seconds, microseconds) = (days.into(), seconds.into(), microseconds.into());
        expect_types(Self::CLASS, "days", &days, &[PysonType::Number])?;
        expect_types(Self::CLASS, "seconds", &seconds, &[PysonType::Number])?;
        expect_types(Self::CLASS, "microseconds", &microseconds, &[PysonType::Number])?;
        Ok(TimeDelta {
            days,
            seconds,
            microseconds,
        })
    }

    pub fn pyson(&self) -> Map {
        wire(
            Self::CLASS,
            vec![
                ("d", self.days.clone()),
                ("s", self.seconds.clone()),
                ("m", self.microseconds.clone()),
            ],
        )
    }

    pub fn types(&self) -> TypeSet {
        TypeSet::of(PysonType::TimeDelta)
    }

    pub(crate) fn params(&self) -> Vec<Value> {
        vec![
            self.days.clone(),
            self.seconds.clone(),
            self.microseconds.clone(),
        ]
    }

    pub fn eval_(obj: &Map, _ctx: &EvalCtx<'_>) -> Value {
        let part = |key: &str| field(obj, key).as_f64().unwrap_or(0.0);
        let total = part("d") * 86_400e6 + part("s") * 1e6 + part("m");
        Value::TimeDelta(chrono::TimeDelta::microseconds(total.round() as i64))
    }

    pub fn init_from_object(obj: &Map) -> Result<Pyson, PysonError> {
        let part = |key: &str| match obj.get(key) {
            Some(v) => v.clone(),
            None => Value::from(0),
        };
        Ok(TimeDelta::new(part("d"), part("s"), part("m"))?.into())
    }
}

pub fn definitions() -> Vec<Arc<NodeDefinition>> {
    vec![
        Arc::new(NodeDefinition {
            class: Date::CLASS,
            eval_fn: Date::eval_,
            init_fn: Date::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: DateTime::CLASS,
            eval_fn: DateTime::eval_,
            init_fn: DateTime::init_from_object,
        }),
        Arc::new(NodeDefinition {
            class: TimeDelta::CLASS,
            eval_fn: TimeDelta::eval_,
            init_fn: TimeDelta::init_from_object,
        }),
    ]
}
