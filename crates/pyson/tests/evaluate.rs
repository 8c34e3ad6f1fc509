//! Integration tests for node evaluation.
//!
//! Every expression is checked twice: decoded from its wire form against the
//! context, and evaluated directly as a live node tree. Both must agree.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta as Duration};
use pyson::eval_ctx::NowFn;
use pyson::{
    encode, evaluate, And, Bool, Context, Date, DateArgs, DateTime, DateTimeArgs, Decoder, Equal,
    Eval, EvalCtx, Get, Greater, If, In, Len, Less, Map, Not, Or, TimeDelta, Value,
};
use serde_json::json;
use std::sync::Arc;

/// 2010-03-31 10:30:00.
fn clock() -> Arc<NowFn> {
    Arc::new(|| datetime(2010, 3, 31, 10, 30, 0))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn datetime(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, mi, s).unwrap()
}

fn ctx(json: serde_json::Value) -> Context {
    Context::from_json(&json.to_string()).unwrap()
}

fn check(expr: impl Into<Value>, expected: impl Into<Value>, context: &Context) {
    let expr = expr.into();
    let expected = expected.into();
    let text = encode(&expr).unwrap();
    let decoded = Decoder::new(context.clone())
        .with_now(clock())
        .decode(&text)
        .unwrap_or_else(|e| panic!("decode({}) failed: {}", text, e));
    assert_eq!(decoded, expected, "decoded: {}", text);
    let direct = evaluate(&expr, &EvalCtx::new(context).with_now(clock()));
    assert_eq!(direct, expected, "evaluated: {}", text);
}

// ----------------------------------------------------------------- Eval

#[test]
fn test_eval() {
    let c = ctx(json!({"state": "draft"}));
    check(Eval::new("state", ""), "draft", &c);
    check(Eval::new("missing", "fallback"), "fallback", &c);
}

#[test]
fn test_eval_dotted() {
    let c = ctx(json!({"a": {"b": 5}, "x": 1}));
    check(Eval::new("a.b", 0), 5, &c);
    check(Eval::new("a.c", "d"), "d", &c);
    check(Eval::new("x.y", "d"), "d", &c);
}

#[test]
fn test_eval_parent_marker() {
    let c = ctx(json!({"company": 3, "_parent_company": 7}));
    check(Eval::new("_parent_company", 0), 7, &c);
    check(Eval::new("_parent_missing", 0), 0, &c);
    let c = ctx(json!({"company": 3}));
    check(Eval::new("_parent_company", 0), 3, &c);
}

#[test]
fn test_eval_parent_record() {
    let c = ctx(json!({"_parent_sale": {"state": "draft"}, "_parent_x": 1}));
    check(Eval::new("_parent_sale.state", "DEFAULT"), "draft", &c);
    check(Eval::new("_parent_sale.missing", "DEFAULT"), "DEFAULT", &c);
    check(Eval::new("_parent_x", "DEFAULT"), 1, &c);
    let c = ctx(json!({"sale": {"state": "done"}}));
    check(Eval::new("_parent_sale.state", "DEFAULT"), "done", &c);
}

// ----------------------------------------------------------------- Logical

#[test]
fn test_bool() {
    let c = ctx(json!({"empty": [], "full": [1], "zero": 0}));
    check(Bool::new(Eval::new("empty", Value::Array(vec![]))), false, &c);
    check(Bool::new(Eval::new("full", Value::Array(vec![]))), true, &c);
    check(Bool::new(Eval::new("zero", 0)), false, &c);
    check(Bool::new(Duration::zero()), false, &c);
    check(Bool::new(Map::new()), false, &c);
}

#[test]
fn test_not() {
    let c = Context::new();
    check(Not::new(true), false, &c);
    check(Not::new(Value::Array(vec![])), true, &c);
    check(Not::new(""), true, &c);
}

#[test]
fn test_and_or() {
    let c = ctx(json!({"a": true, "b": false}));
    let and = And::new(vec![
        Eval::new("a", false).into(),
        Eval::new("b", false).into(),
    ])
    .unwrap();
    check(and, false, &c);
    let or = Or::new(vec![
        Eval::new("a", false).into(),
        Eval::new("b", false).into(),
    ])
    .unwrap();
    check(or, true, &c);
    let and = And::new(vec![true.into(), 1.into(), "x".into()]).unwrap();
    check(and, true, &c);
}

// -------------------------------------------------------------- Comparison

#[test]
fn test_equal() {
    let c = ctx(json!({"x": 1, "tags": ["a", "b"]}));
    check(Equal::new(Eval::new("x", 0), 1).unwrap(), true, &c);
    check(Equal::new(Eval::new("x", 0), 2).unwrap(), false, &c);
    check(
        Equal::new(Eval::new("tags", Value::Array(vec![])), Value::from(json!(["a", "b"])))
            .unwrap(),
        true,
        &c,
    );
    check(Equal::new(Eval::new("none", Value::Null), 0).unwrap(), false, &c);
}

#[test]
fn test_greater_less() {
    let c = ctx(json!({"n": 5}));
    check(Greater::new(Eval::new("n", 0), 4, false).unwrap(), true, &c);
    check(Greater::new(Eval::new("n", 0), 5, false).unwrap(), false, &c);
    check(Greater::new(Eval::new("n", 0), 5, true).unwrap(), true, &c);
    check(Less::new(Eval::new("n", 0), 5, false).unwrap(), false, &c);
    check(Less::new(Eval::new("n", 0), 5, true).unwrap(), true, &c);
    check(Less::new(Eval::new("n", 0), 6.5, false).unwrap(), true, &c);
}

#[test]
fn test_greater_null_is_false() {
    let c = Context::new();
    check(Greater::new(Eval::new("n", Value::Null), 0, true).unwrap(), false, &c);
    check(Less::new(Value::Null, 0, true).unwrap(), false, &c);
}

#[test]
fn test_compare_dates() {
    let c = ctx(json!({"d": {"__class__": "date", "year": 2020, "month": 1, "day": 31}}));
    check(
        Greater::new(Eval::new("d", Value::Null), date(2020, 1, 30), false).unwrap(),
        true,
        &c,
    );
    check(
        Less::new(
            Eval::new("d", Value::Null),
            Date::new(DateArgs::ymd(2020, 2, 1)).unwrap(),
            false,
        )
        .unwrap(),
        true,
        &c,
    );
}

// --------------------------------------------------------------- Branching

#[test]
fn test_if() {
    let c = ctx(json!({"c": true}));
    check(If::new(Eval::new("c", false), "yes", "no"), "yes", &c);
    check(If::new(Eval::new("other", false), "yes", "no"), "no", &c);
    check(If::new(Eval::new("c", false), 1, "mixed"), 1, &c);
}

// --------------------------------------------------------------- Container

#[test]
fn test_get() {
    let c = ctx(json!({"obj": {"k": "v", "n": null}}));
    check(
        Get::new(Eval::new("obj", Map::new()), "k", "d").unwrap(),
        "v",
        &c,
    );
    check(
        Get::new(Eval::new("obj", Map::new()), "missing", "d").unwrap(),
        "d",
        &c,
    );
    check(
        Get::new(Eval::new("obj", Map::new()), "n", "d").unwrap(),
        Value::Null,
        &c,
    );
}

#[test]
fn test_in() {
    let c = ctx(json!({"groups": [1, 2], "flags": {"a": 1, "b": 0}}));
    check(In::new(1, Eval::new("groups", Value::Array(vec![]))).unwrap(), true, &c);
    check(In::new("1", Eval::new("groups", Value::Array(vec![]))).unwrap(), false, &c);
    check(In::new("a", Eval::new("flags", Map::new())).unwrap(), true, &c);
    check(In::new("b", Eval::new("flags", Map::new())).unwrap(), false, &c);
    check(In::new("z", Eval::new("none", Value::Null)).unwrap(), false, &c);
}

#[test]
fn test_in_substring_on_the_wire() {
    let decoder = Decoder::new(Context::new());
    let hit = decoder
        .decode(r#"{"__class__": "In", "k": "ell", "v": "hello"}"#)
        .unwrap();
    assert_eq!(hit, Value::Bool(true));
    let miss = decoder
        .decode(r#"{"__class__": "In", "k": "xyz", "v": "hello"}"#)
        .unwrap();
    assert_eq!(miss, Value::Bool(false));
}

#[test]
fn test_len() {
    let c = ctx(json!({"items": [1, 2, 3], "name": "héllo", "obj": {"a": 1}}));
    check(Len::new(Eval::new("items", Value::Array(vec![]))).unwrap(), 3, &c);
    check(Len::new(Eval::new("name", "")).unwrap(), 5, &c);
    check(Len::new(Eval::new("obj", Map::new())).unwrap(), 1, &c);
    check(Len::new(Eval::new("none", Value::Null)).unwrap(), 0, &c);
}

// ---------------------------------------------------------------- Temporal

#[test]
fn test_date_absolute() {
    let c = Context::new();
    check(Date::new(DateArgs::ymd(2010, 2, 12)).unwrap(), date(2010, 2, 12), &c);
}

#[test]
fn test_date_delta_years() {
    let c = Context::new();
    let args = DateArgs {
        delta_years: Value::from(-1),
        ..DateArgs::ymd(2010, 2, 12)
    };
    check(Date::new(args).unwrap(), date(2009, 2, 12), &c);
}

#[test]
fn test_date_defaults_to_today() {
    let c = Context::new();
    check(Date::new(DateArgs::default()).unwrap(), date(2010, 3, 31), &c);
    let args = DateArgs {
        delta_days: Value::from(1),
        ..Default::default()
    };
    check(Date::new(args).unwrap(), date(2010, 4, 1), &c);
}

#[test]
fn test_date_clamps_day() {
    let c = Context::new();
    let args = DateArgs {
        delta_years: Value::from(1),
        ..DateArgs::ymd(2020, 2, 29)
    };
    check(Date::new(args).unwrap(), date(2021, 2, 28), &c);
    let args = DateArgs {
        month: Value::from(2),
        ..Default::default()
    };
    check(Date::new(args).unwrap(), date(2010, 2, 28), &c);
    let args = DateArgs {
        delta_months: Value::from(-13),
        ..Default::default()
    };
    check(Date::new(args).unwrap(), date(2009, 2, 28), &c);
}

#[test]
fn test_date_from_start() {
    let c = ctx(json!({"since": {"__class__": "date", "year": 2020, "month": 1, "day": 31}}));
    let args = DateArgs {
        delta_days: Value::from(1),
        start: Eval::new("since", Value::Null).into(),
        ..Default::default()
    };
    check(Date::new(args).unwrap(), date(2020, 2, 1), &c);
}

#[test]
fn test_datetime() {
    let c = Context::new();
    let args = DateTimeArgs {
        date: DateArgs::ymd(2010, 1, 1),
        hour: Value::from(12),
        delta_hours: Value::from(2),
        ..Default::default()
    };
    check(DateTime::new(args).unwrap(), datetime(2010, 1, 1, 14, 30, 0), &c);
}

#[test]
fn test_datetime_defaults_to_now() {
    let c = Context::new();
    check(
        DateTime::new(DateTimeArgs::default()).unwrap(),
        datetime(2010, 3, 31, 10, 30, 0),
        &c,
    );
}

#[test]
fn test_datetime_time_overflow_carries() {
    let c = Context::new();
    let args = DateTimeArgs {
        date: DateArgs::ymd(2010, 1, 1),
        hour: Value::from(25),
        minute: Value::from(0),
        second: Value::from(0),
        ..Default::default()
    };
    check(DateTime::new(args).unwrap(), datetime(2010, 1, 2, 1, 0, 0), &c);
}

#[test]
fn test_datetime_microseconds() {
    let c = Context::new();
    let args = DateTimeArgs {
        date: DateArgs::ymd(2010, 1, 1),
        second: Value::from(0),
        microsecond: Value::from(500),
        delta_microseconds: Value::from(250),
        ..Default::default()
    };
    let expected = date(2010, 1, 1).and_hms_micro_opt(10, 30, 0, 750).unwrap();
    check(DateTime::new(args).unwrap(), expected, &c);
}

#[test]
fn test_timedelta() {
    let c = Context::new();
    let expected = Duration::days(1) + Duration::seconds(30) + Duration::microseconds(500);
    check(TimeDelta::new(1, 30, 500).unwrap(), expected, &c);
    check(TimeDelta::new(0, 0, 0).unwrap(), Duration::zero(), &c);
}

// ----------------------------------------------------------------- Nesting

#[test]
fn test_nested_expression_in_plain_structure() {
    let c = ctx(json!({"state": "done"}));
    let mut attrs = Map::new();
    attrs.insert(
        "readonly".to_string(),
        Equal::new(Eval::new("state", ""), "done").unwrap().into(),
    );
    attrs.insert("label".to_string(), Value::from("State"));
    let mut expected = Map::new();
    expected.insert("readonly".to_string(), Value::Bool(true));
    expected.insert("label".to_string(), Value::from("State"));
    check(attrs, expected, &c);
}
