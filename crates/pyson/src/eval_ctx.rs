use crate::context::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;

pub type NowFn = dyn Fn() -> NaiveDateTime + Send + Sync;

/// The execution context passed to every node eval function.
pub struct EvalCtx<'a> {
    /// Variable bindings, read-only.
    pub context: &'a Context,
    /// Optional clock override for `Date`/`DateTime` without a start value.
    pub now: Option<Arc<NowFn>>,
}

impl<'a> EvalCtx<'a> {
    pub fn new(context: &'a Context) -> Self {
        EvalCtx { context, now: None }
    }

    pub fn with_now(mut self, now: Arc<NowFn>) -> Self {
        self.now = Some(now);
        self
    }

    /// Current instant, naive UTC.
    pub fn now(&self) -> NaiveDateTime {
        match &self.now {
            Some(now) => now(),
            None => Utc::now().naive_utc(),
        }
    }

    /// Current local date, or the date of the overridden clock.
    pub fn today(&self) -> NaiveDate {
        match &self.now {
            Some(now) => now().date(),
            None => Local::now().date_naive(),
        }
    }
}
