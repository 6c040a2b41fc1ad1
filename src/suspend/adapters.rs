//! Stock sub-task implementations.
//!
//! These cover the shapes a caller usually has on hand: a value that is
//! already known, a fixed script of steps, a factory closure, a Rust future,
//! and a plain value that cannot be awaited at all.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::vec;

use futures::task::noop_waker_ref;
use log::warn;

use super::traits::{Step, Subtask, SuspensionPoint};
use crate::error::{AwaitableError, Result};
use crate::value::Value;

/// Completes immediately with a known value.
#[derive(Debug, Clone)]
pub struct Ready(pub Value);

impl Ready {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }
}

impl Subtask for Ready {
    fn describe(&self) -> String {
        format!("ready({:?})", self.0)
    }

    fn suspension_point(&self) -> Result<Box<dyn SuspensionPoint>> {
        let value = self.0.clone();
        Ok(Box::new(move || -> Result<Step> { Ok(Step::Complete(value.clone())) }))
    }
}

/// Replays a fixed list of yields, then completes or raises.
///
/// Every drive gets its own replay, so one script can be registered on
/// several coordinators.
#[derive(Debug, Clone)]
pub struct Scripted {
    name: String,
    yields: Vec<Value>,
    outcome: std::result::Result<Value, String>,
}

impl Scripted {
    /// Create a script that completes with `Value::None` and yields nothing
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            yields: Vec::new(),
            outcome: Ok(Value::None),
        }
    }

    /// Set the intermediate values (builder pattern)
    pub fn yields(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.yields = values.into_iter().collect();
        self
    }

    /// Complete with `value` after the yields
    pub fn returns(mut self, value: impl Into<Value>) -> Self {
        self.outcome = Ok(value.into());
        self
    }

    /// Raise `message` after the yields
    pub fn raises(mut self, message: impl Into<String>) -> Self {
        self.outcome = Err(message.into());
        self
    }
}

impl Subtask for Scripted {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn suspension_point(&self) -> Result<Box<dyn SuspensionPoint>> {
        Ok(Box::new(ScriptRun {
            yields: self.yields.clone().into_iter(),
            outcome: Some(self.outcome.clone()),
        }))
    }
}

struct ScriptRun {
    yields: vec::IntoIter<Value>,
    outcome: Option<std::result::Result<Value, String>>,
}

impl SuspensionPoint for ScriptRun {
    fn pull(&mut self) -> Result<Step> {
        if let Some(value) = self.yields.next() {
            return Ok(Step::Yielded(value));
        }
        match self.outcome.take() {
            Some(Ok(value)) => Ok(Step::Complete(value)),
            Some(Err(message)) => Err(AwaitableError::Raised(message)),
            None => Err(AwaitableError::state("script already finished")),
        }
    }
}

/// Builds a fresh suspension point from a factory on every drive.
pub struct FromFn<F> {
    name: String,
    factory: F,
}

/// Create a sub-task from a suspension point factory.
pub fn from_fn<F>(name: impl Into<String>, factory: F) -> FromFn<F>
where
    F: Fn() -> Box<dyn SuspensionPoint> + Send + Sync,
{
    FromFn {
        name: name.into(),
        factory,
    }
}

impl<F> Subtask for FromFn<F>
where
    F: Fn() -> Box<dyn SuspensionPoint> + Send + Sync,
{
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn suspension_point(&self) -> Result<Box<dyn SuspensionPoint>> {
        Ok((self.factory)())
    }
}

type BoxedFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// Pending polls after which a future is reported as probably stuck
const STALLED_POLLS: u64 = 10_000;

/// Drives a Rust future as a sub-task.
///
/// The future is polled with a no-op waker; each `Pending` counts as one
/// yielded step. Only futures that make progress when polled (no external
/// reactor) will complete; one that keeps returning `Pending` is logged once
/// after `STALLED_POLLS` polls. Pair it with `max_steps_per_task` to bound
/// the spin. A future runs once, so the task can only be drained by a
/// single coordinator.
pub struct FutureTask {
    name: String,
    future: Mutex<Option<BoxedFuture>>,
}

impl FutureTask {
    pub fn new<F>(name: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            future: Mutex::new(Some(Box::pin(future))),
        }
    }
}

impl Subtask for FutureTask {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn suspension_point(&self) -> Result<Box<dyn SuspensionPoint>> {
        let mut guard = self
            .future
            .lock()
            .map_err(|_| AwaitableError::state(format!("{} lock poisoned", self.name)))?;
        let future = guard
            .take()
            .ok_or_else(|| AwaitableError::state(format!("{} was already awaited", self.name)))?;
        Ok(Box::new(PollingPoint {
            name: self.name.clone(),
            future: Some(future),
            pending_polls: 0,
        }))
    }
}

struct PollingPoint {
    name: String,
    future: Option<BoxedFuture>,
    pending_polls: u64,
}

impl SuspensionPoint for PollingPoint {
    fn pull(&mut self) -> Result<Step> {
        let Some(future) = self.future.as_mut() else {
            return Err(AwaitableError::state("future already resolved"));
        };

        let mut cx = Context::from_waker(noop_waker_ref());
        match future.as_mut().poll(&mut cx) {
            Poll::Pending => {
                self.pending_polls += 1;
                if self.pending_polls == STALLED_POLLS {
                    warn!(
                        "{} still pending after {} polls; it may need a runtime to make progress",
                        self.name, self.pending_polls
                    );
                }
                Ok(Step::Yielded(Value::None))
            }
            Poll::Ready(result) => {
                self.future = None;
                result.map(Step::Complete)
            }
        }
    }
}

/// A plain value with no suspension capability.
#[derive(Debug, Clone)]
pub struct Inert(pub Value);

impl Subtask for Inert {
    fn describe(&self) -> String {
        format!("inert({:?})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(task: &dyn Subtask) -> Result<(Vec<Value>, Value)> {
        let mut point = task.suspension_point()?;
        let mut yielded = Vec::new();
        loop {
            match point.pull()? {
                Step::Yielded(v) => yielded.push(v),
                Step::Complete(v) => return Ok((yielded, v)),
            }
        }
    }

    #[test]
    fn test_ready_completes_immediately() {
        let (yielded, result) = drain(&Ready::new(42i64)).unwrap();
        assert!(yielded.is_empty());
        assert_eq!(result, Value::Int(42));
    }

    #[test]
    fn test_ready_describe() {
        assert_eq!(Ready::new("x").describe(), "ready(\"x\")");
    }

    #[test]
    fn test_scripted_yields_then_returns() {
        let task = Scripted::new("fetch")
            .yields(vec![Value::Int(1), Value::Int(2)])
            .returns("body");
        let (yielded, result) = drain(&task).unwrap();
        assert_eq!(yielded, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(result, Value::from("body"));
    }

    #[test]
    fn test_scripted_raises() {
        let task = Scripted::new("fetch").yields(vec![Value::None]).raises("timeout");
        let err = drain(&task).unwrap_err();
        assert!(matches!(err, AwaitableError::Raised(ref m) if m == "timeout"));
    }

    #[test]
    fn test_scripted_replays_per_drive() {
        let task = Scripted::new("twice").yields(vec![Value::Int(9)]).returns(1i64);
        assert_eq!(drain(&task).unwrap().1, Value::Int(1));
        assert_eq!(drain(&task).unwrap().1, Value::Int(1));
    }

    #[test]
    fn test_scripted_pull_after_finish() {
        let mut point = Scripted::new("once").suspension_point().unwrap();
        assert!(point.pull().unwrap().is_complete());
        assert!(matches!(point.pull(), Err(AwaitableError::InvalidState(_))));
    }

    #[test]
    fn test_from_fn() {
        let task = from_fn("counter", || -> Box<dyn SuspensionPoint> {
            let mut n = 0i64;
            Box::new(move || -> Result<Step> {
                n += 1;
                if n < 3 { Ok(Step::Yielded(Value::Int(n))) } else { Ok(Step::Complete(Value::Int(n))) }
            })
        });
        assert_eq!(task.describe(), "counter");
        let (yielded, result) = drain(&task).unwrap();
        assert_eq!(yielded.len(), 2);
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn test_future_task_ready() {
        let task = FutureTask::new("async-add", async { Ok(Value::Int(1 + 2)) });
        let (yielded, result) = drain(&task).unwrap();
        assert!(yielded.is_empty());
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn test_future_task_pending_counts_as_yield() {
        let mut polled = false;
        let future = futures::future::poll_fn(move |_cx| {
            if polled {
                Poll::Ready(Ok(Value::from("done")))
            } else {
                polled = true;
                Poll::Pending
            }
        });
        let task = FutureTask::new("two-phase", future);
        let (yielded, result) = drain(&task).unwrap();
        assert_eq!(yielded, vec![Value::None]);
        assert_eq!(result, Value::from("done"));
    }

    #[test]
    fn test_future_task_long_pending_still_completes() {
        let mut polls = 0u64;
        let future = futures::future::poll_fn(move |_cx| {
            polls += 1;
            if polls > STALLED_POLLS + 1 {
                Poll::Ready(Ok(Value::Int(polls as i64)))
            } else {
                Poll::Pending
            }
        });
        let task = FutureTask::new("slow", future);
        let mut point = task.suspension_point().unwrap();

        let mut yields = 0u64;
        let result = loop {
            match point.pull().unwrap() {
                Step::Yielded(_) => yields += 1,
                Step::Complete(v) => break v,
            }
        };
        assert_eq!(yields, STALLED_POLLS + 1);
        assert_eq!(result, Value::Int((STALLED_POLLS + 2) as i64));
    }

    #[test]
    fn test_future_task_error() {
        let task = FutureTask::new("failing", async { Err(AwaitableError::raised("boom")) });
        assert!(matches!(drain(&task), Err(AwaitableError::Raised(_))));
    }

    #[test]
    fn test_future_task_runs_once() {
        let task = FutureTask::new("once", async { Ok(Value::None) });
        assert!(drain(&task).is_ok());
        let err = task.suspension_point().err().unwrap();
        assert!(err.to_string().contains("once was already awaited"));
    }

    #[test]
    fn test_inert_has_no_capability() {
        let err = Inert(Value::Int(42)).suspension_point().err().unwrap();
        assert_eq!(err.to_string(), "inert(42) has no suspension point");
    }
}
