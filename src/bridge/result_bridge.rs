//! Result bridge - the coordinator's own suspension stream.
//!
//! Replays a fixed list of step values and then reports completion with the
//! terminal value, forever. This is what a driver actually pulls on.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{trace, warn};

use crate::error::{AwaitableError, Result};
use crate::grow::TryPush;
use crate::suspend::{Step, SuspensionPoint};
use crate::value::Value;

/// Progress of a bridge through its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Nothing has been read yet
    NotStarted,
    /// At least one step has been read and more may follow
    Active,
    /// Every step was read; reads now report completion
    Exhausted,
}

/// Shared slot for a bridge's terminal value.
///
/// The coordinator keeps one of these after handing the bridge to its
/// driver, so the terminal can still be set until the driver reads it.
#[derive(Debug, Clone, Default)]
pub struct ResultHandle(Arc<Mutex<Option<Value>>>);

impl ResultHandle {
    pub fn set(&self, value: impl Into<Value>) {
        *self.lock() = Some(value.into());
    }

    pub fn get(&self) -> Option<Value> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Value>> {
        // Writes replace the slot whole; a poisoned lock still holds a valid value
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct ResultBridge {
    steps: Vec<Value>,
    cursor: usize,
    result: ResultHandle,
    state: BridgeState,
}

impl ResultBridge {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cursor: 0,
            result: ResultHandle::default(),
            state: BridgeState::NotStarted,
        }
    }

    /// Append a step to replay. On allocation failure the bridge is unchanged.
    pub fn push_step(&mut self, value: impl Into<Value>) -> Result<()> {
        self.steps.try_push(value.into())
    }

    /// Set the terminal value. Later calls overwrite earlier ones.
    pub fn set_result(&mut self, value: impl Into<Value>) {
        self.result.set(value);
    }

    /// The terminal value reported once the steps run out.
    pub fn result(&self) -> Value {
        self.result.get().unwrap_or_default()
    }

    pub fn has_result(&self) -> bool {
        self.result.get().is_some()
    }

    /// A handle that sets this bridge's terminal value from elsewhere.
    pub fn handle(&self) -> ResultHandle {
        self.result.clone()
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == BridgeState::Exhausted
    }

    /// Number of steps not yet read
    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }

    /// Read the next step, or the terminal value once the steps run out.
    pub fn pull_step(&mut self) -> Result<Step> {
        if self.steps.is_empty() {
            return Err(AwaitableError::state("bridge has no values"));
        }

        if self.cursor < self.steps.len() {
            let value = self.steps[self.cursor].clone();
            self.cursor += 1;
            self.state = BridgeState::Active;
            trace!("Bridge step {}/{}", self.cursor, self.steps.len());
            return Ok(Step::Yielded(value));
        }

        if self.state != BridgeState::Exhausted {
            trace!("Bridge exhausted");
            self.state = BridgeState::Exhausted;
        }
        Ok(Step::Complete(self.result()))
    }
}

impl Default for ResultBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspensionPoint for ResultBridge {
    fn pull(&mut self) -> Result<Step> {
        self.pull_step()
    }
}

/// Yields the step values; read `result()` after the iterator ends.
///
/// A bridge with no steps ends immediately. Use `pull_step` to see that as
/// an error instead of an ordinary end.
impl Iterator for ResultBridge {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self.pull_step() {
            Ok(Step::Yielded(value)) => Some(value),
            Ok(Step::Complete(_)) => None,
            Err(e) => {
                warn!("Bridge iteration ended early: {}", e);
                None
            }
        }
    }
}
