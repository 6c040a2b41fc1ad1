//! Coordinator implementation - drives registered sub-tasks in order.
//!
//! A drive cycle is a single call to `advance()`. It drains every pending
//! sub-task to completion, runs the paired callbacks, and hands back the
//! bridge the driver reads the coordinator's own progress from.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::bridge::{ResultBridge, ResultHandle};
use crate::config::CoordinatorConfig;
use crate::error::{AwaitableError, Result};
use crate::store::ValueStore;
use crate::suspend::{Step, Subtask, SuspensionPoint};
use crate::tasks::{Callback, TaskEntry, TaskList};
use crate::value::{Slot, Value};

/// Where a coordinator is in its single drive cycle.
#[derive(Debug)]
enum DriveState {
    /// Nothing has been driven yet
    Fresh,
    /// `advance()` is running; callbacks may set the result through this handle
    Driving(ResultHandle),
    /// The cycle finished, keeping the bridge's result handle, or aborted
    /// without one; the coordinator cannot be reused
    Done(Option<ResultHandle>),
}

impl DriveState {
    fn name(&self) -> &'static str {
        match self {
            DriveState::Fresh => "fresh",
            DriveState::Driving(_) => "driving",
            DriveState::Done(_) => "done",
        }
    }
}

/// Sequentially drives registered sub-tasks and their completion callbacks.
///
/// Sub-tasks run strictly in registration order. Intermediate steps of a
/// sub-task are drained inside `advance()` and never surface to the caller;
/// the only externally visible step is the placeholder the bridge starts
/// with.
pub struct Coordinator {
    tasks: TaskList,
    values: ValueStore,
    state: DriveState,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            tasks: TaskList::new(),
            values: ValueStore::new(),
            state: DriveState::Fresh,
            config: CoordinatorConfig::default(),
        }
    }

    /// Create a coordinator with custom configuration.
    pub fn with_config(config: CoordinatorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AwaitableError::state(format!("invalid config: {}", e)))?;
        Ok(Self {
            tasks: TaskList::with_capacity(config.task_capacity)?,
            values: ValueStore::with_capacity(config.value_capacity)?,
            state: DriveState::Fresh,
            config,
        })
    }

    /// Register a sub-task with an optional completion callback.
    ///
    /// Allowed before the drive and from callbacks during it; entries added
    /// mid-drive run after the ones already pending.
    pub fn register(&mut self, subtask: Arc<dyn Subtask>, callback: Option<Callback>) -> Result<()> {
        if self.is_done() {
            return Err(AwaitableError::Reuse);
        }
        let entry = TaskEntry::new(subtask, callback);
        debug!(
            "Registering sub-task #{}: {} (callback: {})",
            self.tasks.registered(),
            entry.describe(),
            entry.has_callback()
        );
        self.tasks.push(entry)
    }

    /// Register a sub-task with a callback closure.
    pub fn register_with<F>(&mut self, subtask: Arc<dyn Subtask>, callback: F) -> Result<()>
    where
        F: FnMut(&mut Coordinator, Value) -> Result<()> + Send + 'static,
    {
        self.register(subtask, Some(Box::new(callback)))
    }

    /// Stash a value for a later callback; returns its index.
    pub fn save(&mut self, value: impl Into<Value>) -> Result<usize> {
        self.values.save(value)
    }

    /// Stash several values at once; all or nothing.
    pub fn save_many<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.values.save_many(values)
    }

    /// Copy stashed values into the output slots, skipping `None` slots.
    pub fn unpack(&self, out: &mut [Option<&mut Value>]) -> Result<()> {
        self.values.unpack(out)
    }

    /// Stash a typed value.
    pub fn save_as<T: Any + Send + Sync>(&mut self, value: T) -> Result<Slot<T>> {
        self.values.save_as(value)
    }

    /// Recover a typed value.
    pub fn load<T: Any + Send + Sync>(&self, slot: Slot<T>) -> Result<Arc<T>> {
        self.values.load(slot)
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Set the coordinator's terminal value.
    ///
    /// Valid once a drive has produced a bridge: during the drive, or after
    /// a successful `advance()` until the driver reads the terminal.
    pub fn set_result(&mut self, value: impl Into<Value>) -> Result<()> {
        match &self.state {
            DriveState::Driving(handle) | DriveState::Done(Some(handle)) => {
                handle.set(value);
                Ok(())
            }
            _ => Err(AwaitableError::state("no bridge is currently present")),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, DriveState::Done(_))
    }

    pub fn is_driving(&self) -> bool {
        matches!(self.state, DriveState::Driving(_))
    }

    /// Run the drive cycle and return the coordinator's bridge.
    ///
    /// The first failing sub-task or callback aborts the cycle; later
    /// entries never run. Either way the coordinator ends up done.
    pub fn advance(&mut self) -> Result<ResultBridge> {
        match self.state {
            DriveState::Done(_) => return Err(AwaitableError::Reuse),
            DriveState::Driving(_) => {
                return Err(AwaitableError::state("coordinator is already being driven"));
            }
            DriveState::Fresh => {}
        }

        let mut bridge = ResultBridge::new();
        bridge.push_step(Value::None)?;
        self.state = DriveState::Driving(bridge.handle());

        debug!("Drive started with {} pending sub-task(s)", self.tasks.pending());
        match self.drive() {
            Ok(()) => {
                self.state = DriveState::Done(Some(bridge.handle()));
                debug!("Drive finished after {} sub-task(s)", self.tasks.registered());
                Ok(bridge)
            }
            Err(e) => {
                self.state = DriveState::Done(None);
                warn!("Drive aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Drive to completion without a runtime and return the terminal value.
    pub fn run(&mut self) -> Result<Value> {
        let mut bridge = self.advance()?;
        loop {
            if let Step::Complete(value) = bridge.pull_step()? {
                return Ok(value);
            }
        }
    }

    fn drive(&mut self) -> Result<()> {
        while let Some(TaskEntry { subtask, callback }) = self.tasks.pop_next() {
            let name = subtask.describe();
            let index = self.tasks.registered() - self.tasks.pending() - 1;
            debug!("Driving sub-task #{}: {}", index, name);

            let mut point = subtask.suspension_point()?;
            let value = self.drain(&name, &mut *point)?;

            if let Some(mut callback) = callback {
                callback(self, value)?;
            }
        }
        Ok(())
    }

    /// Pull a suspension point until it completes.
    fn drain(&self, name: &str, point: &mut dyn SuspensionPoint) -> Result<Value> {
        let mut steps: u64 = 0;
        loop {
            match point.pull()? {
                Step::Yielded(value) => {
                    steps += 1;
                    if self.config.trace_steps {
                        trace!("{} yielded step {}: {:?}", name, steps, value);
                    }
                    if let Some(limit) = self.config.max_steps_per_task {
                        if steps > limit {
                            return Err(AwaitableError::StepLimit {
                                task: name.to_string(),
                                limit,
                            });
                        }
                    }
                }
                Step::Complete(value) => {
                    debug!("{} completed after {} step(s)", name, steps);
                    return Ok(value);
                }
            }
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("state", &self.state.name())
            .field("pending", &self.tasks.pending())
            .field("registered", &self.tasks.registered())
            .field("values", &self.values.len())
            .finish()
    }
}
