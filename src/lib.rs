//! Awaitable - a continuation coordinator
//!
//! A `Coordinator` drives a list of suspendable sub-tasks to completion in
//! registration order, calling an optional callback with each sub-task's
//! terminal value. Callbacks share state through an order-indexed value
//! store, and the coordinator's own progress is exposed as a `ResultBridge`
//! iterator or, via `IntoFuture`, as something you can `.await`.

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod error;
mod grow;
pub mod store;
pub mod suspend;
pub mod tasks;
pub mod value;

pub use bridge::{BridgeState, ResultBridge, ResultHandle};
pub use config::CoordinatorConfig;
pub use coordinator::{Awaiting, Coordinator};
pub use error::{AwaitableError, Result};
pub use store::ValueStore;
pub use suspend::{FutureTask, Inert, Ready, Scripted, Step, Subtask, SuspensionPoint, from_fn};
pub use tasks::{Callback, TaskEntry, TaskList};
pub use value::{Slot, Value};
