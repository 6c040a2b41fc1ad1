//! Suspension protocol module
//!
//! Defines what it means for a sub-task to be suspendable: a `Subtask`
//! hands out a `SuspensionPoint`, which is pulled one `Step` at a time
//! until it completes or raises. Stock adapters live in `adapters`.

pub mod adapters;
pub mod traits;

pub use adapters::{FromFn, FutureTask, Inert, Ready, Scripted, from_fn};
pub use traits::{Step, Subtask, SuspensionPoint};
