//! Coordinator module - the continuation coordinator itself.
//!
//! This module provides:
//! - Coordinator: drives registered sub-tasks and callbacks in order
//! - Awaiting: the future a coordinator turns into under `.await`
//! - Subtask support for `Mutex<Coordinator>`, so coordinators nest

mod core;
mod future;
mod nested;

pub use self::core::Coordinator;
pub use self::future::Awaiting;
