//! Task list module
//!
//! The ordered execution plan of a coordinator: sub-task handles paired
//! with optional completion callbacks.

mod list;

pub use list::{Callback, TaskEntry, TaskList};
