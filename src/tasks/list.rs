// Task list - ordered sub-task registrations
// Entries are consumed front to back, exactly once

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::grow::TryPush;
use crate::suspend::Subtask;
use crate::value::Value;

/// Invoked with the coordinator and the sub-task's terminal value after the
/// sub-task completes without raising. Returning an error aborts the drive.
pub type Callback = Box<dyn FnMut(&mut Coordinator, Value) -> Result<()> + Send>;

/// A registered sub-task and its optional completion callback.
pub struct TaskEntry {
    /// Shared with whoever registered it
    pub subtask: Arc<dyn Subtask>,
    pub callback: Option<Callback>,
}

impl TaskEntry {
    pub fn new(subtask: Arc<dyn Subtask>, callback: Option<Callback>) -> Self {
        Self { subtask, callback }
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn describe(&self) -> String {
        self.subtask.describe()
    }
}

impl fmt::Debug for TaskEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskEntry")
            .field("subtask", &self.subtask.describe())
            .field("callback", &self.has_callback())
            .finish()
    }
}

/// The execution plan of a coordinator.
#[derive(Debug, Default)]
pub struct TaskList {
    /// Entries not yet driven, in registration order
    pending: VecDeque<TaskEntry>,
    /// Every entry ever appended
    registered: usize,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list with room for `capacity` entries up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut pending = VecDeque::new();
        pending.try_reserve(capacity)?;
        Ok(Self { pending, registered: 0 })
    }

    /// Append an entry. On allocation failure the list is unchanged.
    pub fn push(&mut self, entry: TaskEntry) -> Result<()> {
        self.pending.try_push(entry)?;
        self.registered += 1;
        Ok(())
    }

    /// Take the next entry to drive.
    pub fn pop_next(&mut self) -> Option<TaskEntry> {
        self.pending.pop_front()
    }

    /// Number of entries not yet driven
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of entries ever registered
    pub fn registered(&self) -> usize {
        self.registered
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Descriptions of the pending entries, in execution order
    pub fn descriptions(&self) -> Vec<String> {
        self.pending.iter().map(TaskEntry::describe).collect()
    }
}
