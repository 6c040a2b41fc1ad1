//! Coordinators as sub-tasks.
//!
//! A coordinator behind a mutex can be registered on another coordinator.
//! Its suspension point is the bridge its own drive cycle produces, so the
//! parent sees the placeholder step and then the child's terminal value.

use std::sync::{Mutex, TryLockError};

use super::core::Coordinator;
use crate::error::{AwaitableError, Result};
use crate::suspend::{Subtask, SuspensionPoint};

impl Subtask for Mutex<Coordinator> {
    fn describe(&self) -> String {
        match self.try_lock() {
            Ok(coordinator) => format!("coordinator({} pending)", coordinator.tasks().pending()),
            Err(TryLockError::WouldBlock) => "coordinator(busy)".to_string(),
            Err(TryLockError::Poisoned(_)) => "coordinator(poisoned)".to_string(),
        }
    }

    fn suspension_point(&self) -> Result<Box<dyn SuspensionPoint>> {
        // try_lock: a coordinator registered on itself must fail, not deadlock
        let mut coordinator = match self.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(AwaitableError::state("coordinator is already being driven"));
            }
            Err(TryLockError::Poisoned(_)) => {
                return Err(AwaitableError::state("coordinator lock poisoned"));
            }
        };
        let bridge = coordinator.advance()?;
        Ok(Box::new(bridge))
    }
}
