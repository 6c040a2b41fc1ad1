//! Order-indexed value store.
//!
//! Callbacks run after the coordinator has handed control back to its
//! driver, so anything they need from earlier in the drive is stashed here.
//! Indices are stable: the store only ever grows.

use std::any::Any;
use std::sync::Arc;

use crate::error::{AwaitableError, Result};
use crate::grow::TryPush;
use crate::value::{Slot, Value};

#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    values: Vec<Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with room for `capacity` values up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut values = Vec::new();
        values.try_reserve(capacity)?;
        Ok(Self { values })
    }

    /// Append one value and return its index. On allocation failure the
    /// store is left unchanged.
    pub fn save(&mut self, value: impl Into<Value>) -> Result<usize> {
        self.values.try_push(value.into())?;
        Ok(self.values.len() - 1)
    }

    /// Append a batch of values. Either every value is appended or none is.
    pub fn save_many<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter();
        self.values.try_reserve(values.size_hint().0)?;

        let start = self.values.len();
        for value in values {
            if let Err(e) = self.values.try_push(value.into()) {
                self.values.truncate(start);
                return Err(e);
            }
        }
        if self.values.len() == start {
            return Err(AwaitableError::state("save_many requires at least one value"));
        }
        Ok(())
    }

    /// Copy stored values, by position, into the caller's output slots.
    ///
    /// A `None` slot is skipped. Slots past the end of the store are left
    /// untouched; values past the last slot are not written anywhere.
    pub fn unpack(&self, out: &mut [Option<&mut Value>]) -> Result<()> {
        if self.values.is_empty() {
            return Err(AwaitableError::state("object has no values"));
        }
        for (slot, value) in out.iter_mut().zip(&self.values) {
            if let Some(target) = slot {
                **target = value.clone();
            }
        }
        Ok(())
    }

    /// Stash a typed value and get back a key that recovers it with its type.
    pub fn save_as<T: Any + Send + Sync>(&mut self, value: T) -> Result<Slot<T>> {
        let index = self.save(Value::opaque(value))?;
        Ok(Slot::new(index))
    }

    /// Recover a value stored with `save_as`.
    pub fn load<T: Any + Send + Sync>(&self, slot: Slot<T>) -> Result<Arc<T>> {
        let value = self
            .values
            .get(slot.index())
            .ok_or_else(|| AwaitableError::state(format!("no value at index {}", slot.index())))?;
        value.downcast::<T>().ok_or_else(|| {
            AwaitableError::state(format!(
                "value at index {} is {}, not {}",
                slot.index(),
                value.kind(),
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}
