// Fallible growth for the coordinator's collections
// A failed reservation leaves the collection exactly as it was

use std::collections::VecDeque;

use crate::error::Result;

pub(crate) trait TryPush<T> {
    /// Reserve room for one more item, then append it.
    fn try_push(&mut self, item: T) -> Result<()>;
}

impl<T> TryPush<T> for Vec<T> {
    fn try_push(&mut self, item: T) -> Result<()> {
        self.try_reserve(1)?;
        self.push(item);
        Ok(())
    }
}

impl<T> TryPush<T> for VecDeque<T> {
    fn try_push(&mut self, item: T) -> Result<()> {
        self.try_reserve(1)?;
        self.push_back(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AwaitableError;

    /// A zero-sized vec at its maximum length; the next reservation overflows.
    fn full_vec() -> Vec<()> {
        let mut items = Vec::new();
        // SAFETY: a Vec of a zero-sized type has capacity usize::MAX and
        // every `()` is trivially initialised.
        unsafe { items.set_len(usize::MAX) };
        items
    }

    #[test]
    fn test_try_push_appends() {
        let mut items = vec![1, 2];
        items.try_push(3).unwrap();
        assert_eq!(items, vec![1, 2, 3]);

        let mut queue = VecDeque::from(vec![1]);
        queue.try_push(2).unwrap();
        assert_eq!(queue, VecDeque::from(vec![1, 2]));
    }

    #[test]
    fn test_try_push_failure_leaves_vec_unchanged() {
        let mut items = full_vec();
        let err = items.try_push(()).unwrap_err();
        assert!(matches!(err, AwaitableError::Allocation(_)));
        assert_eq!(items.len(), usize::MAX);
    }

    #[test]
    fn test_try_push_failure_leaves_deque_unchanged() {
        let mut queue = VecDeque::from(full_vec());
        let err = queue.try_push(()).unwrap_err();
        assert!(matches!(err, AwaitableError::Allocation(_)));
        assert_eq!(queue.len(), usize::MAX);
    }
}
