// Suspension protocol - core interfaces
// Anything registered on a coordinator must expose a suspension point

use crate::error::{AwaitableError, Result};
use crate::value::Value;

/// One pull from a suspension point.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// An intermediate value; the computation is still running
    Yielded(Value),
    /// The computation finished with its terminal value
    Complete(Value),
}

impl Step {
    /// Check if this step ends the computation
    pub fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }

    /// Get the carried value
    pub fn into_value(self) -> Value {
        match self {
            Step::Yielded(v) | Step::Complete(v) => v,
        }
    }
}

/// A running computation that can be pulled for its next step.
///
/// After `Step::Complete` the behaviour of further pulls is up to the
/// implementor; the coordinator never pulls a completed point again.
pub trait SuspensionPoint: Send {
    /// Advance the computation by one step
    fn pull(&mut self) -> Result<Step>;
}

impl<F> SuspensionPoint for F
where
    F: FnMut() -> Result<Step> + Send,
{
    fn pull(&mut self) -> Result<Step> {
        self()
    }
}

/// A handle that can be registered on a coordinator.
pub trait Subtask: Send + Sync {
    /// Human readable name, used in logs and capability errors
    fn describe(&self) -> String;

    /// Start a fresh run of this sub-task.
    ///
    /// The default reports that the sub-task has no suspension capability.
    fn suspension_point(&self) -> Result<Box<dyn SuspensionPoint>> {
        Err(AwaitableError::Capability(self.describe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCapability;

    impl Subtask for NoCapability {
        fn describe(&self) -> String {
            "no-capability".to_string()
        }
    }

    struct Countdown(i64);

    impl Subtask for Countdown {
        fn describe(&self) -> String {
            format!("countdown({})", self.0)
        }

        fn suspension_point(&self) -> Result<Box<dyn SuspensionPoint>> {
            let mut remaining = self.0;
            Ok(Box::new(move || -> Result<Step> {
                if remaining == 0 {
                    Ok(Step::Complete(Value::from("liftoff")))
                } else {
                    remaining -= 1;
                    Ok(Step::Yielded(Value::Int(remaining)))
                }
            }))
        }
    }

    #[test]
    fn test_step_is_complete() {
        assert!(Step::Complete(Value::None).is_complete());
        assert!(!Step::Yielded(Value::None).is_complete());
    }

    #[test]
    fn test_step_into_value() {
        assert_eq!(Step::Yielded(Value::Int(1)).into_value(), Value::Int(1));
        assert_eq!(Step::Complete(Value::from("x")).into_value(), Value::from("x"));
    }

    #[test]
    fn test_default_suspension_point_is_capability_error() {
        let err = NoCapability.suspension_point().err().unwrap();
        assert!(matches!(err, AwaitableError::Capability(ref name) if name == "no-capability"));
    }

    #[test]
    fn test_closure_suspension_point() {
        let mut point = Countdown(2).suspension_point().unwrap();
        assert_eq!(point.pull().unwrap(), Step::Yielded(Value::Int(1)));
        assert_eq!(point.pull().unwrap(), Step::Yielded(Value::Int(0)));
        assert_eq!(point.pull().unwrap(), Step::Complete(Value::from("liftoff")));
    }

    #[test]
    fn test_each_suspension_point_is_fresh() {
        let task = Countdown(1);
        let mut first = task.suspension_point().unwrap();
        first.pull().unwrap();
        let mut second = task.suspension_point().unwrap();
        assert_eq!(second.pull().unwrap(), Step::Yielded(Value::Int(0)));
    }
}
