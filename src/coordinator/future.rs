//! Await bridge - lets a coordinator be `.await`ed directly.
//!
//! The first poll runs the drive cycle. Each step the bridge yields becomes
//! one `Poll::Pending` (with an immediate wake), and the terminal value
//! resolves the future.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

use super::core::Coordinator;
use crate::bridge::ResultBridge;
use crate::error::{AwaitableError, Result};
use crate::suspend::Step;
use crate::value::Value;

/// Future returned by `Coordinator::into_future()`.
#[derive(Debug)]
pub struct Awaiting {
    coordinator: Coordinator,
    bridge: Option<ResultBridge>,
}

impl Awaiting {
    /// The coordinator being awaited
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }
}

impl Future for Awaiting {
    type Output = Result<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.bridge.is_none() {
            match this.coordinator.advance() {
                Ok(bridge) => this.bridge = Some(bridge),
                Err(e) => return Poll::Ready(Err(e)),
            }
        }

        let step = match this.bridge.as_mut() {
            Some(bridge) => bridge.pull_step(),
            None => Err(AwaitableError::state("no bridge is currently present")),
        };

        match step {
            Ok(Step::Yielded(_)) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Ok(Step::Complete(value)) => Poll::Ready(Ok(value)),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

impl IntoFuture for Coordinator {
    type Output = Result<Value>;
    type IntoFuture = Awaiting;

    fn into_future(self) -> Self::IntoFuture {
        Awaiting {
            coordinator: self,
            bridge: None,
        }
    }
}
