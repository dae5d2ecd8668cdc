//! Lazy, single-shot coroutine awaitable.
//!
//! # Design background (Why)
//! - Maps `task<T>` directly onto Rust's native laziness: a `Future` does nothing until
//!   polled, so `Task<T>` needs no "initial-suspend" bookkeeping of its own — wrapping the
//!   inner future and awaiting it for the first time *is* the initial suspend.
use alloc::boxed::Box;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::cancellation::CancellationSlot;
use crate::error::{Result, StrandError};

/// A one-shot lazy awaitable.
///
/// # Contract (What)
/// - Does not run until polled (awaited or handed to [`crate::promise::Promise::spawn`]).
/// - May be awaited at most once: a second `.await` after completion yields
///   [`StrandError::already_awaited`] rather than re-running the body.
pub struct Task<T> {
    inner: Pin<Box<dyn Future<Output = Result<T>>>>,
    cancellation: CancellationSlot,
    consumed: bool,
}

impl<T> Task<T> {
    /// Wraps a future as a lazy, single-shot task bound to `cancellation`.
    pub fn new<F>(cancellation: CancellationSlot, future: F) -> Self
    where
        F: Future<Output = Result<T>> + 'static,
    {
        Self {
            inner: Box::pin(future),
            cancellation,
            consumed: false,
        }
    }

    /// Wraps an infallible future, treating it as always succeeding.
    pub fn from_infallible<F>(cancellation: CancellationSlot, future: F) -> Self
    where
        F: Future<Output = T> + 'static,
    {
        Self::new(cancellation, async move { Ok(future.await) })
    }

    /// The cancellation slot this task observes at its own suspension points.
    pub fn cancellation(&self) -> &CancellationSlot {
        &self.cancellation
    }
}

impl<T> Future for Task<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.consumed {
            return Poll::Ready(Err(StrandError::already_awaited()));
        }
        if let Err(err) = this.cancellation.throw_if_cancelled() {
            this.consumed = true;
            return Poll::Ready(Err(err));
        }
        match this.inner.as_mut().poll(cx) {
            Poll::Ready(result) => {
                this.consumed = true;
                Poll::Ready(result)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
