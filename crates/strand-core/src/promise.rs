//! Eagerly-started, shareable coroutine handle.
//!
//! # Design background (Why)
//! - `promise<T>` starts at construction and can be polled for readiness without consuming it
//!   (`ready()`/`get()`), then awaited exactly once to transport the result out. The eager
//!   start is implemented with [`crate::kernel::drive`], which begins polling the wrapped
//!   future on its very first executor turn — no user code needs to poll it manually.
#![cfg(feature = "std")]

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::cancellation::{CancellationSignal, CancellationType};
use crate::error::{Result, StrandError};
use crate::executor::LocalExecutor;
use crate::kernel::{self, SharedHandle};

/// An eagerly-started, queryable coroutine handle.
///
/// # Contract (What)
/// - Starts running on `executor` the moment [`Promise::spawn`] returns.
/// - `ready()`/`get()` are non-suspending: `get()` is only valid once `ready()` is true.
/// - A second `.await` after completion re-yields the stored result rather than erroring —
///   unlike [`crate::task::Task`], repeated awaits on an already-finished `Promise` are
///   idempotent.
/// - `cancel(mask)` emits into the promise's own signal; by default this cancels with every
///   bit set (`CancellationType::ALL`).
pub struct Promise<T> {
    shared: SharedHandle<T>,
    signal: CancellationSignal,
}

impl<T: Clone + 'static> Promise<T> {
    /// Spawns `future` onto `executor`, starting it immediately. The future owns no
    /// cancellation slot of its own and so cannot observe [`Promise::cancel`] — use
    /// [`Promise::spawn_cancellable`] for a body that should react to it.
    pub fn spawn<F>(executor: LocalExecutor, future: F) -> Self
    where
        F: Future<Output = Result<T>> + 'static,
    {
        Self::spawn_cancellable(executor, |_slot| future)
    }

    /// Spawns a future built from this promise's own cancellation slot, so the body can check
    /// `slot.throw_if_cancelled()` at its suspension points and react to [`Promise::cancel`].
    ///
    /// The promise owns its own [`CancellationSignal`]; a caller that wants cancelling some
    /// enclosing scope to also cancel this promise does so explicitly — see how
    /// [`crate::combinators::race`] and friends call [`Promise::cancel`] on every live child
    /// when their own slot observes cancellation, rather than this constructor reaching
    /// upward for a parent on its own.
    pub fn spawn_cancellable<F, Fut>(executor: LocalExecutor, build: F) -> Self
    where
        F: FnOnce(crate::cancellation::CancellationSlot) -> Fut,
        Fut: Future<Output = Result<T>> + 'static,
    {
        let signal = CancellationSignal::new();
        let slot = signal.slot();
        let shared = SharedHandle::new(slot.clone());
        let future = build(slot);
        kernel::drive(executor, alloc::boxed::Box::pin(future), shared.clone());
        Self { shared, signal }
    }

    /// True once the result is available without suspending.
    pub fn ready(&self) -> bool {
        self.shared.is_ready()
    }

    /// Returns the stored result; only meaningful once [`Promise::ready`] is true. Returns
    /// [`StrandError::not_ready`] otherwise.
    pub fn get(&self) -> Result<T> {
        self.shared.peek_clone().unwrap_or_else(|| Err(StrandError::not_ready()))
    }

    /// Emits `mask` into this promise's own cancellation signal.
    pub fn cancel(&self, mask: CancellationType) {
        self.signal.emit(mask);
    }

    /// Shorthand for `cancel(CancellationType::ALL)`.
    pub fn cancel_all(&self) {
        self.cancel(CancellationType::ALL);
    }

    /// Detaches this promise: it keeps running to completion on its executor and its result is
    /// discarded. Equivalent to dropping the handle, since a `Promise` never owns back-pressure
    /// on its own future — the returned value exists purely for readability at call sites.
    pub fn detach(self) {
        drop(self);
    }
}

impl<T: Clone + 'static> Future for Promise<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().shared.poll_peek(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::LocalExecutor;

    #[test]
    fn promise_starts_eagerly() {
        use alloc::rc::Rc;
        use core::cell::Cell;

        let exec = LocalExecutor::new();
        let started = Rc::new(Cell::new(false));
        let flag = started.clone();
        let promise = Promise::spawn(exec.clone(), async move {
            flag.set(true);
            Ok::<_, StrandError>(5)
        });
        exec.run_until_idle();
        assert!(started.get(), "Promise must start without being awaited");
        assert!(promise.ready());
        assert_eq!(promise.get().unwrap(), 5);
    }

    #[test]
    fn repeated_get_is_idempotent() {
        let exec = LocalExecutor::new();
        let promise = Promise::spawn(exec.clone(), async { Ok::<_, StrandError>(1) });
        exec.run_until_idle();
        assert_eq!(promise.get().unwrap(), 1);
        assert_eq!(promise.get().unwrap(), 1);
    }

    #[test]
    fn not_ready_before_completion() {
        let exec = LocalExecutor::new();
        let promise = Promise::<i32>::spawn(exec.clone(), async {
            core::future::pending::<()>().await;
            Ok(1)
        });
        assert!(!promise.ready());
        assert_eq!(promise.get().unwrap_err().kind(), crate::error::ErrorKind::NotReady);
    }
}
