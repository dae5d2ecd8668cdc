//! Shared per-coroutine state and the waker-driven polling loop.
//!
//! # Design background (Why)
//! - Separates "the handle a caller holds" from "the thing the executor actually drives"; this
//!   module is the latter half — the piece [`crate::task::Task`] and [`crate::promise::Promise`]
//!   both sit on top of.
//! - Rust's `Future` is lazy by construction (nothing happens until `poll` is called), which is
//!   exactly the semantic gap between a lazy task and an eager promise — `Task` simply never
//!   drives the future until awaited, while `Promise::spawn_eager` immediately hands it to
//!   [`drive`] so it starts making progress on its first executor turn. No separate "promise
//!   frame" type is needed the way a coroutine ABI would require one.
//!
//! # Concurrency model (How)
//! - `Rc<RefCell<Shared<T>>>` is the single allocation backing both a `Task`'s and a
//!   `Promise`'s result: outcome storage, the awaiter's `Waker`, and the [`CancellationSlot`]
//!   the owning coroutine observes at its suspension points.
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::cancellation::CancellationSlot;
use crate::error::{Result, StrandError};
use crate::executor::{Executor, LocalExecutor};

/// Disengaged-until-complete result storage, mirroring the promise's `result`/`exception`
/// pair collapsed into one slot (Rust's `Result` already unions the two).
enum Outcome<T> {
    Pending,
    Ready(Result<T>),
    Taken,
}

fn clone_result<T: Clone>(result: &Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value.clone()),
        Err(err) => {
            let message: alloc::string::String = err.message().into();
            Err(StrandError::new(err.code(), err.kind(), message))
        }
    }
}

pub(crate) struct Shared<T> {
    outcome: Outcome<T>,
    waker: Option<Waker>,
    cancellation: CancellationSlot,
}

impl<T> Shared<T> {
    fn new(cancellation: CancellationSlot) -> Self {
        Self {
            outcome: Outcome::Pending,
            waker: None,
            cancellation,
        }
    }
}

/// Reference-counted handle to a [`Shared`] cell, the thing both `Task` and `Promise` clone
/// around without needing to know which is driving it.
pub(crate) struct SharedHandle<T>(Rc<RefCell<Shared<T>>>);

impl<T> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        SharedHandle(self.0.clone())
    }
}

impl<T> SharedHandle<T> {
    pub(crate) fn new(cancellation: CancellationSlot) -> Self {
        SharedHandle(Rc::new(RefCell::new(Shared::new(cancellation))))
    }

    pub(crate) fn cancellation(&self) -> CancellationSlot {
        self.0.borrow().cancellation.clone()
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self.0.borrow().outcome, Outcome::Ready(_))
    }

    pub(crate) fn is_taken(&self) -> bool {
        matches!(self.0.borrow().outcome, Outcome::Taken)
    }

    fn complete(&self, result: Result<T>) {
        let waker = {
            let mut shared = self.0.borrow_mut();
            shared.outcome = Outcome::Ready(result);
            shared.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Polls for the result, registering `cx`'s waker if still pending. Consumes the outcome
    /// on success: a second call after a `Ready` observes `Taken` and fails with
    /// `already-awaited`, matching [`crate::task::Task`]'s single-await contract.
    pub(crate) fn poll_take(&self, cx: &mut Context<'_>) -> Poll<Result<T>> {
        let mut shared = self.0.borrow_mut();
        match core::mem::replace(&mut shared.outcome, Outcome::Taken) {
            Outcome::Pending => {
                shared.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            Outcome::Ready(result) => Poll::Ready(result),
            Outcome::Taken => Poll::Ready(Err(StrandError::already_awaited())),
        }
    }

    /// Polls for readiness without consuming the outcome, registering `cx`'s waker if still
    /// pending. Backs [`crate::promise::Promise`], whose repeated awaits must keep observing
    /// the same completed value.
    pub(crate) fn poll_peek(&self, cx: &mut Context<'_>) -> Poll<Result<T>>
    where
        T: Clone,
    {
        let mut shared = self.0.borrow_mut();
        match &shared.outcome {
            Outcome::Ready(_) => {
                let Outcome::Ready(result) = &shared.outcome else { unreachable!() };
                Poll::Ready(clone_result(result))
            }
            _ => {
                shared.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }

    /// Peeks the result without consuming it or registering a waker, for `Promise::ready`/
    /// `get`-style non-suspending accessors.
    pub(crate) fn peek_clone(&self) -> Option<Result<T>>
    where
        T: Clone,
    {
        match &self.0.borrow().outcome {
            Outcome::Ready(result) => Some(clone_result(result)),
            _ => None,
        }
    }

}

/// Holds the in-flight future between polls. `None` once the future has resolved, so a wake
/// that arrives after completion (or a redundant wake coalesced with an already-scheduled
/// re-poll) is a harmless no-op instead of a double-poll.
type FutureSlot<T> = RefCell<Option<Pin<Box<dyn Future<Output = Result<T>>>>>>;

/// Drives `future` to completion on `executor`, writing its result into `shared` and waking
/// whoever is waiting. This is the eager "start now" path `Promise::spawn_eager` uses.
///
/// Every re-poll is scheduled through `executor.post`, never run inline from inside `wake()` —
/// this keeps a future that wakes itself synchronously (an "immediate completion") from
/// re-entering its own poll call, and matches the ordering guarantee that resumptions are
/// posted rather than nested.
pub(crate) fn drive<T: 'static>(
    executor: LocalExecutor,
    future: Pin<Box<dyn Future<Output = Result<T>>>>,
    shared: SharedHandle<T>,
) {
    drive_with(executor, future, move |result| shared.complete(result));
}

/// Drives `future` to completion on `executor`, invoking `on_complete` exactly once with its
/// result and then dropping every trace of the task. This is the primitive
/// [`crate::detached::spawn`] rides: a detached task has no [`SharedHandle`] for anyone to poll,
/// only a one-shot completion hook.
pub(crate) fn drive_with<T: 'static, F>(executor: LocalExecutor, future: Pin<Box<dyn Future<Output = Result<T>>>>, on_complete: F)
where
    F: FnOnce(Result<T>) + 'static,
{
    let slot: Rc<FutureSlot<T>> = Rc::new(RefCell::new(Some(future)));
    let on_complete: Rc<RefCell<Option<F>>> = Rc::new(RefCell::new(Some(on_complete)));
    schedule_poll(executor, slot, on_complete);
}

fn schedule_poll<T: 'static, F>(executor: LocalExecutor, slot: Rc<FutureSlot<T>>, on_complete: Rc<RefCell<Option<F>>>)
where
    F: FnOnce(Result<T>) + 'static,
{
    let poll_exec = executor.clone();
    let poll_slot = slot.clone();
    let poll_on_complete = on_complete.clone();
    executor.post(Box::new(move || {
        let mut future = match poll_slot.borrow_mut().take() {
            Some(future) => future,
            None => return, // already completed; a stale wake coalesced into this job.
        };

        let wake_exec = poll_exec.clone();
        let wake_slot = poll_slot.clone();
        let wake_on_complete = poll_on_complete.clone();
        let waker = crate::waker::local_waker(move || {
            schedule_poll(wake_exec.clone(), wake_slot.clone(), wake_on_complete.clone());
        });
        let mut cx = Context::from_waker(&waker);

        match future.as_mut().poll(&mut cx) {
            Poll::Ready(result) => {
                if let Some(on_complete) = poll_on_complete.borrow_mut().take() {
                    on_complete(result);
                }
            }
            Poll::Pending => {
                *poll_slot.borrow_mut() = Some(future);
            }
        }
    }));
}
