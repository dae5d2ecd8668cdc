//! Completion tokens: bridging callback-style leaf I/O into awaitables.
//!
//! # Design background (Why)
//! - Implements a leaf operation contract: an initiation function is a
//!   plain callable that arranges for a handler to be invoked exactly once, and the kernel
//!   wraps that contract into something `.await`-able. [`use_op`] is that wrapper.
//! - "Resumes inline if the current executor matches, else posts a resumption" is exactly
//!   [`crate::executor::Executor::dispatch`]'s contract, already built for the trampoline —
//!   [`CompletionHandler::complete`] rides it rather than re-deriving the rule.
#![cfg(feature = "std")]

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::error::{Result, StrandError};
use crate::executor::{Executor, LocalExecutor};

enum State<T> {
    Waiting,
    Ready(Result<T>),
    Taken,
}

struct Inner<T> {
    state: State<T>,
    waker: Option<Waker>,
}

/// A one-shot callback produced by [`use_op`]. An initiation function calls
/// [`CompletionHandler::complete`] exactly once; that contract is enforced here by only the
/// first call having any effect — later calls (a misbehaving initiation, or a coalesced retry)
/// are silently ignored rather than corrupting an already-delivered result.
pub struct CompletionHandler<T> {
    executor: LocalExecutor,
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: 'static> CompletionHandler<T> {
    /// Delivers `result` and wakes the awaiting coroutine. Runs inline if called from the
    /// handler's own executor, otherwise posts the resumption — matching
    /// [`Executor::dispatch`].
    pub fn complete(self, result: Result<T>) {
        let inner = self.inner;
        self.executor.clone().dispatch(Box::new(move || {
            let waker = {
                let mut guard = inner.borrow_mut();
                if !matches!(guard.state, State::Waiting) {
                    return;
                }
                guard.state = State::Ready(result);
                guard.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake();
            }
        }));
    }
}

/// The awaitable half of [`use_op`]: suspends until its paired [`CompletionHandler`] delivers a
/// result, then yields it exactly once.
pub struct LeafOperation<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Future for LeafOperation<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut guard = self.inner.borrow_mut();
        match core::mem::replace(&mut guard.state, State::Taken) {
            State::Waiting => {
                guard.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            State::Ready(result) => Poll::Ready(result),
            State::Taken => Poll::Ready(Err(StrandError::already_awaited())),
        }
    }
}

/// Wraps a callback-style initiation function into an awaitable.
///
/// `init` is invoked synchronously, once, with a [`CompletionHandler`] it must call exactly
/// once (immediately, for an "immediate completion", or later from reactor activity). The
/// returned [`LeafOperation`] resolves with whatever `init` eventually hands to
/// `CompletionHandler::complete`.
pub fn use_op<T, F>(executor: LocalExecutor, init: F) -> LeafOperation<T>
where
    T: 'static,
    F: FnOnce(CompletionHandler<T>),
{
    let inner = Rc::new(RefCell::new(Inner {
        state: State::Waiting,
        waker: None,
    }));
    let handler = CompletionHandler {
        executor,
        inner: inner.clone(),
    };
    init(handler);
    LeafOperation { inner }
}
