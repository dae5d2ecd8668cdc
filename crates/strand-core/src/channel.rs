//! Bounded FIFO rendezvous channel.
//!
//! # Design background (Why)
//! - A bounded FIFO rendezvous channel: a ring buffer of `capacity`
//!   slots plus two FIFO waiter queues, with the invariant that at most one of
//!   {waiting-readers, waiting-writers} is non-empty at any moment (a pending pair is always
//!   matched immediately instead of being left to queue on both sides).
//! - `capacity == 0` degenerates to pure rendezvous: the buffer is always empty and every
//!   `write`/`read` must find a waiting counterpart or suspend.
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::error::{Result, StrandError};
use crate::observability::{LogRecord, LogSeverity, Logger, NoopLogger};

enum Waiter<T> {
    Reader { waker: Option<Waker>, value: Option<T> },
    Writer { waker: Option<Waker>, value: Option<T>, taken: bool },
}

struct Inner<T> {
    capacity: usize,
    buffer: VecDeque<T>,
    readers: VecDeque<Rc<RefCell<Waiter<T>>>>,
    writers: VecDeque<Rc<RefCell<Waiter<T>>>>,
    closed: bool,
    logger: Rc<dyn Logger>,
}

impl<T> Inner<T> {
    fn new(capacity: usize, logger: Rc<dyn Logger>) -> Self {
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            readers: VecDeque::new(),
            writers: VecDeque::new(),
            closed: false,
            logger,
        }
    }
}

/// A bounded FIFO rendezvous channel.
///
/// Cloning shares the same underlying queue (cheap `Rc` handle), matching how a channel is
/// passed around by reference in the originating model.
pub struct Channel<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Channel { inner: self.inner.clone() }
    }
}

impl<T> Channel<T> {
    /// Creates a channel with room for `capacity` buffered values (`0` for pure rendezvous).
    pub fn new(capacity: usize) -> Self {
        Self::with_logger(capacity, Rc::new(NoopLogger))
    }

    /// Same as [`Channel::new`], but [`Channel::close`] reports the close transition through
    /// `logger` instead of discarding it.
    pub fn with_logger(capacity: usize, logger: Rc<dyn Logger>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new(capacity, logger))),
        }
    }

    /// Creates a channel using [`crate::config::ChannelDefaults::default_capacity`].
    pub fn with_defaults(defaults: crate::config::ChannelDefaults) -> Self {
        Self::new(defaults.default_capacity)
    }

    /// Returns an awaitable that writes `value`, suspending only if neither a waiting reader
    /// nor free buffer space is available.
    pub fn write(&self, value: T) -> Write<T> {
        Write {
            inner: self.inner.clone(),
            value: Some(value),
            waiter: None,
        }
    }

    /// Returns an awaitable that reads the next value, suspending only if neither a waiting
    /// writer nor a buffered value is available.
    pub fn read(&self) -> Read<T> {
        Read {
            inner: self.inner.clone(),
            waiter: None,
        }
    }

    /// Non-suspending write: succeeds immediately or returns the value back to the caller.
    pub fn try_write(&self, value: T) -> core::result::Result<(), T> {
        let mut inner = self.inner.borrow_mut();
        if inner.closed {
            return Err(value);
        }
        if let Some(reader) = pop_ready(&mut inner.readers) {
            let mut waiter = reader.borrow_mut();
            if let Waiter::Reader { waker, value: slot } = &mut *waiter {
                *slot = Some(value);
                if let Some(waker) = waker.take() {
                    waker.wake();
                }
                return Ok(());
            }
            unreachable!("reader queue must only hold Waiter::Reader entries")
        }
        if inner.buffer.len() < inner.capacity {
            inner.buffer.push_back(value);
            return Ok(());
        }
        Err(value)
    }

    /// Non-suspending read: succeeds immediately or reports emptiness.
    pub fn try_read(&self) -> Option<T> {
        let mut inner = self.inner.borrow_mut();
        if let Some(writer) = pop_ready(&mut inner.writers) {
            let mut waiter = writer.borrow_mut();
            if let Waiter::Writer { waker, value, taken } = &mut *waiter {
                *taken = true;
                if let Some(waker) = waker.take() {
                    waker.wake();
                }
                return value.take();
            }
            unreachable!("writer queue must only hold Waiter::Writer entries")
        }
        if let Some(value) = inner.buffer.pop_front() {
            return Some(value);
        }
        None
    }

    /// Closes the channel: every currently-suspended reader/writer is woken with a `closed`
    /// failure, and every later `read`/`write` fails immediately.
    pub fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.closed {
            return; // already closed; the transition itself only happens, and logs, once.
        }
        inner.closed = true;
        inner.logger.log(LogRecord {
            target: "strand_core::channel",
            severity: LogSeverity::Info,
            message: &"channel closed",
        });
        for reader in inner.readers.drain(..) {
            if let Waiter::Reader { waker, .. } = &mut *reader.borrow_mut() {
                if let Some(waker) = waker.take() {
                    waker.wake();
                }
            }
        }
        for writer in inner.writers.drain(..) {
            if let Waiter::Writer { waker, .. } = &mut *writer.borrow_mut() {
                if let Some(waker) = waker.take() {
                    waker.wake();
                }
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    pub fn buffered_len(&self) -> usize {
        self.inner.borrow().buffer.len()
    }
}

fn pop_ready<T>(queue: &mut VecDeque<Rc<RefCell<Waiter<T>>>>) -> Option<Rc<RefCell<Waiter<T>>>> {
    queue.pop_front()
}

/// Awaitable returned by [`Channel::write`].
pub struct Write<T> {
    inner: Rc<RefCell<Inner<T>>>,
    value: Option<T>,
    waiter: Option<Rc<RefCell<Waiter<T>>>>,
}

/// Dropping a suspended write (the losing side of `race`/`join`, or any other combinator that
/// abandons a child by dropping it) must unlink its waiter from `inner.writers` — otherwise the
/// next matching read pulls a dead entry off the queue and hands out a value nobody sent, or a
/// staged value is silently lost. No-op if this write never suspended (`waiter` is `None`) or
/// already completed and was popped off the queue by whoever matched it.
impl<T> Drop for Write<T> {
    fn drop(&mut self) {
        let Some(waiter) = self.waiter.take() else { return };
        let mut inner = self.inner.borrow_mut();
        if let Some(pos) = inner.writers.iter().position(|w| Rc::ptr_eq(w, &waiter)) {
            inner.writers.remove(pos);
        }
    }
}

impl<T> Future for Write<T> {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(waiter) = &this.waiter {
            let mut guard = waiter.borrow_mut();
            if let Waiter::Writer { waker, taken, .. } = &mut *guard {
                if *taken {
                    return Poll::Ready(Ok(()));
                }
                *waker = Some(cx.waker().clone());
            }
            drop(guard);
            if this.inner.borrow().closed {
                return Poll::Ready(Err(StrandError::closed()));
            }
            return Poll::Pending;
        }

        let mut inner = this.inner.borrow_mut();
        if inner.closed {
            return Poll::Ready(Err(StrandError::closed()));
        }
        let value = this.value.take().expect("Write polled after completion");
        if let Some(reader) = pop_ready(&mut inner.readers) {
            let mut guard = reader.borrow_mut();
            if let Waiter::Reader { waker, value: slot } = &mut *guard {
                *slot = Some(value);
                if let Some(waker) = waker.take() {
                    waker.wake();
                }
            }
            return Poll::Ready(Ok(()));
        }
        if inner.buffer.len() < inner.capacity {
            inner.buffer.push_back(value);
            return Poll::Ready(Ok(()));
        }
        let waiter = Rc::new(RefCell::new(Waiter::Writer {
            waker: Some(cx.waker().clone()),
            value: Some(value),
            taken: false,
        }));
        inner.writers.push_back(waiter.clone());
        this.waiter = Some(waiter);
        Poll::Pending
    }
}

/// Awaitable returned by [`Channel::read`].
pub struct Read<T> {
    inner: Rc<RefCell<Inner<T>>>,
    waiter: Option<Rc<RefCell<Waiter<T>>>>,
}

/// Mirrors [`Write`]'s `Drop`: unlinks this read's waiter from `inner.readers` so a cancelled,
/// still-suspended read can never be matched by a later write.
impl<T> Drop for Read<T> {
    fn drop(&mut self) {
        let Some(waiter) = self.waiter.take() else { return };
        let mut inner = self.inner.borrow_mut();
        if let Some(pos) = inner.readers.iter().position(|r| Rc::ptr_eq(r, &waiter)) {
            inner.readers.remove(pos);
        }
    }
}

impl<T> Future for Read<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(waiter) = &this.waiter {
            let mut guard = waiter.borrow_mut();
            if let Waiter::Reader { waker, value } = &mut *guard {
                if let Some(value) = value.take() {
                    return Poll::Ready(Ok(value));
                }
                *waker = Some(cx.waker().clone());
            }
            drop(guard);
            if this.inner.borrow().closed {
                return Poll::Ready(Err(StrandError::closed()));
            }
            return Poll::Pending;
        }

        let mut inner = this.inner.borrow_mut();
        if let Some(writer) = pop_ready(&mut inner.writers) {
            let mut guard = writer.borrow_mut();
            if let Waiter::Writer { waker, value, taken } = &mut *guard {
                *taken = true;
                if let Some(waker) = waker.take() {
                    waker.wake();
                }
                let value = value.take().expect("writer queue entry missing its staged value");
                drop(guard);
                return Poll::Ready(Ok(value));
            }
            unreachable!("writer queue must only hold Waiter::Writer entries")
        }
        if let Some(value) = inner.buffer.pop_front() {
            return Poll::Ready(Ok(value));
        }
        if inner.closed {
            return Poll::Ready(Err(StrandError::closed()));
        }
        let waiter = Rc::new(RefCell::new(Waiter::Reader {
            waker: Some(cx.waker().clone()),
            value: None,
        }));
        inner.readers.push_back(waiter.clone());
        this.waiter = Some(waiter);
        Poll::Pending
    }
}
