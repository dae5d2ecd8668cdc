//! Overwrite-oldest-on-full variant of [`crate::channel::Channel`].
//!
//! # Design background (Why)
//! - A producer that must never be backpressured (telemetry-style)
//!   needs `write` to always succeed, dropping the oldest buffered value instead of suspending
//!   when full. `read` keeps the channel's ordinary suspend-when-empty behavior.
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::error::Result;

struct Inner<T> {
    capacity: usize,
    buffer: VecDeque<T>,
    reader_waker: Option<Waker>,
    dropped: usize,
}

/// A bounded ring buffer whose `write` never suspends.
pub struct RingBuffer<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        RingBuffer { inner: self.inner.clone() }
    }
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "a ring buffer needs at least one slot");
        Self {
            inner: Rc::new(RefCell::new(Inner {
                capacity,
                buffer: VecDeque::with_capacity(capacity),
                reader_waker: None,
                dropped: 0,
            })),
        }
    }

    /// Writes `value` immediately, dropping the oldest buffered value if full. Never suspends.
    pub fn write(&self, value: T) {
        let mut inner = self.inner.borrow_mut();
        if inner.buffer.len() == inner.capacity {
            inner.buffer.pop_front();
            inner.dropped += 1;
        }
        inner.buffer.push_back(value);
        if let Some(waker) = inner.reader_waker.take() {
            waker.wake();
        }
    }

    /// Returns an awaitable that suspends until a value is available.
    pub fn read(&self) -> RingRead<T> {
        RingRead { inner: self.inner.clone() }
    }

    pub fn try_read(&self) -> Option<T> {
        self.inner.borrow_mut().buffer.pop_front()
    }

    /// Count of values overwritten because the buffer was full at write time — the "dropped
    /// on overflow" term in the channel-conservation accounting.
    pub fn dropped_count(&self) -> usize {
        self.inner.borrow().dropped
    }

    pub fn buffered_len(&self) -> usize {
        self.inner.borrow().buffer.len()
    }
}

/// Awaitable returned by [`RingBuffer::read`].
pub struct RingRead<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Future for RingRead<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.inner.borrow_mut();
        match inner.buffer.pop_front() {
            Some(value) => Poll::Ready(Ok(value)),
            None => {
                inner.reader_waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn write_never_suspends_and_overwrites_oldest() {
        let ring = RingBuffer::new(2);
        ring.write(1);
        ring.write(2);
        ring.write(3); // drops 1
        assert_eq!(ring.dropped_count(), 1);
        assert_eq!(block_on(ring.read()).unwrap(), 2);
        assert_eq!(block_on(ring.read()).unwrap(), 3);
    }

    #[test]
    fn read_suspends_when_empty() {
        let ring: RingBuffer<i32> = RingBuffer::new(1);
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut fut = alloc::boxed::Box::pin(ring.read());
        assert!(fut.as_mut().poll(&mut cx).is_pending());
    }
}
