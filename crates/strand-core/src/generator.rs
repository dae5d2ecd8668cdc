//! Resumable producer, alternating between yielding `Y` and consuming `I`.
//!
//! # Design background (Why)
//! - A resumable-producer state machine (`Fresh -> Producing -> Suspended(Y) -> Producing -> ... -> Done(R)`)
//!   is built here the way the `genawaiter`-style crates in the wider async ecosystem do it:
//!   the body is an ordinary `async` block that calls `yield_value`, which stashes the
//!   produced value in a shared cell and then awaits a one-shot [`YieldPoint`] that returns
//!   `Pending` exactly once. [`Generator::resume`] polls the body future directly (through its
//!   own `Context`, so a genuinely async nested `.await` inside the body still works — the
//!   waker just propagates through, the same way any wrapper `Future` forwards to an inner
//!   one). This needed no background executor or internal rendezvous channel: the generator is
//!   only ever driven exactly when its own caller polls `resume`.
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::cancellation::{CancellationSignal, CancellationSlot, CancellationType};
use crate::error::{Result, StrandError};

/// Either the next yielded value or the generator's final return value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeneratorItem<Y, R> {
    Yielded(Y),
    Done(R),
}

struct Slot<Y, I> {
    pending_yield: RefCell<Option<Y>>,
    pending_input: RefCell<Option<I>>,
}

/// Handle passed into a generator body, used to yield a value and receive the next input.
pub struct Yielder<Y, I> {
    slot: Rc<Slot<Y, I>>,
    cancellation: CancellationSlot,
}

impl<Y, I> Yielder<Y, I> {
    /// Stages `value` for the consumer, then suspends (returning control to [`Generator::resume`])
    /// until the next input arrives.
    pub async fn yield_value(&self, value: Y) -> Result<I> {
        self.cancellation.throw_if_cancelled()?;
        *self.slot.pending_yield.borrow_mut() = Some(value);
        YieldPoint::default().await;
        self.cancellation.throw_if_cancelled()?;
        self.slot
            .pending_input
            .borrow_mut()
            .take()
            .ok_or_else(StrandError::not_ready)
    }

    pub fn cancellation(&self) -> &CancellationSlot {
        &self.cancellation
    }
}

#[derive(Default)]
struct YieldPoint {
    polled: bool,
}

impl Future for YieldPoint {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.polled {
            Poll::Ready(())
        } else {
            self.polled = true;
            Poll::Pending
        }
    }
}

/// A resumable coroutine producing a `Y` sequence with an optional final `R`.
pub struct Generator<Y, I, R> {
    slot: Rc<Slot<Y, I>>,
    body: RefCell<Pin<Box<dyn Future<Output = Result<R>>>>>,
    signal: CancellationSignal,
    started: Cell<bool>,
    finished: Cell<bool>,
}

impl<Y: 'static, I: 'static, R: 'static> Generator<Y, I, R> {
    /// Builds a generator. Nothing runs until the first [`Generator::resume`]/[`Generator::next`]
    /// call, matching the laziness every other awaitable in this kernel has.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Yielder<Y, I>) -> Fut,
        Fut: Future<Output = Result<R>> + 'static,
    {
        let slot = Rc::new(Slot {
            pending_yield: RefCell::new(None),
            pending_input: RefCell::new(None),
        });
        let signal = CancellationSignal::new();
        let cancellation = signal.slot();
        let yielder = Yielder {
            slot: slot.clone(),
            cancellation,
        };
        Self {
            slot,
            body: RefCell::new(Box::pin(body(yielder))),
            signal,
            started: Cell::new(false),
            finished: Cell::new(false),
        }
    }

    /// Pushes `input` to the generator and drives it until it yields again or finishes.
    ///
    /// The very first call never delivers `input`: the body has not reached its first
    /// suspension point yet, so there is nothing waiting to receive it.
    pub fn resume(&self, input: I) -> Resume<'_, Y, I, R> {
        Resume {
            generator: self,
            input: Some(input),
        }
    }

    /// Emits terminal cancellation into the generator's slot; the next suspension point inside
    /// the body observes it, and the next `resume`/`next` call surfaces `cancelled`.
    pub fn cancel(&self) {
        self.signal.emit(CancellationType::TERMINAL);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

impl<Y: 'static, R: 'static> Generator<Y, (), R> {
    /// Convenience for generators with no per-resume input.
    pub fn next(&self) -> Resume<'_, Y, (), R> {
        self.resume(())
    }
}

/// Future returned by [`Generator::resume`].
pub struct Resume<'a, Y, I, R> {
    generator: &'a Generator<Y, I, R>,
    input: Option<I>,
}

impl<'a, Y: 'static, I: 'static, R: 'static> Future for Resume<'a, Y, I, R> {
    type Output = Result<GeneratorItem<Y, R>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let generator = this.generator;
        if generator.finished.get() {
            return Poll::Ready(Err(StrandError::already_awaited()));
        }
        if generator.started.get() {
            let input = this.input.take().expect("Resume polled twice after delivering its input");
            *generator.slot.pending_input.borrow_mut() = Some(input);
        }
        generator.started.set(true);

        let mut body = generator.body.borrow_mut();
        match body.as_mut().poll(cx) {
            Poll::Ready(result) => {
                generator.finished.set(true);
                Poll::Ready(result.map(GeneratorItem::Done))
            }
            Poll::Pending => match generator.slot.pending_yield.borrow_mut().take() {
                Some(value) => Poll::Ready(Ok(GeneratorItem::Yielded(value))),
                None => Poll::Pending,
            },
        }
    }
}
