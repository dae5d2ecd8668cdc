//! `core::task::Waker` construction for the kernel's driving loop.
//!
//! # Design background (Why)
//! - `waker-fn` is the same small utility the wider async ecosystem (`smol`, `futures-lite`)
//!   reaches for to turn a plain closure into a `Waker` — it keeps the one bit of inherently
//!   unsafe plumbing (the `RawWakerVTable`) out of this crate entirely, consistent with this
//!   crate's `#![deny(unsafe_code)]` posture.
#![cfg(feature = "std")]

use core::task::Waker;

/// Wraps `wake` into a `Waker` that invokes it whenever woken (by value or by reference).
pub(crate) fn local_waker(wake: impl Fn() + 'static) -> Waker {
    waker_fn::waker_fn(wake)
}
