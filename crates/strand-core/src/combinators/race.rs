//! `race` / `left_race`: first-completed-wins fan-in.
use alloc::vec::Vec;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::Child;
use crate::config::RaceTieBreak;
use crate::error::Result;
use crate::rng::Lcg64;

/// Races every child; the first to complete wins and the rest are dropped (the idiomatic
/// Rust stand-in for "emit terminal cancellation to all other children" — see the module-level
/// doc). Ties among children that become ready on the same poll are broken by `tie_break`.
pub fn race<'a, T: 'static>(children: Vec<Child<'a, T>>, tie_break: RaceTieBreak) -> Race<'a, T> {
    let rng = match tie_break {
        RaceTieBreak::Random { seed } => Some(Lcg64::new(seed)),
        RaceTieBreak::FirstReady => None,
    };
    Race {
        children: children.into_iter().map(Some).collect(),
        tie_break,
        rng,
    }
}

/// `race` with ties always resolved to the lowest index, regardless of configuration.
pub fn left_race<'a, T: 'static>(children: Vec<Child<'a, T>>) -> Race<'a, T> {
    race(children, RaceTieBreak::FirstReady)
}

pub struct Race<'a, T> {
    children: Vec<Option<Child<'a, T>>>,
    tie_break: RaceTieBreak,
    rng: Option<Lcg64>,
}

impl<'a, T> Future for Race<'a, T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        // Each child is polled exactly once per call; a `Ready` result is captured inline
        // rather than re-derived from a separate readiness scan, since polling an already-
        // resolved `Future` a second time is undefined behavior for arbitrary futures.
        let mut ready: Vec<(usize, Result<T>)> = Vec::new();
        for (index, slot) in this.children.iter_mut().enumerate() {
            if let Some(child) = slot {
                if let Poll::Ready(result) = child.as_mut().poll(cx) {
                    ready.push((index, result));
                    *slot = None;
                }
            }
        }

        if ready.is_empty() {
            return Poll::Pending;
        }

        let winner_offset = match this.tie_break {
            RaceTieBreak::FirstReady => 0,
            RaceTieBreak::Random { .. } => {
                let rng = this.rng.as_mut().expect("Random tie-break always carries an rng");
                rng.next_in_range(ready.len())
            }
        };
        let (winner_index, winner_result) = ready.swap_remove(winner_offset);

        // Every other child — both the remaining pending ones and any non-winning children
        // that also completed on this same poll — is abandoned by dropping its future.
        for (index, slot) in this.children.iter_mut().enumerate() {
            if index != winner_index {
                *slot = None;
            }
        }

        Poll::Ready(winner_result)
    }
}
