//! Dynamic set of running promises with bulk wait and cancel.
use alloc::vec::Vec;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::cancellation::CancellationType;
use crate::error::Result;
use crate::promise::Promise;

/// A dynamic collection of [`Promise`] handles.
///
/// # Contract (What)
/// - `push_back` inserts a new member; members complete independently of insertion order.
/// - `reap` never suspends: it removes and returns every currently-complete member.
/// - `wait_one` suspends until at least one member is complete, then removes and returns it.
/// - `cancel` emits terminal cancellation into every member's own signal.
/// - `wait` suspends until the group is empty (draining via repeated `wait_one`).
pub struct WaitGroup<T> {
    members: Vec<Promise<T>>,
}

impl<T: Clone + 'static> WaitGroup<T> {
    pub fn new() -> Self {
        Self { members: Vec::new() }
    }

    pub fn push_back(&mut self, member: Promise<T>) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Removes and returns every currently-complete member without suspending.
    pub fn reap(&mut self) -> Vec<Result<T>> {
        let mut done = Vec::new();
        let mut still_running = Vec::with_capacity(self.members.len());
        for member in self.members.drain(..) {
            if member.ready() {
                done.push(member.get());
            } else {
                still_running.push(member);
            }
        }
        self.members = still_running;
        done
    }

    /// Emits terminal cancellation into every live member.
    pub fn cancel(&self) {
        for member in &self.members {
            member.cancel(CancellationType::TERMINAL);
        }
    }

    /// Suspends until at least one member completes, then removes and returns it.
    pub fn wait_one(&mut self) -> WaitOne<'_, T> {
        WaitOne { group: self }
    }

    /// Suspends until the group is empty.
    pub fn wait(&mut self) -> WaitAll<'_, T> {
        WaitAll { group: self }
    }
}

impl<T: Clone + 'static> Default for WaitGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WaitOne<'a, T> {
    group: &'a mut WaitGroup<T>,
}

impl<'a, T: Clone + 'static> Future for WaitOne<'a, T> {
    type Output = Option<Result<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.group.members.is_empty() {
            return Poll::Ready(None);
        }
        if let Some(index) = this.group.members.iter().position(Promise::ready) {
            let member = this.group.members.remove(index);
            return Poll::Ready(Some(member.get()));
        }
        for member in this.group.members.iter_mut() {
            let mut pinned = Pin::new(member);
            let _ = pinned.as_mut().poll(cx);
        }
        Poll::Pending
    }
}

pub struct WaitAll<'a, T> {
    group: &'a mut WaitGroup<T>,
}

impl<'a, T: Clone + 'static> Future for WaitAll<'a, T> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.group.members.retain_mut(|member| {
            let mut pinned = Pin::new(member);
            pinned.as_mut().poll(cx).is_pending()
        });
        if this.group.members.is_empty() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrandError;
    use crate::executor::LocalExecutor;
    use futures::executor::block_on;

    #[test]
    fn reap_only_collects_completed_members() {
        let exec = LocalExecutor::new();
        let mut group = WaitGroup::new();
        group.push_back(Promise::spawn(exec.clone(), async { Ok::<_, StrandError>(1) }));
        group.push_back(Promise::spawn(exec.clone(), async {
            core::future::pending::<()>().await;
            Ok::<_, StrandError>(2)
        }));
        exec.run_until_idle();
        let done = group.reap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].as_ref().unwrap(), &1);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn wait_one_removes_the_completed_member() {
        let exec = LocalExecutor::new();
        let mut group = WaitGroup::new();
        group.push_back(Promise::spawn(exec.clone(), async { Ok::<_, StrandError>(9) }));
        exec.run_until_idle();
        let result = block_on(group.wait_one());
        assert_eq!(result.unwrap().unwrap(), 9);
        assert!(group.is_empty());
    }

    #[test]
    fn wait_completes_once_group_is_empty() {
        let mut group: WaitGroup<i32> = WaitGroup::new();
        block_on(group.wait());
        assert!(group.is_empty());
    }
}
