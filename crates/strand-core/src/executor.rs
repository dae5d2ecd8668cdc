//! Single-threaded serial executor.
//!
//! # Design background (Why)
//! - A `spawn_dyn`-style seam plus a generic convenience wrapper, narrowed to the contract a
//!   cooperative coroutine kernel actually needs: `post`, `dispatch`, and an affinity check.
//! - The concrete [`LocalExecutor`] is the one piece of runtime the kernel owns outright —
//!   everything above it (tasks, combinators, channels) is written against the [`Executor`]
//!   trait so a host can supply its own strand-backed implementation instead.
//!
//! # Concurrency model (How)
//! - `Rc<RefCell<VecDeque<...>>>` run queue: single-threaded, so no atomics are needed for the
//!   FIFO itself. Affinity is tracked with a thread-local id comparison rather than a true OS
//!   thread check, since nothing here is meant to hop threads.
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::sealed::Sealed;

/// A runnable posted onto an [`Executor`].
type Job = Box<dyn FnOnce() + 'static>;

/// Serial scheduler for ready callbacks — the unit of affinity every task and combinator
/// resumption is pinned to.
///
/// # Contract (What)
/// - `post` always defers: the job runs on a later turn of the executor's loop, never inline.
/// - `dispatch` runs inline when the caller is already executing on this executor, else it
///   behaves exactly like `post`.
/// - Two handles are `==` iff they schedule onto the same underlying serial queue.
pub trait Executor: Clone + PartialEq + Sealed {
    fn post(&self, job: Job);
    fn dispatch(&self, job: Job);
    fn running_in_this_thread(&self) -> bool;
}

thread_local! {
    static CURRENT_EXECUTOR_ID: Cell<Option<u64>> = const { Cell::new(None) };
}

struct Inner {
    id: u64,
    queue: RefCell<VecDeque<Job>>,
    config: crate::config::TrampolineConfig,
}

/// A concrete, single-threaded FIFO [`Executor`].
///
/// Queued jobs are drained by [`LocalExecutor::run_until_idle`] or one at a time by
/// [`LocalExecutor::run_one`]; nothing runs spontaneously in the background, matching the
/// cooperative scheduling model.
#[derive(Clone)]
pub struct LocalExecutor {
    inner: Rc<Inner>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::with_config(crate::config::TrampolineConfig::default())
    }

    pub fn with_config(config: crate::config::TrampolineConfig) -> Self {
        static NEXT_ID: core::sync::atomic::AtomicU64 = core::sync::atomic::AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
        Self {
            inner: Rc::new(Inner {
                id,
                queue: RefCell::new(VecDeque::new()),
                config,
            }),
        }
    }

    pub fn config(&self) -> crate::config::TrampolineConfig {
        self.inner.config
    }

    /// Runs exactly one queued job, if any; returns whether a job ran.
    pub fn run_one(&self) -> bool {
        let job = self.inner.queue.borrow_mut().pop_front();
        match job {
            Some(job) => {
                self.enter(job);
                true
            }
            None => false,
        }
    }

    /// Drains the queue until empty. Jobs posted by jobs that ran during this call are also
    /// drained, matching a typical `io_context::run()` loop.
    pub fn run_until_idle(&self) {
        while self.run_one() {}
    }

    /// Number of jobs currently queued, without running any of them.
    pub fn pending_len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    fn enter(&self, job: Job) {
        let previous = CURRENT_EXECUTOR_ID.with(|cell| cell.replace(Some(self.inner.id)));
        job();
        CURRENT_EXECUTOR_ID.with(|cell| cell.set(previous));
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for LocalExecutor {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for LocalExecutor {}

impl fmt::Debug for LocalExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalExecutor").field("id", &self.inner.id).finish()
    }
}

impl Sealed for LocalExecutor {}

impl Executor for LocalExecutor {
    fn post(&self, job: Job) {
        self.inner.queue.borrow_mut().push_back(job);
    }

    fn dispatch(&self, job: Job) {
        if self.running_in_this_thread() {
            self.enter(job);
        } else {
            self.post(job);
        }
    }

    fn running_in_this_thread(&self) -> bool {
        CURRENT_EXECUTOR_ID.with(|cell| cell.get()) == Some(self.inner.id)
    }
}
