//! Fire-and-forget tasks: `spawn` starts a future running with nobody awaiting its result.
//!
//! # Design background (Why)
//! - A detached task still must not let a failure
//!   vanish without a trace just because nothing is awaiting it. Since there is no caller
//!   left to propagate the error to, the only place left to report it is a hook — this module
//!   is the terminal end of [`crate::kernel::drive_with`], the generalized completion-callback
//!   primitive [`crate::promise::Promise::spawn`] also sits on top of.
//! - The hook is a plain `Rc<dyn Fn(&StrandError)>` rather than a global/static, matching the
//!   rest of this kernel's preference for explicit, passed-in collaborators (the [`Logger`]
//!   facade, [`crate::config::RuntimeConfig`]) over ambient state.
#![cfg(feature = "std")]

use alloc::rc::Rc;
use core::future::Future;

use crate::error::{Result, StrandError};
use crate::executor::LocalExecutor;
use crate::kernel;
use crate::observability::{LogRecord, LogSeverity, Logger};

/// Called with the error of a detached task that finished with `Err`. There is no awaiter to
/// hand the error to, so this is the only place it surfaces.
pub type TerminateHook = Rc<dyn Fn(&StrandError)>;

/// Builds a [`TerminateHook`] that logs the error through `logger` at [`LogSeverity::Error`]
/// and otherwise swallows it — the default behavior anywhere a detached task's failure is
/// operationally interesting but not fatal to the process.
pub fn logging_hook(logger: Rc<dyn Logger>) -> TerminateHook {
    Rc::new(move |err| {
        logger.log(LogRecord {
            target: "strand_core::detached",
            severity: LogSeverity::Error,
            message: err,
        });
    })
}

/// A hook that discards the error entirely. Useful for tasks whose failure is already
/// expected and handled some other way (e.g. observed through a side channel).
pub fn silent_hook() -> TerminateHook {
    Rc::new(|_err| {})
}

/// Starts `future` running on `executor` with no handle returned to the caller: nothing can
/// await it, cancel it, or observe its success. If it finishes with `Err`, `on_unhandled` is
/// invoked with the error; a successful result is simply discarded.
///
/// Unlike [`crate::task::Task`] (which never runs until polled) and
/// [`crate::promise::Promise`] (which runs eagerly but keeps its result queryable), a detached
/// task starts immediately and its outcome is unrecoverable once `on_unhandled` returns.
pub fn spawn<T, Fut>(executor: LocalExecutor, future: Fut, on_unhandled: TerminateHook)
where
    T: 'static,
    Fut: Future<Output = Result<T>> + 'static,
{
    kernel::drive_with(executor, alloc::boxed::Box::pin(future), move |result| {
        if let Err(err) = result {
            on_unhandled(&err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[test]
    fn successful_detached_task_never_calls_the_hook() {
        let exec = LocalExecutor::new();
        let called = Rc::new(RefCell::new(false));
        let hook_called = called.clone();
        let hook: TerminateHook = Rc::new(move |_err| *hook_called.borrow_mut() = true);

        spawn(exec.clone(), async { Ok::<_, StrandError>(()) }, hook);
        exec.run_until_idle();

        assert!(!*called.borrow());
    }

    #[test]
    fn failed_detached_task_invokes_the_hook_exactly_once() {
        let exec = LocalExecutor::new();
        let calls = Rc::new(RefCell::new(0u32));
        let hook_calls = calls.clone();
        let hook: TerminateHook = Rc::new(move |_err| *hook_calls.borrow_mut() += 1);

        spawn(exec.clone(), async { Err::<(), _>(StrandError::user_exception("boom")) }, hook);
        exec.run_until_idle();

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn silent_hook_swallows_the_error_without_panicking() {
        let exec = LocalExecutor::new();
        spawn(exec.clone(), async { Err::<(), _>(StrandError::user_exception("boom")) }, silent_hook());
        exec.run_until_idle();
    }
}
