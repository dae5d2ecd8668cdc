//! `select` / `left_select`: race aliases over already-eager promises.
//!
//! # Design background (Why)
//! - `select`/`left_select` are aliases over promises, not new combinator logic — since a
//!   [`Promise`] is already running by the time it is handed to these functions, there is no
//!   "start children" phase to perform (unlike `race`, which starts plain futures on its first
//!   poll). Losing a `select` simply means a caller stops observing a `Promise` that keeps
//!   running to completion in the background; nothing is dropped or cancelled.
use alloc::boxed::Box;
use alloc::vec::Vec;

use super::race::{left_race, race, Race};
use crate::config::RaceTieBreak;
use crate::promise::Promise;

/// Selects the first of `promises` to complete; the rest keep running but are no longer
/// observed by the returned future.
pub fn select<T: Clone + 'static>(promises: Vec<Promise<T>>, tie_break: RaceTieBreak) -> Race<'static, T> {
    race(promises.into_iter().map(|p| Box::pin(p) as super::Child<'static, T>).collect(), tie_break)
}

/// `select` with ties always resolved to the lowest index.
pub fn left_select<T: Clone + 'static>(promises: Vec<Promise<T>>) -> Race<'static, T> {
    left_race(promises.into_iter().map(|p| Box::pin(p) as super::Child<'static, T>).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrandError;
    use crate::executor::LocalExecutor;
    use futures::executor::block_on;

    #[test]
    fn left_select_picks_the_already_finished_promise() {
        let exec = LocalExecutor::new();
        let a = Promise::spawn(exec.clone(), async { Ok::<_, StrandError>(1) });
        let b = Promise::spawn(exec.clone(), async {
            core::future::pending::<()>().await;
            Ok::<_, StrandError>(2)
        });
        exec.run_until_idle();
        let winner = block_on(left_select(alloc::vec![a, b])).unwrap();
        assert_eq!(winner, 1);
    }
}
