//! Fan-in combinators over child awaitables.
//!
//! # Design background (Why)
//! - Each combinator here owns a child list and a decision function. Rust's `Future`
//!   being lazy means "start all children" is simply "poll each child once" on the
//!   combinator's own first poll — there is no separate initial-suspend phase to model.
//! - Cancelling a loser is expressed the idiomatic Rust way: its boxed future is dropped,
//!   running whatever destructors its suspended locals hold, rather than threading an
//!   explicit terminal-cancellation signal through a plain `Future` that was never given one.
//!   A child that is itself cancellation-aware (built with [`crate::task::Task`] or
//!   [`crate::generator::Generator`], both of which carry a [`crate::cancellation::CancellationSlot`])
//!   still observes this as "dropped before reaching its next suspension point", which is
//!   strictly stronger than a cooperative signal — see the "Race no-leak" invariant.
pub mod join;
pub mod race;
#[cfg(feature = "std")]
pub mod select;
#[cfg(feature = "std")]
pub mod wait_group;

pub use join::{gather, join};
pub use race::{left_race, race};
#[cfg(feature = "std")]
pub use select::{left_select, select};
#[cfg(feature = "std")]
pub use wait_group::WaitGroup;

use crate::future::LocalBoxFuture;

/// Type alias used throughout the combinator family for a child awaitable.
pub type Child<'a, T> = LocalBoxFuture<'a, crate::error::Result<T>>;
