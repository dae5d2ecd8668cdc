//! One-stop import surface for the common types.
//!
//! # Design background (Why)
//! - A shallow, curated re-export so callers write `use strand_core::prelude::*;` instead of
//!   reaching into `strand_core::cancellation::...` paths throughout business code.
//! - Scope is deliberately narrow — only the types a caller touches on every task, not every
//!   internal helper. [`crate::completion`]'s lower-level initiation machinery and the
//!   std-only driving internals in `kernel`/`waker` stay out; reach for them by full path.
pub use crate::cancellation::{CancellationSignal, CancellationSlot, CancellationType, FilterPolicy};
pub use crate::channel::Channel;
pub use crate::combinators::{gather, join, left_race, race, Child};
pub use crate::config::{ChannelDefaults, RaceTieBreak, RuntimeConfig, TrampolineConfig};
pub use crate::error::{Error, ErrorKind, Result, StrandError};
pub use crate::future::LocalBoxFuture;
pub use crate::generator::{Generator, GeneratorItem, Yielder};
pub use crate::observability::{LogRecord, LogSeverity, Logger, NoopLogger};
pub use crate::ring_buffer::RingBuffer;
pub use crate::rng::Lcg64;
pub use crate::scoped::{with, Resource};
pub use crate::task::Task;

#[cfg(feature = "tracing-log")]
pub use crate::observability::TracingLogger;

#[cfg(feature = "std")]
pub use crate::combinators::{left_select, select, WaitGroup};
#[cfg(feature = "std")]
pub use crate::completion::{use_op, CompletionHandler, LeafOperation};
#[cfg(feature = "std")]
pub use crate::detached::{logging_hook, silent_hook, spawn, TerminateHook};
#[cfg(feature = "std")]
pub use crate::executor::{Executor, LocalExecutor};
#[cfg(feature = "std")]
pub use crate::promise::Promise;
