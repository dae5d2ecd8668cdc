#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "strand-core: a single-threaded, structured-concurrency kernel — tasks, cancellation,"]
#![doc = "fan-in combinators, channels, and a resumable generator, built the way a cooperative"]
#![doc = "coroutine runtime is built in C++, re-expressed on top of Rust's native `Future`."]
#![doc = ""]
#![doc = "`alloc` 依赖说明 / allocator note: every awaitable here is heap-boxed (`Rc`, `Box`,"]
#![doc = "`VecDeque`) to stay object-safe across combinators, so `no_std` builds still require"]
#![doc = "a global allocator. Only the `std`-gated modules (the executor, the kernel driving"]
#![doc = "loop, and anything built on top of them) need a real `std` target; the rest — tasks,"]
#![doc = "channels, the generator, cancellation — work on bare `alloc`."]

extern crate alloc;

mod sealed;

pub mod cancellation;
pub mod channel;
pub mod combinators;
pub mod config;
#[cfg(feature = "std")]
pub mod completion;
#[cfg(feature = "std")]
pub mod detached;
pub mod error;
#[cfg(feature = "std")]
pub mod executor;
pub mod future;
pub mod generator;
#[cfg(feature = "std")]
mod kernel;
pub mod observability;
pub mod prelude;
#[cfg(feature = "std")]
pub mod promise;
pub mod ring_buffer;
pub mod rng;
pub mod scoped;
pub mod task;
#[cfg(feature = "std")]
mod waker;

pub use error::{Error, ErrorKind, Result, StrandError};
