//! Error taxonomy for the concurrency kernel.
//!
//! # Design background (Why)
//! - Collapses the usual core/domain error split into a single flat layer: a concurrency
//!   kernel has no distributed-systems metadata (trace context, peer address, node id) to
//!   carry, so `StrandError` needs only one layer, not two.
//! - Stays `no_std + alloc` friendly: no dependency on `std::error::Error`, just a bespoke
//!   [`Error`] trait with `source()` chaining.
//!
//! # Contract (What)
//! - [`ErrorKind`] classifies *why* an operation failed, which combinators need to branch on
//!   (`gather` must tell "cancelled" apart from "the child's body raised").
//! - [`StrandError`] carries a stable `code`, a human `message`, the `kind`, and an optional
//!   boxed `cause` for chaining.
use alloc::{borrow::Cow, boxed::Box, string::String};
use core::fmt;

use crate::sealed::Sealed;

/// `no_std`-friendly replacement for `std::error::Error`, with `source()` chaining.
pub trait Error: fmt::Debug + fmt::Display + Sealed {
    /// Returns the upstream cause of this error, if any.
    fn source(&self) -> Option<&(dyn Error + 'static)>;
}

impl<E> Error for Box<E>
where
    E: Error + ?Sized,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        (**self).source()
    }
}

/// Boxed, thread-portable cause, kept `Send + Sync` so it can cross a `spawn` boundary.
pub type ErrorCause = Box<dyn Error + Send + Sync + 'static>;

/// Kernel-wide result alias; defaults the error type to [`StrandError`].
pub type Result<T, E = StrandError> = core::result::Result<T, E>;

/// Discriminates *why* an operation in the kernel failed.
///
/// # Contract (What)
/// - `Cancelled` — the operation observed a cancellation signal at a suspension point.
/// - `Closed` — the operation targeted a closed [`crate::channel::Channel`].
/// - `AlreadyAwaited` — a second `.await` (or `Task::spawn`) was attempted on a single-shot
///   awaitable that had already been consumed.
/// - `NotReady` — a synchronous accessor (`Promise::get`) was called before completion.
/// - `UserException` — the coroutine body itself raised; the payload travels separately,
///   see [`crate::kernel::Outcome`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    Cancelled,
    Closed,
    AlreadyAwaited,
    NotReady,
    UserException,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Closed => "closed",
            ErrorKind::AlreadyAwaited => "already-awaited",
            ErrorKind::NotReady => "not-ready",
            ErrorKind::UserException => "user-exception",
        };
        f.write_str(label)
    }
}

/// Stable error codes, `<area>.<reason>`, used for logging and metrics correlation.
pub mod codes {
    pub const CANCELLED: &str = "kernel.cancelled";
    pub const CHANNEL_CLOSED: &str = "kernel.channel_closed";
    pub const ALREADY_AWAITED: &str = "kernel.already_awaited";
    pub const NOT_READY: &str = "kernel.not_ready";
    pub const USER_EXCEPTION: &str = "kernel.user_exception";
}

/// The kernel's single error type.
///
/// # Design background (Why)
/// - A stable code plus a human message plus an optional cause, round-trippable through
///   `source()`.
#[derive(Debug)]
pub struct StrandError {
    code: &'static str,
    message: Cow<'static, str>,
    kind: ErrorKind,
    cause: Option<ErrorCause>,
}

impl StrandError {
    /// Builds a new error from a stable code, kind, and message.
    pub fn new(code: &'static str, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            kind,
            cause: None,
        }
    }

    /// Shorthand for the cancellation error produced when a suspension point observes a
    /// pending cancellation with `throw_if_cancelled` enabled.
    pub fn cancelled() -> Self {
        Self::new(codes::CANCELLED, ErrorKind::Cancelled, "operation cancelled")
    }

    /// Shorthand for operating on a closed channel.
    pub fn closed() -> Self {
        Self::new(codes::CHANNEL_CLOSED, ErrorKind::Closed, "channel closed")
    }

    /// Shorthand for a second await on a single-shot awaitable.
    pub fn already_awaited() -> Self {
        Self::new(
            codes::ALREADY_AWAITED,
            ErrorKind::AlreadyAwaited,
            "awaitable already consumed",
        )
    }

    /// Shorthand for a synchronous access before completion.
    pub fn not_ready() -> Self {
        Self::new(codes::NOT_READY, ErrorKind::NotReady, "result not ready")
    }

    /// Wraps an exception payload raised by a coroutine body.
    pub fn user_exception(message: impl Into<String>) -> Self {
        Self::new(
            codes::USER_EXCEPTION,
            ErrorKind::UserException,
            Cow::Owned(message.into()),
        )
    }

    /// Attaches an underlying cause, returning the updated error.
    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }

    /// True for the errors a well-behaved combinator should treat as "this child lost the
    /// race and was cancelled on our behalf", as opposed to a genuine body failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }
}

impl fmt::Display for StrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for StrandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StrandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

const _: fn() = || {
    fn assert_error_traits<T: Error + Send + Sync + 'static>() {}
    assert_error_traits::<StrandError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_shorthand_carries_cancelled_kind() {
        let err = StrandError::cancelled();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.is_cancelled());
        assert_eq!(err.code(), codes::CANCELLED);
    }

    #[test]
    fn with_cause_chains_through_source() {
        let inner = StrandError::closed();
        let outer = StrandError::user_exception("outer failure").with_cause(inner);
        let source = outer.source().expect("cause must be retrievable");
        assert_eq!(format!("{source}"), "[kernel.channel_closed] channel closed");
    }
}
