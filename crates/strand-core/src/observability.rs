//! Logging facade.
//!
//! # Design background (Why)
//! - The kernel core never takes a hard dependency on a concrete logging backend, only on a
//!   small trait it can call through. This keeps `strand-core` usable in `no_std` embedded
//!   contexts (via [`NoopLogger`]) while still plugging into `tracing` for ordinary host builds.
use core::fmt;

/// Severity of a [`LogRecord`], ordered low to high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A single structured log event emitted by the kernel.
///
/// Kept intentionally small: a target, a severity, and a message. Anything richer belongs in
/// the backend the [`Logger`] wraps (e.g. `tracing`'s span fields), not in this facade.
#[derive(Clone, Copy, Debug)]
pub struct LogRecord<'a> {
    pub target: &'a str,
    pub severity: LogSeverity,
    pub message: &'a dyn fmt::Display,
}

/// Sink for kernel diagnostics.
///
/// Every suspension-point transition that matters operationally (a task completing, a race
/// being decided, a channel closing) goes through this trait rather than a bare `eprintln!`,
/// so embedders can route it anywhere — or nowhere.
pub trait Logger {
    fn log(&self, record: LogRecord<'_>);
}

/// Discards every record. The default for `no_std` builds and for tests that don't care.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _record: LogRecord<'_>) {}
}

/// Bridges kernel log records onto `tracing`'s dispatcher.
#[cfg(feature = "tracing-log")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

#[cfg(feature = "tracing-log")]
impl Logger for TracingLogger {
    fn log(&self, record: LogRecord<'_>) {
        match record.severity {
            LogSeverity::Trace => tracing::trace!(target: "strand_core", message = %record.message),
            LogSeverity::Debug => tracing::debug!(target: "strand_core", message = %record.message),
            LogSeverity::Info => tracing::info!(target: "strand_core", message = %record.message),
            LogSeverity::Warn => tracing::warn!(target: "strand_core", message = %record.message),
            LogSeverity::Error => tracing::error!(target: "strand_core", message = %record.message),
        }
    }
}
