//! Scoped resource acquisition: `with(resource, factory)`.
//!
//! # Design background (Why)
//! - `enter` always precedes the body, `exit` always runs
//!   regardless of how the body finished (value, body error, or the body's own cancellation),
//!   and a body failure takes priority over an exit failure — the exit error is only logged.
//! - `Resource` is `#[async_trait(?Send)]` rather than `async fn` in a plain trait: this
//!   kernel is single-threaded by design (no mutexes in the core), so there is no reason
//!   to pay for `Send` bounds nobody needs.
use core::future::Future;

use crate::error::{Result, StrandError};
use crate::observability::{LogRecord, LogSeverity, Logger};

/// A resource with an acquire/release protocol, each step itself awaitable.
#[async_trait::async_trait(?Send)]
pub trait Resource {
    type Output;

    /// Acquires the resource. A failure here means the body never runs and `exit` is not
    /// called (there was nothing to release).
    async fn enter(&mut self) -> Result<Self::Output>;

    /// Releases the resource. Always invoked after a successful `enter`, on every exit path.
    /// `outcome` carries the body's error, if the body failed (including by observing
    /// cancellation) so the resource can distinguish a clean close from an aborted one.
    async fn exit(&mut self, outcome: Option<&StrandError>) -> Result<()>;
}

/// Acquires `resource`, runs the coroutine `factory` produces with access to the acquired
/// output, and guarantees `exit` runs on every path out of the body.
///
/// If both the body and `exit` fail, the body's error is returned and the exit error is only
/// logged through `logger` — the body's exception wins over the exit's.
pub async fn with<R, F, Fut, T>(mut resource: R, factory: F, logger: &dyn Logger) -> Result<T>
where
    R: Resource,
    F: FnOnce(&mut R::Output) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut acquired = resource.enter().await?;
    let body_result = factory(&mut acquired).await;
    let exit_result = resource.exit(body_result.as_ref().err()).await;

    match (body_result, exit_result) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(value), Err(exit_err)) => {
            logger.log(LogRecord {
                target: "strand_core::scoped",
                severity: LogSeverity::Warn,
                message: &exit_err,
            });
            Ok(value)
        }
        (Err(body_err), _) => Err(body_err),
    }
}


#[async_trait::async_trait(?Send)]
impl<R: Resource + ?Sized> Resource for &mut R {
    type Output = R::Output;

    async fn enter(&mut self) -> Result<Self::Output> {
        (**self).enter().await
    }

    async fn exit(&mut self, outcome: Option<&StrandError>) -> Result<()> {
        (**self).exit(outcome).await
    }
}
