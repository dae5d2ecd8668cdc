//! `join` (fail-fast) and `gather` (all-complete, error-per-child).
use alloc::vec::Vec;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::Child;
use crate::error::Result;

/// Waits for every child; if any fails, the rest are dropped immediately and the first error
/// (in poll order, not index order — matching "first exception observed") is returned.
pub fn join<'a, T: 'static>(children: Vec<Child<'a, T>>) -> Join<'a, T> {
    Join {
        children: children.into_iter().map(Some).collect(),
        results: Vec::new(),
    }
}

pub struct Join<'a, T> {
    children: Vec<Option<Child<'a, T>>>,
    results: Vec<Option<T>>,
}

impl<'a, T> Future for Join<'a, T> {
    type Output = Result<Vec<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.results.is_empty() && !this.children.is_empty() {
            this.results = this.children.iter().map(|_| None).collect();
        }

        for (index, slot) in this.children.iter_mut().enumerate() {
            if let Some(child) = slot {
                match child.as_mut().poll(cx) {
                    Poll::Ready(Ok(value)) => {
                        this.results[index] = Some(value);
                        *slot = None;
                    }
                    Poll::Ready(Err(err)) => {
                        *slot = None;
                        // Fail fast: abandon every other live child, then surface this error.
                        for other in this.children.iter_mut() {
                            *other = None;
                        }
                        return Poll::Ready(Err(err));
                    }
                    Poll::Pending => {}
                }
            }
        }

        if this.children.iter().all(Option::is_none) {
            let values = this.results.iter_mut().map(|slot| slot.take().expect("every slot filled on success path")).collect();
            Poll::Ready(Ok(values))
        } else {
            Poll::Pending
        }
    }
}

/// Waits for every child regardless of individual failure, returning one [`Result`] per child
/// in input order.
pub fn gather<'a, T: 'static>(children: Vec<Child<'a, T>>) -> Gather<'a, T> {
    Gather {
        children: children.into_iter().map(Some).collect(),
        results: Vec::new(),
    }
}

pub struct Gather<'a, T> {
    children: Vec<Option<Child<'a, T>>>,
    results: Vec<Option<Result<T>>>,
}

impl<'a, T> Future for Gather<'a, T> {
    type Output = Vec<Result<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.results.is_empty() && !this.children.is_empty() {
            this.results = this.children.iter().map(|_| None).collect();
        }

        for (index, slot) in this.children.iter_mut().enumerate() {
            if let Some(child) = slot {
                if let Poll::Ready(result) = child.as_mut().poll(cx) {
                    this.results[index] = Some(result);
                    *slot = None;
                }
            }
        }

        if this.children.iter().all(Option::is_none) {
            let values = this.results.iter_mut().map(|slot| slot.take().expect("every slot filled")).collect();
            Poll::Ready(values)
        } else {
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrandError;
    use alloc::boxed::Box;
    use futures::executor::block_on;

    #[test]
    fn join_returns_values_in_input_order() {
        let children: Vec<Child<'static, i32>> = alloc::vec![
            Box::pin(async { Ok::<_, StrandError>(1) }),
            Box::pin(async { Ok::<_, StrandError>(2) }),
            Box::pin(async { Ok::<_, StrandError>(3) }),
        ];
        let values = block_on(join(children)).unwrap();
        assert_eq!(values, alloc::vec![1, 2, 3]);
    }

    #[test]
    fn join_fails_fast_on_first_error() {
        let children: Vec<Child<'static, i32>> = alloc::vec![
            Box::pin(async {
                core::future::pending::<()>().await;
                Ok::<_, StrandError>(1)
            }),
            Box::pin(async { Err(StrandError::user_exception("x")) }),
        ];
        let err = block_on(join(children)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UserException);
    }

    #[test]
    fn gather_captures_every_result_independently() {
        let children: Vec<Child<'static, i32>> = alloc::vec![
            Box::pin(async { Ok::<_, StrandError>(1) }),
            Box::pin(async { Err(StrandError::user_exception("x")) }),
            Box::pin(async { Ok::<_, StrandError>(3) }),
        ];
        let results = block_on(gather(children));
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
