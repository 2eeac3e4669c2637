use std::task::{Context, Poll};

use futures::{
    channel::oneshot::{self, Canceled},
    future::BoxFuture,
    FutureExt,
};

/// A future owned by the UI loop. It is polled once per frame and never
/// registers a real waker, the host is expected to repaint while it is pending.
pub struct AsyncTask<T>(Option<BoxFuture<'static, T>>);

impl<T> AsyncTask<T> {
    pub fn new(b: BoxFuture<'static, T>) -> Self {
        Self(Some(b))
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the output the first time the future is ready, `None` before and after.
    pub fn poll_ready(&mut self) -> Option<T> {
        let fut = self.0.as_mut()?;
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        match fut.poll_unpin(&mut cx) {
            Poll::Ready(r) => {
                self.0 = None;
                Some(r)
            }
            Poll::Pending => None,
        }
    }
}

/// Runs a blocking call on its own thread and resolves once it returns.
pub(crate) fn spawn_blocking<T: Send + 'static>(
    f: impl FnOnce() -> T + Send + 'static,
) -> BoxFuture<'static, Result<T, Canceled>> {
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        if tx.send(f()).is_err() {
            log::debug!("Receiver dropped before blocking call finished");
        }
    });
    rx.boxed()
}
