// src/engine/context.rs

//! Cancellable execution context handed to every work function.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// Cooperative cancellation signal shared by a run and its tasks.
///
/// Cloning is cheap and clones observe the same signal. A [`child`] context
/// is cancelled whenever its parent is, but cancelling the child leaves the
/// parent untouched; the layer executor relies on this to stop a layer
/// without cancelling the caller's context.
///
/// [`child`]: RunContext::child
#[derive(Clone)]
pub struct RunContext {
    inner: Arc<Inner>,
}

struct Inner {
    tx: watch::Sender<bool>,
    parent: Option<RunContext>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<RunContext>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner { tx, parent }),
        }
    }

    /// Derive a context that is cancelled together with `self`.
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    /// Signal cancellation to this context and all of its children.
    pub fn cancel(&self) {
        self.inner.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.tx.borrow()
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_cancelled())
    }

    /// Resolves once this context (or any ancestor) is cancelled.
    pub fn cancelled(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let mut rx = self.inner.tx.subscribe();

        Box::pin(async move {
            let own = async move {
                while !*rx.borrow_and_update() {
                    if rx.changed().await.is_err() {
                        // Sender lives in `self`, so this only happens on drop.
                        std::future::pending::<()>().await;
                    }
                }
            };

            match &self.inner.parent {
                Some(parent) => {
                    tokio::select! {
                        _ = own => {}
                        _ = parent.cancelled() => {}
                    }
                }
                None => own.await,
            }
        })
    }

    /// Cancel this context once `after` has elapsed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn cancel_after(&self, after: Duration) -> tokio::task::JoinHandle<()> {
        let ctx = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(after) => {
                    debug!(?after, "run context deadline reached; cancelling");
                    ctx.cancel();
                }
                _ = ctx.cancelled() => {}
            }
        })
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
