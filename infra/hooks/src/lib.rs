//! # Hooks
//!
//! A registry of shutdown callbacks that runs once the process receives
//! SIGINT or SIGTERM (Ctrl+C only on non-unix targets).
//!
//! Callbacks run sequentially, in registration order, under one shared
//! deadline. Every callback is invoked even after the deadline passes; it then
//! sees an expired [`ShutdownContext`] and is polled once.
//!
//! ```rust,no_run
//! use blocks_hooks::Hook;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), blocks_hooks::HookError> {
//! let hooks = Hook::new(Duration::from_secs(5));
//! hooks.add(|ctx| async move {
//!     tracing::info!(remaining = ?ctx.remaining(), "closing connections");
//! });
//!
//! let signal = hooks.wait().await?;
//! tracing::info!(%signal, "bye");
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::Instant;
use tracing::{info, warn};

#[blocks_derive::blocks_error]
pub enum HookError {
    #[error("Signal handler error{}: {source}", format_context(.context))]
    Signal { source: std::io::Error, context: Option<Cow<'static, str>> },
}

/// Boxed future returned by a registered callback.
pub type HookFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type Callback = Box<dyn FnOnce(ShutdownContext) -> HookFuture + Send + 'static>;

/// The OS signal that triggered shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

/// Deadline information handed to every callback.
#[derive(Debug, Clone, Copy)]
pub struct ShutdownContext {
    deadline: Instant,
}

impl ShutdownContext {
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the shared deadline; zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

struct Inner {
    timeout: Duration,
    callbacks: Mutex<Vec<Callback>>,
}

/// Cloneable handle to a set of shutdown callbacks.
#[derive(Clone)]
pub struct Hook {
    inner: Arc<Inner>,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("timeout", &self.inner.timeout)
            .field("callbacks", &self.len())
            .finish()
    }
}

impl Hook {
    /// Creates an empty registry; `timeout` bounds the whole shutdown run.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { inner: Arc::new(Inner { timeout, callbacks: Mutex::new(Vec::new()) }) }
    }

    /// Registers a callback. Safe to call from any thread.
    pub fn add<F, Fut>(&self, callback: F)
    where
        F: FnOnce(ShutdownContext) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.callbacks.lock().push(Box::new(move |ctx| Box::pin(callback(ctx))));
    }

    /// Number of callbacks not yet run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.callbacks.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Blocks until SIGINT/SIGTERM, then runs every callback.
    ///
    /// # Errors
    /// Returns [`HookError::Signal`] if the signal handlers cannot be installed.
    pub async fn wait(&self) -> Result<Signal, HookError> {
        let signal = shutdown_signal().await?;
        info!(%signal, "shutdown signal received");
        self.shutdown().await;
        Ok(signal)
    }

    /// Runs the callbacks once `trigger` resolves.
    pub async fn wait_for<F: Future<Output = ()>>(&self, trigger: F) -> usize {
        trigger.await;
        self.shutdown().await
    }

    /// Runs all pending callbacks now and returns how many completed before
    /// the deadline. Each callback runs at most once, and none is skipped.
    pub async fn shutdown(&self) -> usize {
        let callbacks = std::mem::take(&mut *self.inner.callbacks.lock());
        let total = callbacks.len();
        let ctx = ShutdownContext { deadline: Instant::now() + self.inner.timeout };

        let mut completed = 0;
        for callback in callbacks {
            // `timeout_at` polls the callback before checking the deadline.
            if tokio::time::timeout_at(ctx.deadline, callback(ctx)).await.is_ok() {
                completed += 1;
            }
        }

        if completed < total {
            warn!(completed, total, timeout = ?self.inner.timeout, "shutdown hooks timed out");
        } else {
            info!(completed, "shutdown hooks finished");
        }
        completed
    }
}

/// Resolves with the first SIGINT or SIGTERM received.
///
/// # Errors
/// Returns [`HookError::Signal`] if a handler cannot be installed.
pub async fn shutdown_signal() -> Result<Signal, HookError> {
    let ctrl_c = async {
        signal::ctrl_c().await.context("installing Ctrl+C handler")?;
        Ok::<_, HookError>(Signal::Interrupt)
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("installing SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, HookError>(Signal::Terminate)
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<Signal, HookError>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn callbacks_run_in_registration_order() {
        let hook = Hook::new(Duration::from_secs(1));
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            hook.add(move |_| async move { order.lock().push(i) });
        }

        assert_eq!(hook.len(), 3);
        assert_eq!(hook.shutdown().await, 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn callbacks_run_only_once() {
        let hook = Hook::new(Duration::from_secs(1));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        hook.add(move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hook.shutdown().await;
        hook.shutdown().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(hook.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn callbacks_after_the_deadline_still_run() {
        let hook = Hook::new(Duration::from_secs(2));
        let finished = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&finished);
        hook.add(move |_| async move {
            f.fetch_add(1, Ordering::SeqCst);
        });
        hook.add(|_| async { tokio::time::sleep(Duration::from_secs(60)).await });
        let f = Arc::clone(&finished);
        hook.add(move |_| async move {
            f.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(hook.shutdown().await, 2);
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_timeout_invokes_every_callback_with_expired_context() {
        let hook = Hook::new(Duration::ZERO);
        let expired = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let expired = Arc::clone(&expired);
            hook.add(move |ctx| async move {
                if ctx.is_expired() {
                    expired.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
        hook.add(|_| std::future::pending::<()>());

        assert_eq!(hook.shutdown().await, 3);
        assert_eq!(expired.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn context_reports_remaining_time() {
        let hook = Hook::new(Duration::from_secs(10));
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        hook.add(move |ctx| async move {
            *slot.lock() = Some(ctx.remaining());
        });

        hook.shutdown().await;

        let remaining = seen.lock().unwrap_or_default();
        assert!(remaining > Duration::from_secs(9) && remaining <= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn wait_for_runs_after_trigger() {
        let hook = Hook::new(Duration::from_secs(1));
        hook.add(|_| async {});
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let waiter = {
            let hook = hook.clone();
            tokio::spawn(async move { hook.wait_for(async { let _ = rx.await; }).await })
        };
        let _ = tx.send(());

        assert_eq!(waiter.await.unwrap(), 1);
    }
}
