use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::task::JoinHandle;

/// Wraps a handler so a burst of calls collapses into one invocation carrying
/// the last call's argument, fired once the input has been quiet for
/// `quiet_period`. Pending work is aborted when the debouncer is dropped.
pub struct Debouncer<T> {
    quiet_period: Duration,
    handler: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(quiet_period: Duration, handler: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            quiet_period,
            handler: Arc::new(handler),
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Must be called from within a tokio runtime.
    pub fn call(&self, arg: T) {
        let handler = Arc::clone(&self.handler);
        let quiet_period = self.quiet_period;
        let mut pending = self.lock_pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            handler(arg);
        }));
    }

    pub fn cancel(&self) {
        if let Some(previous) = self.lock_pending().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let pending = match self.pending.get_mut() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
