//! Delayed execution where only the most recently scheduled task is allowed to fire.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

pub mod timer;

use timer::Timer;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a task submitted to a [`DelayedExecutor`].
pub trait TaskHandle {
    /// Prevents the task from firing if it has not started yet. Running tasks complete.
    fn cancel(&self);
}

/// Runs a task once `delay` has elapsed, never on the calling thread.
pub trait DelayedExecutor {
    type Handle: TaskHandle;

    fn execute_after(&self, task: Task, delay: Duration) -> Self::Handle;
}

/// Keeps at most one pending task: scheduling a new one cancels the previous one.
pub struct OneAtATimeScheduler<E = Timer>
where
    E: DelayedExecutor,
{
    executor: E,
    pending: Mutex<Option<E::Handle>>,
}

impl<E> fmt::Debug for OneAtATimeScheduler<E>
where
    E: DelayedExecutor,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_pending = self.pending.lock().map(|p| p.is_some()).ok();
        f.debug_struct("OneAtATimeScheduler")
            .field("executor", &"impl DelayedExecutor")
            .field("has_pending", &has_pending)
            .finish()
    }
}

impl Default for OneAtATimeScheduler<Timer> {
    fn default() -> Self {
        Self::new(Timer::new())
    }
}

impl<E> OneAtATimeScheduler<E>
where
    E: DelayedExecutor,
{
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            pending: Mutex::new(None),
        }
    }

    /// Runs `action` with `owner` after `delay`, superseding any task still pending.
    ///
    /// Only a weak reference to `owner` is kept. If it has been dropped by the time the delay
    /// elapses, nothing happens.
    pub fn schedule_after_delay<O, F>(&self, owner: &Arc<O>, action: F, delay: Duration)
    where
        O: Send + Sync + 'static,
        F: FnOnce(Arc<O>) + Send + 'static,
    {
        let owner = Arc::downgrade(owner);
        let task: Task = Box::new(move || match owner.upgrade() {
            Some(owner) => action(owner),
            None => debug!("owner of the scheduled task is gone, skipping"),
        });

        let handle = self.executor.execute_after(task, delay);

        // The slot only holds a handle, it cannot be left inconsistent by a panic.
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            debug!("superseding the pending scheduled task");
            previous.cancel();
        }
        *pending = Some(handle);
    }
}
