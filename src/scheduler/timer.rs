use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{DelayedExecutor, Task, TaskHandle};

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;
const CANCELLED: u8 = 3;

/// Runs delayed tasks on a single background thread, in deadline order.
///
/// Dropping the timer stops the thread; tasks that have not fired yet are discarded.
#[derive(Debug)]
pub struct Timer {
    sender: Option<Sender<ScheduledTask>>,
    worker: Option<JoinHandle<()>>,
}

/// Handle to a task submitted to a [`Timer`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    state: Arc<AtomicU8>,
}

struct ScheduledTask {
    deadline: Instant,
    sequence: u64,
    task: Task,
    state: Arc<AtomicU8>,
}

impl Timer {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("record-session-timer".into())
            .spawn(move || run(receiver));

        match worker {
            Ok(worker) => Self {
                sender: Some(sender),
                worker: Some(worker),
            },
            Err(err) => {
                warn!("could not start the timer thread, delayed tasks will not run: {err}");
                Self {
                    sender: None,
                    worker: None,
                }
            }
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayedExecutor for Timer {
    type Handle = TimerHandle;

    fn execute_after(&self, task: Task, delay: Duration) -> TimerHandle {
        let state = Arc::new(AtomicU8::new(PENDING));
        let Some(deadline) = Instant::now().checked_add(delay) else {
            warn!("delay of {delay:?} is out of range, task discarded");
            state.store(CANCELLED, Ordering::SeqCst);
            return TimerHandle { state };
        };
        let scheduled = ScheduledTask {
            deadline,
            sequence: 0,
            task,
            state: state.clone(),
        };

        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(scheduled).is_ok());
        if !sent {
            warn!("timer thread is not running, task discarded");
            state.store(CANCELLED, Ordering::SeqCst);
        }

        TimerHandle { state }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            // A task owning the last reference to the timer runs on the worker itself.
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}

impl TimerHandle {
    /// True until the task starts running or is cancelled.
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::SeqCst) == PENDING
    }

    pub fn is_done(&self) -> bool {
        self.state.load(Ordering::SeqCst) == DONE
    }
}

impl TaskHandle for TimerHandle {
    fn cancel(&self) {
        let _ = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst);
    }
}

impl ScheduledTask {
    fn fire(self) {
        if self
            .state
            .compare_exchange(PENDING, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("skipping cancelled task");
            return;
        }
        if panic::catch_unwind(AssertUnwindSafe(self.task)).is_err() {
            warn!("delayed task panicked");
        }
        self.state.store(DONE, Ordering::SeqCst);
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        (self.deadline, self.sequence).cmp(&(other.deadline, other.sequence))
    }
}

fn run(receiver: Receiver<ScheduledTask>) {
    let mut queue: BinaryHeap<Reverse<ScheduledTask>> = BinaryHeap::new();
    let mut sequence = 0u64;

    loop {
        let now = Instant::now();
        while queue
            .peek()
            .is_some_and(|Reverse(next)| next.deadline <= now)
        {
            if let Some(Reverse(due)) = queue.pop() {
                due.fire();
            }
        }

        let received = match queue.peek() {
            Some(Reverse(next)) => {
                receiver.recv_timeout(next.deadline.saturating_duration_since(Instant::now()))
            }
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(mut scheduled) => {
                // Ties on the deadline fire in submission order.
                scheduled.sequence = sequence;
                sequence += 1;
                queue.push(Reverse(scheduled));
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("timer stopped, discarding {} pending tasks", queue.len());
                break;
            }
        }
    }
}
