//! Clock and deferred-task scheduling behind the copy tracker.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Deferred work run once by a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Time source plus one-shot timers. Cancelling a handle guarantees its task never runs
/// if it has not started yet.
pub trait Scheduler: Send + Sync {
    type Handle: Send + 'static;

    fn now(&self) -> Instant;

    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}

/// Timers backed by the tokio runtime the scheduler was created on.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Scheduler on the current runtime. Fails outside a tokio context.
    pub fn try_current() -> Result<Self, tokio::runtime::TryCurrentError> {
        tokio::runtime::Handle::try_current().map(|runtime| Self { runtime })
    }
}

impl Scheduler for TokioScheduler {
    type Handle = CancellationToken;

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn schedule(&self, delay: Duration, task: Task) -> CancellationToken {
        // Deadline is fixed now, not when the runtime first polls the spawned task.
        let deadline = tokio::time::Instant::now() + delay;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => task(),
            }
        });
        token
    }

    fn cancel(&self, handle: CancellationToken) {
        handle.cancel();
    }
}

/// Identifier of a timer on a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Pending {
    id: TimerId,
    due: Duration,
    task: Task,
}

struct ManualState {
    origin: Instant,
    elapsed: Duration,
    next_id: u64,
    pending: Vec<Pending>,
}

/// Virtual clock: time only moves through [`ManualScheduler::advance`], which runs
/// every timer that falls due, in deadline order. Clones share the same clock.
#[derive(Clone)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
                next_id: 0,
                pending: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time elapsed on the virtual clock since creation.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Number of timers not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Move the clock forward by `by`, running due tasks outside the internal lock.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().elapsed + by;
        loop {
            let task = {
                let mut state = self.lock();
                let next = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.id.0))
                    .map(|(i, _)| i);
                match next {
                    Some(i) => {
                        let fired = state.pending.remove(i);
                        state.elapsed = fired.due;
                        fired.task
                    }
                    None => {
                        state.elapsed = target;
                        break;
                    }
                }
            };
            task();
        }
    }
}

impl Scheduler for ManualScheduler {
    type Handle = TimerId;

    fn now(&self) -> Instant {
        let state = self.lock();
        state.origin + state.elapsed
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.lock();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let due = state.elapsed + delay;
        state.pending.push(Pending { id, due, task });
        id
    }

    fn cancel(&self, handle: TimerId) {
        self.lock().pending.retain(|p| p.id != handle);
    }
}
