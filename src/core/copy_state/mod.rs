//! Per-message "copied" acknowledgement state for code blocks.
//!
//! One tracker belongs to one displayed message and is keyed by
//! [`CodeSegment::index`](crate::core::segment::CodeSegment). Marking a block schedules a
//! single reversal after the window; marking it again cancels the pending reversal first,
//! so a stale timer can never clear a newer copy.

mod scheduler;

pub use scheduler::{ManualScheduler, Scheduler, Task, TimerId, TokioScheduler};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

/// How long a block shows as copied.
pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_millis(2000);

/// Label shown on a code block header while it is acknowledged.
pub const COPIED_LABEL: &str = "Copied!";

/// Label shown on a code block header otherwise.
pub const COPY_LABEL: &str = "Copy";

/// Change notification for a code block's copy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyEvent {
    pub index: usize,
    pub copied: bool,
}

type Observer = Arc<dyn Fn(CopyEvent) + Send + Sync>;

struct Entry<H> {
    copied_at: Instant,
    generation: u64,
    timer: H,
}

struct TrackerState<H> {
    entries: HashMap<usize, Entry<H>>,
    next_generation: u64,
    observer: Option<Observer>,
}

/// Copy acknowledgement state for the code blocks of one message.
pub struct CopyTracker<S: Scheduler> {
    scheduler: S,
    window: Duration,
    state: Arc<Mutex<TrackerState<S::Handle>>>,
}

impl<S: Scheduler> CopyTracker<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_window(scheduler, COPY_FEEDBACK_WINDOW)
    }

    pub fn with_window(scheduler: S, window: Duration) -> Self {
        Self {
            scheduler,
            window,
            state: Arc::new(Mutex::new(TrackerState {
                entries: HashMap::new(),
                next_generation: 0,
                observer: None,
            })),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register the observer notified on every mark and every expiry. Replaces any previous one.
    pub fn subscribe(&self, observer: impl Fn(CopyEvent) + Send + Sync + 'static) {
        lock(&self.state).observer = Some(Arc::new(observer));
    }

    /// Record a copy of block `index` now, superseding any earlier copy of the same block.
    pub fn mark_copied(&self, index: usize) {
        let observer = {
            let mut state = lock(&self.state);
            if let Some(previous) = state.entries.remove(&index) {
                log::debug!("Copy of block {} superseded before expiry", index);
                self.scheduler.cancel(previous.timer);
            }
            let generation = state.next_generation;
            state.next_generation += 1;

            let weak = Arc::downgrade(&self.state);
            let timer = self.scheduler.schedule(
                self.window,
                Box::new(move || expire(&weak, index, generation)),
            );
            state.entries.insert(
                index,
                Entry {
                    copied_at: self.scheduler.now(),
                    generation,
                    timer,
                },
            );
            state.observer.clone()
        };
        notify(observer, CopyEvent { index, copied: true });
    }

    /// True if block `index` was copied less than one window ago.
    pub fn is_copied(&self, index: usize) -> bool {
        let now = self.scheduler.now();
        lock(&self.state)
            .entries
            .get(&index)
            .is_some_and(|entry| now.saturating_duration_since(entry.copied_at) < self.window)
    }

    /// Header label for block `index`.
    pub fn label(&self, index: usize) -> &'static str {
        if self.is_copied(index) {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    /// Drop every entry and cancel the pending reversals, without notifying.
    pub fn clear(&self) {
        let entries: Vec<Entry<S::Handle>> = {
            let mut state = lock(&self.state);
            state.entries.drain().map(|(_, entry)| entry).collect()
        };
        for entry in entries {
            self.scheduler.cancel(entry.timer);
        }
    }
}

impl<S: Scheduler> Drop for CopyTracker<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

fn lock<H>(state: &Mutex<TrackerState<H>>) -> MutexGuard<'_, TrackerState<H>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timer body: clear the entry only if it is still the copy that scheduled this timer.
fn expire<H>(state: &Weak<Mutex<TrackerState<H>>>, index: usize, generation: u64) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let observer = {
        let mut state = lock(&state);
        let current = state
            .entries
            .get(&index)
            .is_some_and(|entry| entry.generation == generation);
        if !current {
            return;
        }
        state.entries.remove(&index);
        state.observer.clone()
    };
    log::debug!("Copy acknowledgement for block {} expired", index);
    notify(observer, CopyEvent { index, copied: false });
}

fn notify(observer: Option<Observer>, event: CopyEvent) {
    if let Some(observer) = observer {
        observer(event);
    }
}

#[cfg(test)]
mod tests;
