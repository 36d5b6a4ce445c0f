use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    COPIED_LABEL, COPY_LABEL, CopyEvent, CopyTracker, ManualScheduler, Scheduler, TokioScheduler,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn recorded(tracker: &CopyTracker<impl Scheduler>) -> Arc<Mutex<Vec<CopyEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    tracker.subscribe(move |event| sink.lock().expect("events lock").push(event));
    events
}

#[test]
fn copied_immediately_after_mark() {
    let clock = ManualScheduler::new();
    let tracker = CopyTracker::new(clock.clone());
    assert!(!tracker.is_copied(0));
    tracker.mark_copied(0);
    assert!(tracker.is_copied(0));
    assert!(!tracker.is_copied(1));
}

#[test]
fn expires_after_window_without_queries() {
    let clock = ManualScheduler::new();
    let tracker = CopyTracker::new(clock.clone());
    let events = recorded(&tracker);

    tracker.mark_copied(0);
    clock.advance(ms(1999));
    assert!(tracker.is_copied(0));
    clock.advance(ms(1));
    assert!(!tracker.is_copied(0));
    assert_eq!(clock.pending(), 0);
    assert_eq!(
        *events.lock().expect("events lock"),
        [
            CopyEvent {
                index: 0,
                copied: true
            },
            CopyEvent {
                index: 0,
                copied: false
            },
        ]
    );
}

#[test]
fn remark_resets_window_and_cancels_stale_timer() {
    let clock = ManualScheduler::new();
    let tracker = CopyTracker::new(clock.clone());
    let events = recorded(&tracker);

    tracker.mark_copied(0);
    clock.advance(ms(1500));
    tracker.mark_copied(0);
    assert_eq!(clock.pending(), 1);

    // Just before and just after the first deadline: still copied.
    clock.advance(ms(499));
    assert!(tracker.is_copied(0));
    clock.advance(ms(2));
    assert!(tracker.is_copied(0));

    clock.advance(ms(1498));
    assert!(tracker.is_copied(0));
    clock.advance(ms(1));
    assert!(!tracker.is_copied(0));

    let events = events.lock().expect("events lock");
    let reverts = events.iter().filter(|e| !e.copied).count();
    assert_eq!(reverts, 1);
}

#[test]
fn indices_expire_independently() {
    let clock = ManualScheduler::new();
    let tracker = CopyTracker::new(clock.clone());

    tracker.mark_copied(0);
    clock.advance(ms(1000));
    tracker.mark_copied(2);
    clock.advance(ms(1000));
    assert!(!tracker.is_copied(0));
    assert!(tracker.is_copied(2));
    clock.advance(ms(1000));
    assert!(!tracker.is_copied(2));
}

#[test]
fn labels_follow_state() {
    let clock = ManualScheduler::new();
    let tracker = CopyTracker::new(clock.clone());
    assert_eq!(tracker.label(3), COPY_LABEL);
    tracker.mark_copied(3);
    assert_eq!(tracker.label(3), COPIED_LABEL);
    clock.advance(tracker.window());
    assert_eq!(tracker.label(3), COPY_LABEL);
}

#[test]
fn custom_window() {
    let clock = ManualScheduler::new();
    let tracker = CopyTracker::with_window(clock.clone(), ms(250));
    tracker.mark_copied(1);
    clock.advance(ms(249));
    assert!(tracker.is_copied(1));
    clock.advance(ms(1));
    assert!(!tracker.is_copied(1));
}

#[test]
fn clear_cancels_pending_reversals_silently() {
    let clock = ManualScheduler::new();
    let tracker = CopyTracker::new(clock.clone());
    tracker.mark_copied(0);
    tracker.mark_copied(1);
    let events = recorded(&tracker);

    tracker.clear();
    assert_eq!(clock.pending(), 0);
    assert!(!tracker.is_copied(0));
    clock.advance(ms(5000));
    assert!(events.lock().expect("events lock").is_empty());
}

#[test]
fn drop_cancels_pending_reversals() {
    let clock = ManualScheduler::new();
    {
        let tracker = CopyTracker::new(clock.clone());
        tracker.mark_copied(0);
        assert_eq!(clock.pending(), 1);
    }
    assert_eq!(clock.pending(), 0);
    clock.advance(ms(5000));
}

#[test]
fn manual_clock_runs_timers_in_deadline_order() {
    let clock = ManualScheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for (label, delay) in [("late", 30), ("early", 10), ("mid", 20)] {
        let order = order.clone();
        clock.schedule(
            ms(delay),
            Box::new(move || order.lock().expect("order lock").push(label)),
        );
    }
    let cancelled = {
        let order = order.clone();
        clock.schedule(
            ms(15),
            Box::new(move || order.lock().expect("order lock").push("cancelled")),
        )
    };
    clock.cancel(cancelled);
    clock.advance(ms(25));
    assert_eq!(*order.lock().expect("order lock"), ["early", "mid"]);
    assert_eq!(clock.elapsed(), ms(25));
    clock.advance(ms(5));
    assert_eq!(*order.lock().expect("order lock"), ["early", "mid", "late"]);
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_reverts_on_timer() {
    let scheduler = TokioScheduler::try_current().expect("inside runtime");
    let tracker = CopyTracker::new(scheduler);
    let events = recorded(&tracker);

    tracker.mark_copied(0);
    assert!(tracker.is_copied(0));
    tokio::time::sleep(ms(1999)).await;
    assert!(tracker.is_copied(0));
    tokio::time::sleep(ms(2)).await;
    tokio::task::yield_now().await;
    assert!(!tracker.is_copied(0));
    assert_eq!(
        events.lock().expect("events lock").last(),
        Some(&CopyEvent {
            index: 0,
            copied: false
        })
    );
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_supersedes_stale_timer() {
    let scheduler = TokioScheduler::try_current().expect("inside runtime");
    let tracker = CopyTracker::new(scheduler);
    let events = recorded(&tracker);

    tracker.mark_copied(0);
    tokio::time::sleep(ms(1500)).await;
    tracker.mark_copied(0);
    tokio::time::sleep(ms(1000)).await;
    tokio::task::yield_now().await;
    assert!(tracker.is_copied(0));
    tokio::time::sleep(ms(1100)).await;
    tokio::task::yield_now().await;
    assert!(!tracker.is_copied(0));

    let events = events.lock().expect("events lock");
    assert_eq!(events.iter().filter(|e| !e.copied).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn tokio_scheduler_deadline_counts_from_mark() {
    let scheduler = TokioScheduler::try_current().expect("inside runtime");
    let tracker = CopyTracker::new(scheduler);
    let events = recorded(&tracker);

    // The clock jumps past the window before the timer task is ever polled.
    tracker.mark_copied(0);
    tokio::time::advance(ms(2000)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!tracker.is_copied(0));
    assert_eq!(
        events.lock().expect("events lock").last(),
        Some(&CopyEvent {
            index: 0,
            copied: false
        })
    );
}
