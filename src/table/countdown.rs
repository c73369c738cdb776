// ABOUTME: Countdown latch - tracks how many diners have yet to reach their terminal state.
// ABOUTME: Counts down from N to zero and wakes anyone waiting on completion.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// A one-way completion latch.
///
/// Created with the number of outstanding diners; each diner signals once at
/// its terminal state. The count only ever moves toward zero.
#[derive(Debug)]
pub struct Countdown {
    remaining: AtomicUsize,
    done: Notify,
}

impl Countdown {
    /// Create a latch expecting `count` signals.
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            done: Notify::new(),
        }
    }

    /// Number of signals still outstanding.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Record one terminal signal.
    ///
    /// # Panics
    ///
    /// Panics if called more times than the latch was created for; that is a
    /// logic defect, not a runtime condition.
    pub fn signal(&self) {
        let previous = self.remaining.fetch_sub(1, Ordering::SeqCst);
        assert!(previous > 0, "countdown signalled below zero");
        if previous == 1 {
            self.done.notify_waiters();
        }
    }

    /// Wait until every expected signal has arrived.
    pub async fn wait(&self) {
        while self.remaining() != 0 {
            let done = self.done.notified();
            tokio::pin!(done);
            // Register before the re-check so a signal landing in between
            // still wakes this waiter.
            done.as_mut().enable();
            if self.remaining() == 0 {
                return;
            }
            done.await;
        }
    }
}
