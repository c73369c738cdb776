// ABOUTME: Fork - an exchangeable resource token with owner-checked release.
// ABOUTME: At most one holder at any instant; acquire blocks until the fork is free.

use tokio::sync::{Mutex, Notify};

use crate::diner::DinerId;
use crate::error::InvariantViolation;

/// A single-owner resource token, shared by exactly two ring-adjacent diners.
///
/// `acquire` blocks until the fork is free; `release` verifies that the
/// caller is the current holder and fails loudly otherwise. Fairness between
/// the two contenders is that of [`Notify`]; contention stays bounded because
/// the arbiter caps how many diners may be acquiring at once.
#[derive(Debug)]
pub struct Fork {
    position: usize,
    holder: Mutex<Option<DinerId>>,
    freed: Notify,
}

impl Fork {
    /// Create a free fork at the given ring position.
    pub fn new(position: usize) -> Self {
        Self {
            position,
            holder: Mutex::new(None),
            freed: Notify::new(),
        }
    }

    /// The fork's position in the ring.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Take ownership of the fork, waiting until it is free.
    pub async fn acquire(&self, diner: DinerId) {
        loop {
            // Created before the ownership check so a release between the
            // check and the await leaves a stored permit rather than a lost
            // wakeup.
            let freed = self.freed.notified();
            {
                let mut guard = self.holder.lock().await;
                if guard.is_none() {
                    *guard = Some(diner);
                    return;
                }
            }
            freed.await;
        }
    }

    /// Give the fork back.
    ///
    /// Only the current holder may release. A release by anyone else, or of
    /// a fork that is already free, is a fatal [`InvariantViolation`].
    pub async fn release(&self, diner: DinerId) -> Result<(), InvariantViolation> {
        let mut guard = self.holder.lock().await;
        match *guard {
            Some(holder) if holder == diner => {
                *guard = None;
                drop(guard);
                self.freed.notify_one();
                Ok(())
            }
            Some(holder) => Err(InvariantViolation::ForkHeldByOther {
                position: self.position,
                diner,
                holder,
            }),
            None => Err(InvariantViolation::ForkNotHeld {
                position: self.position,
                diner,
            }),
        }
    }

    /// Current holder, if any. Primarily for inspection in tests.
    pub async fn holder(&self) -> Option<DinerId> {
        *self.holder.lock().await
    }
}
