// ABOUTME: Diner task - repeats the think/request/eat cycle until its quota is met.
// ABOUTME: Acquires left fork then right; deadlock freedom comes from the arbiter's cap, not the order.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::debug;

use crate::arbiter::{ArbiterHandle, Verdict};
use crate::error::SymposiumError;
use crate::event::{ObserverSet, Transition};
use crate::fork::Fork;
use crate::table::Countdown;

/// Identity of a diner: its seat position around the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DinerId(pub usize);

impl std::fmt::Display for DinerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a finished diner task.
#[derive(Debug, Clone, Serialize)]
pub struct DinerReport {
    /// Which seat this report belongs to.
    pub diner: DinerId,
    /// Successful eat-cycles completed; equals the quota on a clean run.
    pub meals_completed: usize,
    /// Admission requests that came back denied.
    pub denials: usize,
}

/// A diner: needs both adjacent forks for the duration of each meal.
///
/// The two fork associations are fixed at construction and never reassigned.
/// Left is the fork at the diner's own position, right is the next position
/// around the ring, so neighboring diners contend for the fork between them.
pub struct Diner {
    id: DinerId,
    left: Arc<Fork>,
    right: Arc<Fork>,
    quota: usize,
    think_for: Duration,
    eat_for: Duration,
    arbiter: ArbiterHandle,
    observers: ObserverSet,
}

impl Diner {
    /// Create a diner wired to its two forks and the arbiter.
    ///
    /// Defaults: quota 3, think 5ms, eat 10ms, no observers.
    pub fn new(id: DinerId, left: Arc<Fork>, right: Arc<Fork>, arbiter: ArbiterHandle) -> Self {
        Self {
            id,
            left,
            right,
            quota: 3,
            think_for: Duration::from_millis(5),
            eat_for: Duration::from_millis(10),
            arbiter,
            observers: ObserverSet::new(),
        }
    }

    /// Set how many meals this diner must finish.
    pub fn quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Set the thinking pause between cycles.
    pub fn think_for(mut self, think_for: Duration) -> Self {
        self.think_for = think_for;
        self
    }

    /// Set the simulated eating duration.
    pub fn eat_for(mut self, eat_for: Duration) -> Self {
        self.eat_for = eat_for;
        self
    }

    /// Attach the observers transition events are published to.
    pub fn observers(mut self, observers: ObserverSet) -> Self {
        self.observers = observers;
        self
    }

    /// This diner's seat.
    pub fn id(&self) -> DinerId {
        self.id
    }

    /// Run the think/eat cycle until the quota is met.
    ///
    /// Signals `countdown` exactly once when the diner reaches its terminal
    /// state, whether the cycle finished cleanly or aborted on an error.
    /// After that signal the diner performs no further fork or arbiter
    /// operations.
    pub async fn run(self, countdown: Arc<Countdown>) -> Result<DinerReport, SymposiumError> {
        let result = self.cycle().await;
        countdown.signal();
        result
    }

    async fn cycle(&self) -> Result<DinerReport, SymposiumError> {
        let mut meals_completed = 0;
        let mut denials = 0;

        while meals_completed < self.quota {
            self.observers.publish(self.id, Transition::Thinking).await;
            sleep(self.think_for).await;

            self.observers.publish(self.id, Transition::Requesting).await;
            match self.arbiter.request(self.id).await? {
                Verdict::Denied => {
                    denials += 1;
                    self.observers.publish(self.id, Transition::Denied).await;
                    continue;
                }
                Verdict::Granted => {
                    self.observers.publish(self.id, Transition::Granted).await;
                }
            }

            // Left always before right. Two neighbors may each hold their
            // left fork at this point; the arbiter's cap is what rules out
            // the full circular wait, not this ordering.
            self.left.acquire(self.id).await;
            self.right.acquire(self.id).await;
            self.observers.publish(self.id, Transition::ForksTaken).await;

            meals_completed += 1;
            self.observers
                .publish(self.id, Transition::Eating { meal: meals_completed })
                .await;
            sleep(self.eat_for).await;

            // Published while both forks are still held.
            self.observers.publish(self.id, Transition::ForksReturned).await;
            self.right.release(self.id).await?;
            self.left.release(self.id).await?;

            self.arbiter.report_completion(self.id).await?;
            debug!(diner = %self.id, meals_completed, "cycle complete");
        }

        self.observers
            .publish(self.id, Transition::Finished { meals: meals_completed })
            .await;
        Ok(DinerReport {
            diner: self.id,
            meals_completed,
            denials,
        })
    }
}
