// ABOUTME: Typed state-transition events and the observer seam.
// ABOUTME: Observers receive every diner transition; observer failures never stop the run.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::diner::DinerId;

/// A diner state-machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Away from the table between meals.
    Thinking,
    /// Waiting on the arbiter's verdict.
    Requesting,
    /// Turned away; the diner thinks again before retrying.
    Denied,
    /// Admitted to the fork-holding phase.
    Granted,
    /// Both forks in hand.
    ForksTaken,
    /// Consuming meal number `meal` (1-based).
    Eating { meal: usize },
    /// Published before either fork is released, so observers never see
    /// adjacent eating intervals overlap.
    ForksReturned,
    /// Quota met; the diner leaves the table for good.
    Finished { meals: usize },
}

/// A single observed transition, stamped when it was published.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableEvent {
    /// Which diner moved.
    pub diner: DinerId,
    /// Where it moved to.
    pub transition: Transition,
    /// Wall-clock publication time.
    pub at: SystemTime,
}

/// Receives table events as they happen.
///
/// Called in publication order, once per event. Returning `Err` is reported
/// via `tracing` and otherwise ignored; observation is best-effort and never
/// aborts the simulation.
#[async_trait]
pub trait Observer: Send + Sync {
    /// Handle one published event.
    async fn observe(&self, event: TableEvent) -> Result<(), anyhow::Error>;
}

/// Forwards events into an unbounded channel, for tests and CLI printers.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<TableEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end it feeds.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TableEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Observer for ChannelObserver {
    async fn observe(&self, event: TableEvent) -> Result<(), anyhow::Error> {
        self.tx
            .send(event)
            .map_err(|_| anyhow::anyhow!("event receiver dropped"))
    }
}

/// The observers attached to a table run.
///
/// Cloned into every diner; publishing fans out to each observer in
/// registration order.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer.
    pub fn attach(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Whether any observers are attached.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Publish one transition to every observer.
    pub(crate) async fn publish(&self, diner: DinerId, transition: Transition) {
        trace!(%diner, ?transition, "transition");

        let event = TableEvent {
            diner,
            transition,
            at: SystemTime::now(),
        };
        for observer in &self.observers {
            if let Err(e) = observer.observe(event).await {
                warn!(%diner, error = %e, "observer failed");
            }
        }
    }
}
