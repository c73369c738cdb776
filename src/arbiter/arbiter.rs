// ABOUTME: Admission arbiter - single serialized decision point for entering the eating phase.
// ABOUTME: Event loop over request/completion messages with a bounded set of active eaters.

use std::collections::HashSet;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::diner::DinerId;
use crate::error::{InvariantViolation, SymposiumError};

/// Reply to an admission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The diner may proceed to pick up its forks.
    Granted,
    /// The table is full; the diner goes back to thinking and retries.
    Denied,
}

/// Messages handled by the arbiter's event loop.
#[derive(Debug)]
pub enum ArbiterMsg {
    /// A diner asks to enter the fork-holding phase.
    Request {
        diner: DinerId,
        reply: oneshot::Sender<Verdict>,
    },
    /// A diner has put its forks down after eating.
    Completion { diner: DinerId },
}

/// Clonable handle for talking to a running arbiter.
#[derive(Debug, Clone)]
pub struct ArbiterHandle {
    tx: mpsc::Sender<ArbiterMsg>,
}

impl ArbiterHandle {
    /// Ask for admission and wait for the verdict.
    pub async fn request(&self, diner: DinerId) -> Result<Verdict, SymposiumError> {
        let (reply, verdict) = oneshot::channel();
        self.tx
            .send(ArbiterMsg::Request { diner, reply })
            .await
            .map_err(|_| SymposiumError::ArbiterUnavailable)?;
        verdict.await.map_err(|_| SymposiumError::ArbiterUnavailable)
    }

    /// Report that the diner has finished eating and released its forks.
    pub async fn report_completion(&self, diner: DinerId) -> Result<(), SymposiumError> {
        self.tx
            .send(ArbiterMsg::Completion { diner })
            .await
            .map_err(|_| SymposiumError::ArbiterUnavailable)
    }
}

/// The admission arbiter.
///
/// A single task owns the set of currently-admitted diners and serializes
/// every decision, so a grant can never interleave with a completion. With
/// capacity at most N-1, some diner can always finish acquiring its pair of
/// forks; that cap, not fork acquisition order, is what makes the ring
/// deadlock-free.
#[derive(Debug)]
pub struct Arbiter {
    capacity: usize,
    eating: HashSet<DinerId>,
    rx: mpsc::Receiver<ArbiterMsg>,
}

impl Arbiter {
    /// Create an arbiter and the handle diners use to reach it.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; [`crate::table::TableConfig::validate`]
    /// rejects that before an arbiter is ever built.
    pub fn new(capacity: usize) -> (Self, ArbiterHandle) {
        assert!(capacity > 0, "capacity must be positive");

        let (tx, rx) = mpsc::channel(32);
        (
            Self {
                capacity,
                eating: HashSet::new(),
                rx,
            },
            ArbiterHandle { tx },
        )
    }

    /// Run the event loop until every handle has been dropped.
    ///
    /// Invariant violations abort the loop immediately: they mean the safety
    /// property is already broken and further verdicts would be meaningless.
    /// A clean shutdown requires every grant to have a matching completion.
    pub async fn run(mut self) -> Result<(), SymposiumError> {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                ArbiterMsg::Request { diner, reply } => {
                    let verdict = self.admit(diner)?;
                    // A dropped reply means the requester is gone; rescind
                    // the grant so the seat is not leaked.
                    if reply.send(verdict).is_err() && verdict == Verdict::Granted {
                        self.eating.remove(&diner);
                    }
                }
                ArbiterMsg::Completion { diner } => {
                    if !self.eating.remove(&diner) {
                        return Err(InvariantViolation::CompletionWithoutGrant(diner).into());
                    }
                    debug!(%diner, active = self.eating.len(), "completion");
                }
            }
        }

        if !self.eating.is_empty() {
            return Err(InvariantViolation::DinersStillEating(self.eating.len()).into());
        }
        Ok(())
    }

    fn admit(&mut self, diner: DinerId) -> Result<Verdict, SymposiumError> {
        if self.eating.contains(&diner) {
            return Err(InvariantViolation::RequestWhileEating(diner).into());
        }

        if self.eating.len() < self.capacity {
            self.eating.insert(diner);
            debug!(%diner, active = self.eating.len(), "granted");
            Ok(Verdict::Granted)
        } else {
            debug!(%diner, "denied");
            Ok(Verdict::Denied)
        }
    }
}
