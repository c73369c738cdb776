// ABOUTME: Defines all error types for the symposium library using thiserror.
// ABOUTME: Startup configuration errors and fatal invariant violations, unified under SymposiumError.

use crate::diner::DinerId;

/// Top-level error type for the symposium library.
#[derive(Debug, thiserror::Error)]
pub enum SymposiumError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    /// The arbiter's channel closed while diners were still running. This
    /// only happens after the arbiter aborted on an invariant violation, so
    /// it carries the same weight: the run is over.
    #[error("arbiter unavailable: admission channel closed while diners were still active")]
    ArbiterUnavailable,

    #[error("task join failed: {0}")]
    Join(String),
}

/// Configuration problems, rejected synchronously before any task starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("a ring needs at least 3 diners, got {0}")]
    TooFewDiners(usize),

    #[error("quota must be at least 1 meal per diner")]
    QuotaTooSmall,

    #[error("capacity must be between 1 and {max}, got {got}")]
    CapacityOutOfRange { got: usize, max: usize },
}

/// Broken safety properties. These indicate a logic defect, not a runtime
/// condition to recover from; the simulation aborts rather than clamping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("fork {position} released by diner {diner} but held by diner {holder}")]
    ForkHeldByOther {
        position: usize,
        diner: DinerId,
        holder: DinerId,
    },

    #[error("fork {position} released by diner {diner} but not held by anyone")]
    ForkNotHeld { position: usize, diner: DinerId },

    #[error("diner {0} reported completion without a matching grant")]
    CompletionWithoutGrant(DinerId),

    #[error("diner {0} requested admission while already admitted")]
    RequestWhileEating(DinerId),

    #[error("{0} diners still marked eating at arbiter shutdown")]
    DinersStillEating(usize),
}
