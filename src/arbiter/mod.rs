// ABOUTME: Arbiter module - the serialized admission controller.
// ABOUTME: Bounds how many diners hold forks at once, which is what rules out deadlock.

mod arbiter;

pub use arbiter::{Arbiter, ArbiterHandle, ArbiterMsg, Verdict};
