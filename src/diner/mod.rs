// ABOUTME: Diner module - the agent task cycling think/request/acquire/eat/release.
// ABOUTME: Defines diner identity, the run loop, and the per-diner report.

mod diner;

pub use diner::{Diner, DinerId, DinerReport};
