// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use symposium::prelude::*;` to get started quickly.

pub use crate::arbiter::{Arbiter, ArbiterHandle, ArbiterMsg, Verdict};
pub use crate::diner::{Diner, DinerId, DinerReport};
pub use crate::error::{ConfigError, InvariantViolation, SymposiumError};
pub use crate::event::{ChannelObserver, Observer, ObserverSet, TableEvent, Transition};
pub use crate::fork::Fork;
pub use crate::table::{Countdown, MIN_DINERS, Table, TableConfig, TableSummary};
