// ABOUTME: Table configuration - diner count, quota, capacity, pacing, observers.
// ABOUTME: Validation rejects unsafe parameters before any task is spawned.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::event::{Observer, ObserverSet};

/// Smallest ring in which distinct neighbors actually share forks.
pub const MIN_DINERS: usize = 3;

/// Configuration for a table run.
#[derive(Clone)]
pub struct TableConfig {
    pub(crate) diners: usize,
    pub(crate) quota: usize,
    pub(crate) capacity: usize,
    pub(crate) think_for: Duration,
    pub(crate) eat_for: Duration,
    pub(crate) observers: ObserverSet,
}

impl TableConfig {
    /// Create a config for `diners` seats.
    ///
    /// Defaults: quota 3, capacity `diners - 2` (never below 1), think 5ms,
    /// eat 10ms, no observers.
    pub fn new(diners: usize) -> Self {
        Self {
            diners,
            quota: 3,
            capacity: diners.saturating_sub(2).max(1),
            think_for: Duration::from_millis(5),
            eat_for: Duration::from_millis(10),
            observers: ObserverSet::new(),
        }
    }

    /// Set how many meals each diner must finish.
    pub fn quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Set how many diners may hold forks at once.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
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

    /// Attach an observer for transition events.
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.attach(observer);
        self
    }

    /// Check the parameters before any task starts.
    ///
    /// Capacity must stay in `1..=diners - 1`: at `diners` the whole ring
    /// could be admitted at once and the circular wait becomes possible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.diners < MIN_DINERS {
            return Err(ConfigError::TooFewDiners(self.diners));
        }
        if self.quota < 1 {
            return Err(ConfigError::QuotaTooSmall);
        }
        if self.capacity < 1 || self.capacity > self.diners - 1 {
            return Err(ConfigError::CapacityOutOfRange {
                got: self.capacity,
                max: self.diners - 1,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TableConfig::new(5);
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity, 3);
        assert_eq!(config.quota, 3);

        // The smallest ring still gets a workable capacity.
        let config = TableConfig::new(3);
        assert_eq!(config.capacity, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_too_few_diners() {
        let err = TableConfig::new(2).validate().unwrap_err();
        assert_eq!(err, ConfigError::TooFewDiners(2));
    }

    #[test]
    fn test_rejects_zero_quota() {
        let err = TableConfig::new(5).quota(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::QuotaTooSmall);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = TableConfig::new(5).capacity(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::CapacityOutOfRange { got: 0, max: 4 });
    }

    #[test]
    fn test_rejects_capacity_equal_to_diners() {
        let err = TableConfig::new(5).capacity(5).validate().unwrap_err();
        assert_eq!(err, ConfigError::CapacityOutOfRange { got: 5, max: 4 });
    }

    #[test]
    fn test_accepts_capacity_at_the_boundary() {
        assert!(TableConfig::new(5).capacity(4).validate().is_ok());
        assert!(TableConfig::new(5).capacity(1).validate().is_ok());
    }
}
