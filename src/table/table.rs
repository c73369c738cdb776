// ABOUTME: The table - wires forks, diners, and the arbiter into a ring and runs the meal.
// ABOUTME: Spawns everything, blocks on the countdown, and surfaces the first failure.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::config::TableConfig;
use super::countdown::Countdown;
use crate::arbiter::Arbiter;
use crate::diner::{Diner, DinerId, DinerReport};
use crate::error::SymposiumError;
use crate::fork::Fork;

/// Aggregate result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    /// Unique id for this run.
    pub run_id: String,
    /// Per-diner reports, in seat order.
    pub reports: Vec<DinerReport>,
    /// Meals eaten across all diners; diners x quota on a clean run.
    pub total_meals: usize,
}

/// The coordinator: builds the ring and runs the simulation to completion.
///
/// Forks and the arbiter are constructed here and handed to each diner task;
/// nothing lives in ambient global state.
pub struct Table {
    config: TableConfig,
}

impl Table {
    /// Create a table from a configuration. Validation happens in [`run`].
    ///
    /// [`run`]: Table::run
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    /// Run the simulation to completion.
    ///
    /// Validates the configuration, spawns the arbiter and one task per
    /// diner, then blocks until every diner has signalled its terminal
    /// state. Returns the first diner or arbiter failure, if any; otherwise
    /// the aggregate summary.
    pub async fn run(self) -> Result<TableSummary, SymposiumError> {
        self.config.validate()?;
        let TableConfig {
            diners: count,
            quota,
            capacity,
            think_for,
            eat_for,
            observers,
        } = self.config;

        let run_id = Uuid::new_v4().to_string();
        info!(%run_id, diners = count, quota, capacity, "table seated");

        let forks: Vec<Arc<Fork>> = (0..count).map(|i| Arc::new(Fork::new(i))).collect();
        let (arbiter, handle) = Arbiter::new(capacity);
        let arbiter_task = tokio::spawn(arbiter.run());
        let countdown = Arc::new(Countdown::new(count));

        let mut diner_tasks: Vec<JoinHandle<Result<DinerReport, SymposiumError>>> =
            Vec::with_capacity(count);
        for seat in 0..count {
            let diner = Diner::new(
                DinerId(seat),
                forks[seat].clone(),
                forks[(seat + 1) % count].clone(),
                handle.clone(),
            )
            .quota(quota)
            .think_for(think_for)
            .eat_for(eat_for)
            .observers(observers.clone());
            diner_tasks.push(tokio::spawn(diner.run(countdown.clone())));
        }
        // The arbiter loop ends once every diner's handle clone is gone.
        drop(handle);

        countdown.wait().await;
        debug!(%run_id, "all diners signalled");

        let mut reports = Vec::with_capacity(count);
        for task in diner_tasks {
            match task.await {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(SymposiumError::Join(e.to_string())),
            }
        }

        arbiter_task
            .await
            .map_err(|e| SymposiumError::Join(e.to_string()))??;

        let total_meals = reports.iter().map(|r| r.meals_completed).sum();
        info!(%run_id, total_meals, "table cleared");
        Ok(TableSummary {
            run_id,
            reports,
            total_meals,
        })
    }
}
