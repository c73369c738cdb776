// ABOUTME: Integration tests running whole tables to completion.
// ABOUTME: Verifies deadlock freedom, mutual exclusion, and bounded concurrency end to end.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use symposium::prelude::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Run a table with an attached channel observer and drain its events.
///
/// The outer timeout runs on virtual time, so a deadlocked run fails the
/// test instead of hanging it.
async fn run_table(diners: usize, quota: usize, capacity: usize) -> (TableSummary, Vec<TableEvent>) {
    let (observer, mut rx) = ChannelObserver::new();
    let config = TableConfig::new(diners)
        .quota(quota)
        .capacity(capacity)
        .think_for(ms(1))
        .eat_for(ms(2))
        .observer(Arc::new(observer));

    let summary = tokio::time::timeout(Duration::from_secs(300), Table::new(config).run())
        .await
        .expect("simulation must terminate")
        .expect("run should complete");

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    (summary, events)
}

#[tokio::test(start_paused = true)]
async fn test_canonical_table_of_five() {
    let (summary, events) = run_table(5, 3, 2).await;

    assert_eq!(summary.reports.len(), 5);
    assert_eq!(summary.total_meals, 15);
    for (seat, report) in summary.reports.iter().enumerate() {
        assert_eq!(report.diner, DinerId(seat));
        assert_eq!(report.meals_completed, 3);
    }

    let eat_events = events
        .iter()
        .filter(|e| matches!(e.transition, Transition::Eating { .. }))
        .count();
    assert_eq!(eat_events, 15);
}

#[tokio::test(start_paused = true)]
async fn test_no_adjacent_eating_and_bounded_concurrency() {
    let diners = 5;
    let capacity = 2;
    let (_summary, events) = run_table(diners, 3, capacity).await;

    // Eating is published while both forks are held and ForksReturned
    // before either is released, so replaying the stream reconstructs who
    // held forks at each instant.
    let mut eating: HashSet<usize> = HashSet::new();
    for event in &events {
        match event.transition {
            Transition::Eating { .. } => {
                let seat = event.diner.0;
                let left_neighbor = (seat + diners - 1) % diners;
                let right_neighbor = (seat + 1) % diners;
                assert!(
                    !eating.contains(&left_neighbor),
                    "diners {left_neighbor} and {seat} share a fork but ate together"
                );
                assert!(
                    !eating.contains(&right_neighbor),
                    "diners {seat} and {right_neighbor} share a fork but ate together"
                );
                assert!(eating.insert(seat));
                assert!(
                    eating.len() <= capacity,
                    "more than {capacity} diners eating at once"
                );
            }
            Transition::ForksReturned => {
                assert!(eating.remove(&event.diner.0));
            }
            _ => {}
        }
    }
    assert!(eating.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_every_diner_follows_the_state_machine() {
    let quota = 3;
    let diners = 5;
    let (_summary, events) = run_table(diners, quota, 2).await;

    for seat in 0..diners {
        let transitions: Vec<Transition> = events
            .iter()
            .filter(|e| e.diner == DinerId(seat))
            .map(|e| e.transition)
            .collect();
        assert_cycle_shape(seat, &transitions, quota);
    }
}

/// Walk one diner's event stream and check it against the cycle grammar:
/// `(Thinking Requesting (Denied | Granted ForksTaken Eating ForksReturned))*`
/// terminated by a single `Finished`.
fn assert_cycle_shape(seat: usize, transitions: &[Transition], quota: usize) {
    use Transition::*;

    let mut meals = 0;
    let mut iter = transitions.iter().copied();
    loop {
        match iter.next() {
            Some(Thinking) => {
                match iter.next() {
                    Some(Requesting) => {}
                    other => panic!("diner {seat}: expected Requesting after Thinking, got {other:?}"),
                }
                match iter.next() {
                    Some(Denied) => {}
                    Some(Granted) => {
                        match iter.next() {
                            Some(ForksTaken) => {}
                            other => panic!("diner {seat}: expected ForksTaken after Granted, got {other:?}"),
                        }
                        match iter.next() {
                            Some(Eating { meal }) => {
                                meals += 1;
                                assert_eq!(meal, meals, "diner {seat}: meal numbers must be sequential");
                            }
                            other => panic!("diner {seat}: expected Eating after ForksTaken, got {other:?}"),
                        }
                        match iter.next() {
                            Some(ForksReturned) => {}
                            other => panic!("diner {seat}: expected ForksReturned after Eating, got {other:?}"),
                        }
                    }
                    other => panic!("diner {seat}: expected a verdict after Requesting, got {other:?}"),
                }
            }
            Some(Finished { meals: reported }) => {
                assert_eq!(reported, quota, "diner {seat}: finished below quota");
                assert_eq!(meals, quota, "diner {seat}: eat events disagree with Finished");
                assert!(iter.next().is_none(), "diner {seat}: events after Finished");
                return;
            }
            other => panic!("diner {seat}: unexpected transition {other:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_capacity_at_n_minus_one_still_terminates() {
    let (summary, _events) = run_table(5, 3, 4).await;
    assert_eq!(summary.total_meals, 15);
}

#[tokio::test(start_paused = true)]
async fn test_capacity_of_one_serializes_but_terminates() {
    let (summary, events) = run_table(4, 2, 1).await;
    assert_eq!(summary.total_meals, 8);

    // With one seat there is never a second concurrent eater.
    let mut eating = 0usize;
    for event in &events {
        match event.transition {
            Transition::Eating { .. } => {
                eating += 1;
                assert_eq!(eating, 1);
            }
            Transition::ForksReturned => eating -= 1,
            _ => {}
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_smallest_ring_terminates() {
    let (summary, _events) = run_table(3, 2, 1).await;
    assert_eq!(summary.total_meals, 6);
    assert_eq!(summary.reports.len(), 3);
}

#[tokio::test]
async fn test_capacity_equal_to_diners_is_rejected() {
    let config = TableConfig::new(5).quota(3).capacity(5);
    let err = Table::new(config).run().await.unwrap_err();
    assert!(matches!(
        err,
        SymposiumError::Config(ConfigError::CapacityOutOfRange { got: 5, max: 4 })
    ));
}
