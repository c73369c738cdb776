// ABOUTME: Simulation binary - seats a table of diners and narrates the meal.
// ABOUTME: Demonstrates driving the symposium library from the command line.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use tracing::info;

use symposium::prelude::*;

/// Dining philosophers with a central admission arbiter.
#[derive(Parser, Debug)]
#[command(name = "dine-sim", version, about)]
struct Cli {
    /// Number of seats around the table.
    #[arg(long, default_value_t = 5)]
    diners: usize,

    /// Meals each diner must finish.
    #[arg(long, default_value_t = 3)]
    quota: usize,

    /// Concurrent eaters allowed; defaults to diners - 2.
    #[arg(long)]
    capacity: Option<usize>,

    /// Base thinking time per cycle, in milliseconds.
    #[arg(long, default_value_t = 100)]
    think_ms: u64,

    /// Base eating time per meal, in milliseconds.
    #[arg(long, default_value_t = 200)]
    eat_ms: u64,

    /// Randomize the think/eat times for this run, up to +/-50% of the base.
    #[arg(long)]
    jitter: bool,

    /// Emit events as JSON lines instead of prose.
    #[arg(long)]
    json: bool,
}

fn jittered(base_ms: u64, jitter: bool) -> Duration {
    if !jitter || base_ms == 0 {
        return Duration::from_millis(base_ms);
    }
    let low = base_ms / 2;
    let high = base_ms + base_ms / 2;
    Duration::from_millis(rand::thread_rng().gen_range(low..=high))
}

fn describe(event: &TableEvent) {
    let diner = event.diner;
    match event.transition {
        Transition::Thinking => println!("Diner {diner} is thinking"),
        Transition::Requesting => println!("Diner {diner} asks to eat"),
        Transition::Denied => println!("Diner {diner} was turned away"),
        Transition::Granted => println!("Diner {diner} may eat"),
        Transition::ForksTaken => println!("Diner {diner} picked up both forks"),
        Transition::Eating { meal } => println!("Diner {diner} is eating meal {meal}"),
        Transition::ForksReturned => println!("Diner {diner} put the forks down"),
        Transition::Finished { meals } => println!("Diner {diner} has eaten {meals} meals"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("symposium=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let capacity = cli
        .capacity
        .unwrap_or_else(|| cli.diners.saturating_sub(2).max(1));

    let (observer, mut events) = ChannelObserver::new();
    let json = cli.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => eprintln!("event serialization failed: {e}"),
                }
            } else {
                describe(&event);
            }
        }
    });

    let config = TableConfig::new(cli.diners)
        .quota(cli.quota)
        .capacity(capacity)
        .think_for(jittered(cli.think_ms, cli.jitter))
        .eat_for(jittered(cli.eat_ms, cli.jitter))
        .observer(Arc::new(observer));

    let summary = Table::new(config).run().await?;
    printer.await?;

    info!(run_id = %summary.run_id, "run complete");
    for report in &summary.reports {
        println!(
            "Diner {} finished {} meals ({} denials absorbed)",
            report.diner, report.meals_completed, report.denials
        );
    }
    println!("{} meals served in total", summary.total_meals);
    Ok(())
}
