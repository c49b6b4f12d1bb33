//! Drive random traffic and show network statistics.

use anyhow::Result;
use colored::Colorize;
use mycel::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{build_network, populate};
use crate::config::Config;

/// Share of random transfers flagged as protected content.
const SACRED_SHARE: f64 = 0.1;

pub fn run(nodes: Option<u64>, transfers: Option<u64>, seed: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let nodes = nodes.unwrap_or(config.simulation.nodes).max(2);
    let transfers = transfers.unwrap_or(config.simulation.transfers);
    let seed = seed.or(config.simulation.seed);

    let network = build_network(&config, seed)?;
    populate(&network, nodes)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    for i in 0..transfers {
        let from = NodeId(rng.gen_range(0..nodes));
        let to = NodeId((from.0 + rng.gen_range(1..nodes)) % nodes);
        let metadata = if rng.gen_bool(SACRED_SHARE) {
            PatternMetadata::sacred()
        } else {
            PatternMetadata::default()
        };
        network.transfer(PatternId(rng.gen_range(0..16)), from, to, &metadata)?;
        if i % 25 == 24 {
            network.advance(1);
        }
    }

    print_stats(&network.health_check());
    Ok(())
}

pub fn print_stats(report: &HealthReport) {
    let stats = &report.stats;
    let status = match stats.status {
        NetworkStatus::Healthy => "healthy".green(),
        NetworkStatus::Degraded => "degraded".yellow(),
        NetworkStatus::Empty => "empty".dimmed(),
    };

    println!("{}", "Mycel Network Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();
    println!("  Status:            {status}");
    println!("  Nodes:             {}", stats.node_count.to_string().cyan());
    println!("  Links:             {}", stats.link_count.to_string().cyan());
    println!("  Avg health:        {:.3}", stats.avg_health);
    println!("  Avg connections:   {:.2}", stats.avg_connections);
    println!();
    println!("{}", "Transfers".blue().bold());
    println!("  Committed hops:    {}", stats.total_transfers.to_string().cyan());
    println!("  Failed:            {}", stats.failed_transfers.to_string().cyan());
    println!("  Success rate:      {:.1}%", stats.success_rate * 100.0);
    println!();
    println!("{}", "Admission".blue().bold());
    println!("  Hazards:           {}", stats.hazard_count);
    println!("  Corrective actions: {}", stats.corrective_actions);
    println!("  Quarantined nodes: {}", stats.quarantined_nodes);

    if !report.issues.is_empty() {
        println!();
        println!("{}", "Issues".yellow().bold());
        for issue in &report.issues {
            println!("  {} {issue}", "!".yellow());
        }
    }
}
