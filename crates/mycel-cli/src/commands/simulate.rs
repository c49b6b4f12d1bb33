//! Run the reference scenario.

use anyhow::{bail, Result};
use colored::Colorize;
use mycel::prelude::*;

use super::{build_network, populate};
use crate::commands::stats::print_stats;
use crate::config::Config;

pub fn run(nodes: Option<u64>, seed: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let nodes = nodes.unwrap_or(config.simulation.nodes);
    if nodes < 3 {
        bail!("simulate needs at least 3 nodes, got {nodes}");
    }
    let seed = seed.or(config.simulation.seed);

    let network = build_network(&config, seed)?;
    populate(&network, nodes)?;

    println!("{}", "Mycel Simulation".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();
    println!("{}", network.render());

    let plain = PatternMetadata::default();
    let (a, b) = (NodeId(0), NodeId(1));

    section("Direct transfer");
    print_result(&network.transfer(PatternId(1), a, b, &plain)?);

    section("Protected content");
    print_result(&network.transfer(PatternId(2), a, NodeId(2), &PatternMetadata::sacred())?);

    section("Routed transfer");
    match (1..nodes).rev().map(NodeId).find(|&id| network.find_link(a, id).is_none()) {
        Some(target) => print_result(&network.transfer(PatternId(3), a, target, &plain)?),
        None => println!("  every node is linked to {a}"),
    }

    section("Node failure");
    let victim = NodeId(nodes - 1);
    network.set_health(victim, 0.0)?;
    let report = network.heal();
    println!("  Removed:    {:?}", report.removed_nodes);
    println!("  Repaired:   {:?}", report.repaired_nodes);
    println!("  Reinforced: {}", report.reinforced_links);
    println!("  Pruned:     {}", report.pruned_links);
    println!(
        "  {} still registered: {}",
        victim,
        network.contains(victim).to_string().cyan()
    );

    section("Exhausted sender");
    network.set_budget(a, 0.0)?;
    print_result(&network.transfer(PatternId(4), a, b, &plain)?);
    network.set_budget(a, config.network.initial_resource_budget)?;

    println!();
    print_stats(&network.health_check());
    println!();
    println!("{}", network.render());

    Ok(())
}

fn section(title: &str) {
    println!();
    println!("{}", title.blue().bold());
}

fn print_result(result: &TransferResult) {
    let status = match result.status {
        TransferStatus::Success => "success".green(),
        TransferStatus::Waiting => "waiting".yellow(),
        TransferStatus::Blocked => "blocked".red(),
        TransferStatus::Failed => "failed".red(),
    };
    println!("  Status: {status}");
    if let Some(path) = &result.path {
        let hops: Vec<String> = path.iter().map(ToString::to_string).collect();
        println!("  Path:   {}", hops.join(" -> ").cyan());
    }
    if let Some(cost) = result.cost {
        println!("  Cost:   {cost:.3}");
    }
    if result.throttled {
        println!("  {}", "throttled".yellow());
    }
    if let Some(reason) = &result.reason {
        println!("  Reason: {reason}");
    }
}
