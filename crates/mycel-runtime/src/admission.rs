//! Admission Controller: hazard detection for a proposed hop.
//!
//! Detection is a pure function of an [`AdmissionContext`] snapshot taken
//! while both endpoint locks are held. The caller commits (or not) under
//! the same locks, so no other transfer can slip between the check and
//! the mutation.

use mycel_core::admission::{Decision, HazardKind};
use mycel_core::config::NetworkConfig;
use mycel_core::types::{Node, PatternMetadata};

/// Everything admission needs to know about one hop.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionContext {
    pub sacred: bool,
    pub sender_health: f64,
    pub receiver_health: f64,
    pub sender_budget: f64,
    /// Committed hops of this pattern inside the viral window.
    pub recent_transfers: usize,
    pub node_count: usize,
}

impl AdmissionContext {
    pub fn capture(
        sender: &Node,
        receiver: &Node,
        metadata: &PatternMetadata,
        recent_transfers: usize,
        node_count: usize,
    ) -> Self {
        Self {
            sacred: metadata.sacred,
            sender_health: sender.health,
            receiver_health: receiver.health,
            sender_budget: sender.resource_budget,
            recent_transfers,
            node_count,
        }
    }

    /// Transfers per node inside the window.
    pub fn viral_rate(&self) -> f64 {
        self.recent_transfers as f64 / self.node_count.max(1) as f64
    }
}

/// Evaluates hops against the configured control points.
pub struct AdmissionController<'a> {
    config: &'a NetworkConfig,
}

impl<'a> AdmissionController<'a> {
    pub fn new(config: &'a NetworkConfig) -> Self {
        Self { config }
    }

    /// All hazards present, in precedence order.
    pub fn detect(&self, ctx: &AdmissionContext) -> Vec<HazardKind> {
        let mut hazards = Vec::new();

        if self.config.sacred_protection && ctx.sacred {
            hazards.push(HazardKind::Sacred);
        }

        if ctx.recent_transfers > self.config.viral_min_transfers
            && ctx.viral_rate() > self.config.max_viral_rate
        {
            hazards.push(HazardKind::ViralOverload);
        }

        if self.is_unhealthy(ctx.sender_health) || self.is_unhealthy(ctx.receiver_health) {
            hazards.push(HazardKind::UnhealthyEndpoint);
        }

        if ctx.sender_budget < self.config.min_resource_budget {
            hazards.push(HazardKind::InsufficientResources);
        }

        hazards
    }

    pub fn evaluate(&self, ctx: &AdmissionContext) -> Decision {
        Decision::from_hazards(self.detect(ctx), self.config)
    }

    /// Dead nodes are unhealthy whatever the configured floor.
    pub fn is_unhealthy(&self, health: f64) -> bool {
        health <= 0.0 || health < self.config.min_node_health
    }
}
