//! Admission vocabulary: hazards, corrective actions and the policy table.
//!
//! Hazard detection yields a set of [`HazardKind`]s. The policy table maps
//! each kind to an [`Action`]; the highest-precedence hazard present decides
//! the outcome of the evaluation, except that a throttle never overrides a
//! lower-ranked hazard that blocks or waits.

use crate::config::NetworkConfig;
use crate::types::{NodeId, PatternId, Tick, TransferId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A condition detected while evaluating a proposed hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    /// The pattern is flagged as protected content.
    Sacred,
    /// The pattern is spreading faster than the viral-rate threshold.
    ViralOverload,
    /// Sender or receiver health is below the floor.
    UnhealthyEndpoint,
    /// The sender cannot pay for the hop.
    InsufficientResources,
}

/// Hazards in precedence order. First match wins.
pub const PRECEDENCE: [HazardKind; 4] = [
    HazardKind::Sacred,
    HazardKind::ViralOverload,
    HazardKind::UnhealthyEndpoint,
    HazardKind::InsufficientResources,
];

impl HazardKind {
    /// Policy table entry for this hazard.
    pub fn corrective_action(&self, config: &NetworkConfig) -> Action {
        match self {
            HazardKind::Sacred => Action::Block {
                reason: "protected content requires authorization".to_string(),
            },
            HazardKind::ViralOverload => Action::Throttle {
                factor: config.throttle_factor,
            },
            HazardKind::UnhealthyEndpoint => Action::Block {
                reason: "unhealthy node".to_string(),
            },
            HazardKind::InsufficientResources => Action::Wait {
                reason: "insufficient resources".to_string(),
            },
        }
    }

    fn rank(&self) -> usize {
        PRECEDENCE
            .iter()
            .position(|kind| kind == self)
            .unwrap_or(PRECEDENCE.len())
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HazardKind::Sacred => "SACRED_KNOWLEDGE",
            HazardKind::ViralOverload => "VIRAL_OVERLOAD",
            HazardKind::UnhealthyEndpoint => "UNHEALTHY_ENDPOINT",
            HazardKind::InsufficientResources => "INSUFFICIENT_RESOURCES",
        };
        f.write_str(label)
    }
}

/// The outcome of admission control for one hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Allow,
    /// Proceed with effective bandwidth scaled by `factor`.
    Throttle { factor: f64 },
    Block { reason: String },
    /// Non-blocking "retry later" signal.
    Wait { reason: String },
}

impl Action {
    /// Whether the hop may be committed.
    pub fn permits_transfer(&self) -> bool {
        matches!(self, Action::Allow | Action::Throttle { .. })
    }

    /// Bandwidth multiplier to apply when committing.
    pub fn bandwidth_factor(&self) -> f64 {
        match self {
            Action::Throttle { factor } => *factor,
            _ => 1.0,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Action::Block { reason } | Action::Wait { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Allow => "ALLOW",
            Action::Throttle { .. } => "THROTTLE",
            Action::Block { .. } => "BLOCK",
            Action::Wait { .. } => "WAIT",
        }
    }
}

/// Every hazard detected for a hop plus the action that was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub hazards: Vec<HazardKind>,
    pub action: Action,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            hazards: Vec::new(),
            action: Action::Allow,
        }
    }

    /// Resolve a hazard set through the policy table.
    ///
    /// The first hazard in precedence order that forbids the hop decides.
    /// A throttle applies only when nothing else forbids it.
    pub fn from_hazards(mut hazards: Vec<HazardKind>, config: &NetworkConfig) -> Self {
        hazards.sort_by_key(HazardKind::rank);
        hazards.dedup();
        let mut actions = hazards.iter().map(|hazard| hazard.corrective_action(config));
        let first = actions.next();
        let action = match first {
            Some(action) if action.permits_transfer() => actions
                .find(|next| !next.permits_transfer())
                .unwrap_or(action),
            Some(action) => action,
            None => Action::Allow,
        };
        Self { hazards, action }
    }

    /// The hazard that determined the action, if any.
    pub fn deciding_hazard(&self) -> Option<HazardKind> {
        let throttled = matches!(self.action, Action::Throttle { .. });
        self.hazards
            .iter()
            .copied()
            .find(|hazard| throttled || *hazard != HazardKind::ViralOverload)
    }
}

/// An entry of the hazard log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardEvent {
    pub tick: Tick,
    pub transfer_id: TransferId,
    pub pattern_id: PatternId,
    pub from: NodeId,
    pub to: NodeId,
    pub hazards: Vec<HazardKind>,
}

/// An entry of the corrective-action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub tick: Tick,
    pub transfer_id: TransferId,
    pub pattern_id: PatternId,
    pub hazard: Option<HazardKind>,
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_precedence_hazard_decides() {
        let config = NetworkConfig::default();
        let decision = Decision::from_hazards(
            vec![HazardKind::InsufficientResources, HazardKind::Sacred],
            &config,
        );
        assert_eq!(decision.hazards[0], HazardKind::Sacred);
        assert!(matches!(decision.action, Action::Block { .. }));
        assert_eq!(decision.hazards.len(), 2);
    }

    #[test]
    fn throttle_alone_permits() {
        let config = NetworkConfig::default();
        let decision = Decision::from_hazards(vec![HazardKind::ViralOverload], &config);
        assert_eq!(decision.action, Action::Throttle { factor: 0.5 });
        assert!(decision.action.permits_transfer());
        assert_eq!(decision.action.bandwidth_factor(), 0.5);
        assert_eq!(decision.deciding_hazard(), Some(HazardKind::ViralOverload));
    }

    #[test]
    fn throttle_yields_to_wait_and_block() {
        let config = NetworkConfig::default();
        let waiting = Decision::from_hazards(
            vec![HazardKind::InsufficientResources, HazardKind::ViralOverload],
            &config,
        );
        assert_eq!(
            waiting.hazards,
            vec![HazardKind::ViralOverload, HazardKind::InsufficientResources]
        );
        assert!(matches!(waiting.action, Action::Wait { .. }));
        assert_eq!(waiting.deciding_hazard(), Some(HazardKind::InsufficientResources));

        let blocked = Decision::from_hazards(
            vec![
                HazardKind::ViralOverload,
                HazardKind::UnhealthyEndpoint,
                HazardKind::InsufficientResources,
            ],
            &config,
        );
        assert_eq!(blocked.action.reason(), Some("unhealthy node"));
        assert!(!blocked.action.permits_transfer());
        assert_eq!(blocked.deciding_hazard(), Some(HazardKind::UnhealthyEndpoint));
    }

    #[test]
    fn no_hazards_allows() {
        let decision = Decision::from_hazards(Vec::new(), &NetworkConfig::default());
        assert_eq!(decision, Decision::allow());
        assert_eq!(decision.deciding_hazard(), None);
    }

    #[test]
    fn wait_does_not_permit() {
        let action = HazardKind::InsufficientResources.corrective_action(&NetworkConfig::default());
        assert!(!action.permits_transfer());
        assert_eq!(action.reason(), Some("insufficient resources"));
    }
}
