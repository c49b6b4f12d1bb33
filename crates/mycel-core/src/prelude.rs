//! Mycel Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use mycel_core::prelude::*;
//! ```

pub use crate::types::{
    NodeId, PatternId, TransferId, Tick,
    NodeKind, PatternMetadata,
    Node, Link, LinkParams, TransferRecord,
    NodeSnapshot, LinkSnapshot,
};

pub use crate::admission::{Action, Decision, HazardKind, HazardEvent, ActionRecord, PRECEDENCE};

pub use crate::report::{
    TransferStatus, TransferResult,
    HealReport,
    NetworkStats, NetworkStatus, HealthReport,
};

pub use crate::config::NetworkConfig;

pub use crate::selection::{
    PeerSelector, RandomSelector, FirstK, NearestK,
    LinkSampler, RandomLinks, FixedLinks,
};

pub use crate::error::{MyceliumError, ConfigError, Result};
