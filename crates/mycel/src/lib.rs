//! # Mycel
//!
//! Self-healing pattern dissemination over a weighted node graph.
//!
//! Nodes join a resident network and are auto-connected to healthy peers.
//! Patterns travel across links directly or along the fewest-hop route,
//! and every hop passes admission control before it is committed. A heal
//! cycle removes dead nodes, repairs isolated ones, prunes weak links and
//! reinforces busy ones.
//!
//! ## Quick Start
//!
//! ```rust
//! use mycel::prelude::*;
//!
//! let network = Network::new();
//! for id in 0..10 {
//!     network.add_node(NodeId(id), NodeKind::User).unwrap();
//! }
//!
//! // Plain patterns flow.
//! let result = network
//!     .transfer(PatternId(1), NodeId(0), NodeId(1), &PatternMetadata::default())
//!     .unwrap();
//! assert_eq!(result.status, TransferStatus::Success);
//!
//! // Protected content never does.
//! let result = network
//!     .transfer(PatternId(2), NodeId(0), NodeId(2), &PatternMetadata::sacred())
//!     .unwrap();
//! assert_eq!(result.status, TransferStatus::Blocked);
//!
//! let report = network.heal();
//! println!("{report:?}");
//! println!("{}", network.render());
//! ```
//!
//! ## Architecture
//!
//! - [`mycel_core`] - identifiers, data model, policy vocabulary, config and
//!   growth strategy traits
//! - [`mycel_runtime`] - the `Network`: registry, link fabric, router,
//!   admission, transfer engine, topology maintenance and statistics
//!
//! ## Admission Control
//!
//! | Hazard | Action |
//! |--------|--------|
//! | Sacred content | Block ("protected content requires authorization") |
//! | Viral overload | Throttle (factor 0.5, halves effective bandwidth) |
//! | Unhealthy endpoint | Block ("unhealthy node") |
//! | Insufficient resources | Wait ("insufficient resources") |
//!
//! When several hazards fire, the first row that applies decides. A throttle
//! never lets a hop past a lower row that blocks or waits.

pub use mycel_core as core;
pub use mycel_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use mycel::prelude::*;
/// ```
pub mod prelude {
    pub use mycel_runtime::prelude::*;
}
