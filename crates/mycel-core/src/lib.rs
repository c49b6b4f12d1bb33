//! # Mycel Core
//!
//! Core types and traits shared by every Mycel crate.
//!
//! A Mycel network is a graph of nodes joined by weighted links. Discrete
//! units of information (patterns) travel across those links, either
//! directly or hop by hop, and every hop passes through admission control
//! before it is committed.
//!
//! This crate holds the vocabulary of that system and nothing stateful:
//!
//! - **types** - identifiers, nodes, links, transfer records
//! - **admission** - hazards, actions and the ordered policy table
//! - **report** - transfer results, heal reports, statistics
//! - **config** - the critical control points and topology tuning
//! - **selection** - pluggable peer selection and link sampling
//! - **error** - contract violations
//!
//! ## Quick Start
//!
//! ```rust
//! use mycel_core::prelude::*;
//!
//! let config = NetworkConfig::default();
//! assert!(config.validate().is_ok());
//!
//! // Deterministic peer selection for tests
//! let mut selector = FirstK;
//! let picked = selector.select(NodeId(9), &[NodeId(1), NodeId(2), NodeId(3)], 2);
//! assert_eq!(picked, vec![NodeId(1), NodeId(2)]);
//! ```

pub mod types;
pub mod admission;
pub mod report;
pub mod config;
pub mod selection;
pub mod error;
pub mod prelude;
