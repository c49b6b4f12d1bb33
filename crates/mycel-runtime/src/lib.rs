//! # Mycel Runtime
//!
//! The resident network and everything that mutates it.
//!
//! A [`Network`](network::Network) is one long-lived object, constructed
//! explicitly and shared by reference (usually behind an `Arc`). Every
//! operation takes `&self`, so worker threads can submit transfers, heals
//! and connects concurrently:
//!
//! - the node registry and link fabric each sit behind a `RwLock`
//! - every node carries its own `Mutex`, so admission and the mutation it
//!   guards are atomic per node pair
//! - every link carries its own `Mutex` for its history and strength
//!
//! Locks are always taken in the same order: registry, fabric, nodes in
//! ascending id order, links, then the journal.

pub mod sync;
pub mod registry;
pub mod fabric;
pub mod router;
pub mod admission;
pub mod journal;
pub mod topology;
pub mod transfer;
pub mod stats;
pub mod network;
pub mod prelude;
