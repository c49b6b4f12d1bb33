//! Mycel Runtime Prelude: the network plus the core vocabulary.
//!
//! ```rust
//! use mycel_runtime::prelude::*;
//! ```

pub use mycel_core::prelude::*;

pub use crate::network::Network;
pub use crate::admission::{AdmissionContext, AdmissionController};
