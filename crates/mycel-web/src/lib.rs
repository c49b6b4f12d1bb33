//! # Mycel Web
//!
//! HTTP access to one resident Mycel network.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run -p mycel-web -- --port 3000 --nodes 10
//! curl localhost:3000/api/stats
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/stats` | Network statistics |
//! | GET | `/api/health` | Health check with issues |
//! | GET | `/api/nodes` | All nodes |
//! | POST | `/api/nodes` | Add a node |
//! | GET | `/api/links` | All directed links |
//! | POST | `/api/connect` | Link two nodes |
//! | POST | `/api/transfer` | Transfer a pattern |
//! | POST | `/api/heal` | Run a heal cycle |
//! | GET | `/api/hazards` | Recent hazard events (`?limit=50`) |
//! | GET | `/api/actions` | Recent corrective actions (`?limit=50`) |
//! | GET | `/api/ccps` | Critical control points |
//! | POST | `/api/advance` | Advance the logical clock |

pub mod routes;
pub mod state;

pub use state::AppState;
