//! Cost-scaling push-relabel engines for maximum flow, minimum-cost flow, and
//! minimum-cost bipartite matching, built on one shared forward/reverse star
//! graph representation.
//!
//! ```text
//! graph::StarGraph  ──►  maxflow::MaxFlowEngine
//!                   ──►  mincost::MinCostFlowEngine  (uses MaxFlowEngine as a feasibility oracle)
//!                   ──►  assignment::AssignmentEngine
//! ```
//!
//! Engines never mutate the topology of the graph they are attached to; each
//! owns its own residual/potential/excess arrays, sized from the graph's
//! reserved capacity and reset (not reallocated) between solves.

pub mod assignment;
pub mod collections;
pub mod config;
pub mod error;
pub mod graph;
pub mod maxflow;
pub mod mincost;
mod active_nodes;
mod status;

pub use config::{AssignmentConfig, MaxFlowConfig, MinCostFlowConfig};
pub use error::GraphError;
pub use graph::{ArcIndex, NodeIndex, StarGraph, NIL_ARC, NIL_NODE};
pub use status::{Status, TickSignal};

/// The integer type used for flow quantities, supplies, and (scaled) costs.
/// Fixed at `i64` rather than a type parameter threaded through the three
/// engines; see `DESIGN.md` for the reasoning.
pub type Quantity = i64;
