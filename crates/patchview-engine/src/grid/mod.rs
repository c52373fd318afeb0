//! Grid inputs for patch plots.
//!
//! The engine does not own a grid abstraction. It consumes the output of a
//! [`MeshFlattener`]: a [`FlatGrid`] with per-cell corner indices, one coordinate
//! per render vertex and a map from render vertices back to grid vertices.
//! [`StructuredGrid`] is a ready-made flattener for rectangular domains.

mod flat;
mod structured;
mod topology;

pub use flat::{FlatGrid, MeshFlattener};
pub use structured::StructuredGrid;
pub use topology::{Placement, Topology};
