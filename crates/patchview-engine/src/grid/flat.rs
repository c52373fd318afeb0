use crate::error::PatchError;

use super::{Placement, Topology};

/// Renderer-friendly view of a 2D grid.
///
/// Invariants (checked by [`FlatGrid::new`]):
/// - `subentities.len()` is a non-zero multiple of `topology.corners()`
/// - every subentity index addresses `coordinates`
/// - `entity_map.len() == coordinates.len()` and every entry is `< vertex_count`
///
/// Render vertices may outnumber grid vertices (e.g. when a periodic grid is
/// cut open); `entity_map[i]` is the grid vertex render vertex `i` stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatGrid {
    topology: Topology,
    subentities: Vec<u32>,
    coordinates: Vec<[f64; 2]>,
    entity_map: Vec<u32>,
    vertex_count: usize,
}

impl FlatGrid {
    pub fn new(
        topology: Topology,
        subentities: Vec<u32>,
        coordinates: Vec<[f64; 2]>,
        entity_map: Vec<u32>,
        vertex_count: usize,
    ) -> Result<Self, PatchError> {
        let corners = topology.corners();
        if subentities.is_empty() || subentities.len() % corners != 0 {
            return Err(PatchError::config(format!(
                "subentity array of length {} does not describe whole {topology:?} cells",
                subentities.len()
            )));
        }
        if let Some(&bad) = subentities.iter().find(|&&i| i as usize >= coordinates.len()) {
            return Err(PatchError::config(format!(
                "subentity index {bad} out of range for {} coordinates",
                coordinates.len()
            )));
        }
        if entity_map.len() != coordinates.len() {
            return Err(PatchError::config(format!(
                "entity map has {} entries for {} coordinates",
                entity_map.len(),
                coordinates.len()
            )));
        }
        if let Some(&bad) = entity_map.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(PatchError::config(format!(
                "entity map refers to vertex {bad}, grid has {vertex_count}"
            )));
        }

        Ok(Self {
            topology,
            subentities,
            coordinates,
            entity_map,
            vertex_count,
        })
    }

    /// Builds a grid whose render vertices are exactly the grid vertices.
    pub fn with_identity_map(
        topology: Topology,
        subentities: Vec<u32>,
        coordinates: Vec<[f64; 2]>,
    ) -> Result<Self, PatchError> {
        let n = coordinates.len();
        let entity_map = (0..n as u32).collect();
        Self::new(topology, subentities, coordinates, entity_map, n)
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Flat corner indices, `topology.corners()` per cell.
    #[inline]
    pub fn subentities(&self) -> &[u32] {
        &self.subentities
    }

    #[inline]
    pub fn coordinates(&self) -> &[[f64; 2]] {
        &self.coordinates
    }

    #[inline]
    pub fn entity_map(&self) -> &[u32] {
        &self.entity_map
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.subentities.len() / self.topology.corners()
    }

    /// Number of grid entities a field with the given placement carries values for.
    #[inline]
    pub fn size(&self, placement: Placement) -> usize {
        match placement {
            Placement::Cell => self.cell_count(),
            Placement::Vertex => self.vertex_count,
        }
    }
}

/// Produces a [`FlatGrid`] from some grid representation.
pub trait MeshFlattener {
    fn flatten(&self) -> Result<FlatGrid, PatchError>;
}

impl MeshFlattener for FlatGrid {
    fn flatten(&self) -> Result<FlatGrid, PatchError> {
        Ok(self.clone())
    }
}
