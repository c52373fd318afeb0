use crate::coords::NdcTransform;
use crate::error::PatchError;
use crate::grid::{FlatGrid, Placement, Topology};

use super::PatchVertex;

/// Corner triples used to split a quad into two triangles along its 0–2 diagonal.
const QUAD_HALVES: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

/// Vertex capacity and index connectivity for one topology/placement pair.
///
/// Vertex placement shares mesh vertices between cells, so values blend across
/// cell boundaries. Cell placement gives every render triangle private vertices
/// so each cell can carry a flat color.
///
/// Record order for cell placement on quads: the first `3 * cells` records are
/// the `(0, 1, 2)` halves of all cells, the remaining `3 * cells` the `(0, 2, 3)`
/// halves. Vertex placement on quads orders its index triples the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferLayout {
    topology: Topology,
    placement: Placement,
    subentities: Vec<u32>,
    vertex_count: usize,
    vertex_capacity: usize,
    indices: Vec<u32>,
}

impl BufferLayout {
    /// Builds the layout for `subentities` (`topology.corners()` indices per cell)
    /// over `vertex_count` render vertices.
    pub fn build(
        topology: Topology,
        placement: Placement,
        subentities: &[u32],
        vertex_count: usize,
    ) -> Result<Self, PatchError> {
        let corners = topology.corners();
        if subentities.is_empty() || subentities.len() % corners != 0 {
            return Err(PatchError::config(format!(
                "{} subentity indices do not form whole {topology:?} cells",
                subentities.len()
            )));
        }
        if let Some(&bad) = subentities.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(PatchError::config(format!(
                "subentity index {bad} exceeds vertex count {vertex_count}"
            )));
        }

        let cells = subentities.len() / corners;
        let vertex_capacity = match placement {
            Placement::Vertex => vertex_count,
            Placement::Cell => 3 * topology.triangles_per_cell() * cells,
        };
        if u32::try_from(vertex_capacity).is_err() {
            return Err(PatchError::config(format!(
                "{vertex_capacity} render vertices exceed 32-bit indexing"
            )));
        }

        let indices = match (topology, placement) {
            (Topology::Triangle, Placement::Vertex) => subentities.to_vec(),
            (Topology::Quad, Placement::Vertex) => QUAD_HALVES
                .iter()
                .flat_map(move |half| {
                    subentities
                        .chunks_exact(4)
                        .flat_map(move |cell| half.iter().map(move |&k| cell[k]))
                })
                .collect(),
            (_, Placement::Cell) => (0..vertex_capacity as u32).collect(),
        };

        log::debug!(
            "buffer layout {topology:?}/{placement:?}: {cells} cells, {vertex_capacity} vertices, {} indices",
            indices.len()
        );

        Ok(Self {
            topology,
            placement,
            subentities: subentities.to_vec(),
            vertex_count,
            vertex_capacity,
            indices,
        })
    }

    pub fn for_grid(grid: &FlatGrid, placement: Placement) -> Result<Self, PatchError> {
        Self::build(
            grid.topology(),
            placement,
            grid.subentities(),
            grid.coordinates().len(),
        )
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.subentities.len() / self.topology.corners()
    }

    /// Number of coordinates `write_positions` expects.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Projects `coords` through `transform` into the position channel of `out`.
    ///
    /// `coords` holds one point per render vertex; `out` must hold exactly
    /// `vertex_capacity` records. Values are left untouched.
    pub fn write_positions(
        &self,
        coords: &[[f64; 2]],
        transform: &NdcTransform,
        out: &mut [PatchVertex],
    ) -> Result<(), PatchError> {
        if coords.len() != self.vertex_count {
            return Err(PatchError::shape("coordinate array", self.vertex_count, coords.len()));
        }
        if out.len() != self.vertex_capacity {
            return Err(PatchError::shape("vertex buffer", self.vertex_capacity, out.len()));
        }

        match (self.placement, self.topology) {
            (Placement::Vertex, _) => {
                for (v, &p) in out.iter_mut().zip(coords) {
                    v.position = transform.apply(p);
                }
            }
            (Placement::Cell, Topology::Triangle) => {
                for (v, &i) in out.iter_mut().zip(&self.subentities) {
                    v.position = transform.apply(coords[i as usize]);
                }
            }
            (Placement::Cell, Topology::Quad) => {
                let half_len = 3 * self.cell_count();
                for (half, records) in QUAD_HALVES.iter().zip(out.chunks_exact_mut(half_len)) {
                    let corners = self
                        .subentities
                        .chunks_exact(4)
                        .flat_map(move |cell| half.iter().map(move |&k| cell[k]));
                    for (v, i) in records.iter_mut().zip(corners) {
                        v.position = transform.apply(coords[i as usize]);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::BoundingBox;

    fn unit() -> NdcTransform {
        NdcTransform::from_bbox(BoundingBox::unit()).unwrap()
    }

    /// Ten disjoint triangles over 30 vertices.
    fn ten_triangles() -> Vec<u32> {
        (0..30).collect()
    }

    #[test]
    fn triangle_vertex_uses_subentities_directly() {
        let sub = vec![0, 1, 2, 2, 1, 3];
        let l = BufferLayout::build(Topology::Triangle, Placement::Vertex, &sub, 4).unwrap();
        assert_eq!(l.vertex_capacity(), 4);
        assert_eq!(l.indices(), &sub[..]);
    }

    #[test]
    fn triangle_cell_gets_private_vertices() {
        let l = BufferLayout::build(Topology::Triangle, Placement::Cell, &ten_triangles(), 30)
            .unwrap();
        assert_eq!(l.vertex_capacity(), 30);
        assert_eq!(l.indices().len(), 30);
        assert!(l.indices().iter().enumerate().all(|(i, &x)| i as u32 == x));
    }

    #[test]
    fn single_quad_vertex_splits_into_two_triangles() {
        let l = BufferLayout::build(Topology::Quad, Placement::Vertex, &[0, 1, 2, 3], 4).unwrap();
        assert_eq!(l.vertex_capacity(), 4);
        assert_eq!(l.indices(), &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn quad_vertex_groups_halves() {
        let sub = [0, 1, 4, 3, 1, 2, 5, 4];
        let l = BufferLayout::build(Topology::Quad, Placement::Vertex, &sub, 6).unwrap();
        assert_eq!(l.indices(), &[0, 1, 4, 1, 2, 5, 0, 4, 3, 1, 5, 4]);
    }

    #[test]
    fn quad_cell_gets_six_private_vertices() {
        let sub: Vec<u32> = (0..3).flat_map(|_| [0, 1, 2, 3]).collect();
        let l = BufferLayout::build(Topology::Quad, Placement::Cell, &sub, 4).unwrap();
        assert_eq!(l.vertex_capacity(), 18);
        assert_eq!(l.index_count(), 18);
        assert_eq!(l.indices()[17], 17);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = BufferLayout::build(Topology::Triangle, Placement::Vertex, &[0, 1, 5], 3);
        assert!(matches!(err, Err(PatchError::Configuration(_))));
    }

    #[test]
    fn vertex_positions_are_projected_in_place() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let l = BufferLayout::build(Topology::Triangle, Placement::Vertex, &[0, 1, 2], 3).unwrap();
        let mut out = vec![PatchVertex::default(); 3];
        l.write_positions(&coords, &unit(), &mut out).unwrap();
        assert_eq!(out[0].position, [-1.0, -1.0]);
        assert_eq!(out[1].position, [1.0, -1.0]);
        assert_eq!(out[2].position, [1.0, 1.0]);
    }

    #[test]
    fn quad_cell_positions_follow_half_split() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let l = BufferLayout::build(Topology::Quad, Placement::Cell, &[0, 1, 2, 3], 4).unwrap();
        let mut out = vec![PatchVertex::default(); 6];
        l.write_positions(&coords, &unit(), &mut out).unwrap();
        let pos: Vec<[f32; 2]> = out.iter().map(|v| v.position).collect();
        assert_eq!(
            pos,
            vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]]
        );
    }

    #[test]
    fn coordinate_count_mismatch_is_a_shape_error() {
        let l = BufferLayout::build(Topology::Triangle, Placement::Vertex, &[0, 1, 2], 3).unwrap();
        let mut out = vec![PatchVertex::default(); 3];
        let err = l.write_positions(&[[0.0, 0.0]], &unit(), &mut out).unwrap_err();
        assert!(matches!(err, PatchError::DataShape { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn triangle_cell_positions_follow_subentity_order() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let sub = [0, 1, 2, 2, 3, 0];
        let l = BufferLayout::build(Topology::Triangle, Placement::Cell, &sub, 4).unwrap();
        let mut out = vec![PatchVertex::default(); 6];
        l.write_positions(&coords, &unit(), &mut out).unwrap();
        let pos: Vec<[f32; 2]> = out.iter().map(|v| v.position).collect();
        assert_eq!(
            pos,
            vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [1.0, 1.0], [-1.0, 1.0], [-1.0, -1.0]]
        );
    }
}
