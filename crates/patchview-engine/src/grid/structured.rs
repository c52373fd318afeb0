use crate::coords::BoundingBox;
use crate::error::PatchError;

use super::{FlatGrid, MeshFlattener, Placement, Topology};

/// Uniform grid over a rectangular domain.
///
/// Vertices are numbered row by row from the lower-left corner. Quad cells list
/// their corners counter-clockwise; triangle grids split every rectangle along
/// its lower-left/upper-right diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGrid {
    topology: Topology,
    domain: BoundingBox,
    intervals: [usize; 2],
}

impl StructuredGrid {
    pub fn new(
        topology: Topology,
        domain: BoundingBox,
        intervals: [usize; 2],
    ) -> Result<Self, PatchError> {
        let domain = domain.validate()?;
        if intervals[0] == 0 || intervals[1] == 0 {
            return Err(PatchError::config(format!(
                "structured grid needs at least one interval per axis, got {intervals:?}"
            )));
        }
        Ok(Self { topology, domain, intervals })
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn domain(&self) -> BoundingBox {
        self.domain
    }

    pub fn vertex_count(&self) -> usize {
        (self.intervals[0] + 1) * (self.intervals[1] + 1)
    }

    pub fn cell_count(&self) -> usize {
        self.intervals[0] * self.intervals[1] * self.cells_per_rectangle()
    }

    #[inline]
    fn cells_per_rectangle(&self) -> usize {
        match self.topology {
            Topology::Quad => 1,
            Topology::Triangle => 2,
        }
    }

    pub fn vertex_coordinates(&self) -> Vec<[f64; 2]> {
        let [nx, ny] = self.intervals;
        let [w, h] = self.domain.size();
        let (dx, dy) = (w / nx as f64, h / ny as f64);

        let mut out = Vec::with_capacity(self.vertex_count());
        for j in 0..=ny {
            for i in 0..=nx {
                out.push([
                    self.domain.min[0] + i as f64 * dx,
                    self.domain.min[1] + j as f64 * dy,
                ]);
            }
        }
        out
    }

    /// Corner indices of every cell, flattened.
    pub fn cell_corners(&self) -> Vec<u32> {
        let [nx, ny] = self.intervals;
        let row = (nx + 1) as u32;
        let mut out = Vec::with_capacity(self.cell_count() * self.topology.corners());

        for j in 0..ny as u32 {
            for i in 0..nx as u32 {
                let v00 = j * row + i;
                let v10 = v00 + 1;
                let v01 = v00 + row;
                let v11 = v01 + 1;
                match self.topology {
                    Topology::Quad => out.extend_from_slice(&[v00, v10, v11, v01]),
                    Topology::Triangle => {
                        out.extend_from_slice(&[v00, v10, v11]);
                        out.extend_from_slice(&[v00, v11, v01]);
                    }
                }
            }
        }
        out
    }

    /// Points at which a field with the given placement is sampled:
    /// vertex coordinates, or cell centroids.
    pub fn sample_points(&self, placement: Placement) -> Vec<[f64; 2]> {
        let coords = self.vertex_coordinates();
        match placement {
            Placement::Vertex => coords,
            Placement::Cell => {
                let corners = self.topology.corners();
                self.cell_corners()
                    .chunks_exact(corners)
                    .map(|cell| {
                        let (sx, sy) = cell.iter().fold((0.0, 0.0), |(sx, sy), &v| {
                            let p = coords[v as usize];
                            (sx + p[0], sy + p[1])
                        });
                        [sx / corners as f64, sy / corners as f64]
                    })
                    .collect()
            }
        }
    }

    /// Evaluates `f` at every sample point of `placement`.
    pub fn sample<F>(&self, placement: Placement, f: F) -> Vec<f64>
    where
        F: Fn([f64; 2]) -> f64,
    {
        self.sample_points(placement).into_iter().map(f).collect()
    }
}

impl MeshFlattener for StructuredGrid {
    fn flatten(&self) -> Result<FlatGrid, PatchError> {
        FlatGrid::with_identity_map(self.topology, self.cell_corners(), self.vertex_coordinates())
    }
}
