use crate::error::PatchError;

/// Reference element of a 2D grid.
///
/// Fixed for the lifetime of a surface; a different topology needs a new surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Triangle,
    Quad,
}

impl Topology {
    /// Number of corner vertices per cell.
    #[inline]
    pub const fn corners(self) -> usize {
        match self {
            Topology::Triangle => 3,
            Topology::Quad => 4,
        }
    }

    /// Number of render triangles per cell.
    #[inline]
    pub const fn triangles_per_cell(self) -> usize {
        match self {
            Topology::Triangle => 1,
            Topology::Quad => 2,
        }
    }

    pub fn from_corners(corners: usize) -> Result<Self, PatchError> {
        match corners {
            3 => Ok(Topology::Triangle),
            4 => Ok(Topology::Quad),
            n => Err(PatchError::config(format!(
                "cells with {n} corners are not supported (expected 3 or 4)"
            ))),
        }
    }
}

/// Where the scalar field lives on the grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Placement {
    /// One value per grid vertex (codimension 2).
    Vertex,
    /// One value per grid cell (codimension 0).
    Cell,
}

impl Placement {
    #[inline]
    pub const fn codim(self) -> u8 {
        match self {
            Placement::Vertex => 2,
            Placement::Cell => 0,
        }
    }

    pub fn from_codim(codim: u8) -> Result<Self, PatchError> {
        match codim {
            2 => Ok(Placement::Vertex),
            0 => Ok(Placement::Cell),
            c => Err(PatchError::config(format!("codim must be 0 or 2, got {c}"))),
        }
    }
}
