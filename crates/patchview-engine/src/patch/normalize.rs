use crate::error::PatchError;
use crate::grid::{FlatGrid, Placement, Topology};

use super::PatchVertex;

/// Optional user overrides for the normalization range.
///
/// `vmax >= vmin` is not enforced; an inverted range simply maps values
/// outside `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FieldBounds {
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
}

impl FieldBounds {
    #[inline]
    pub const fn new(vmin: Option<f64>, vmax: Option<f64>) -> Self {
        Self { vmin, vmax }
    }

    /// Fills missing bounds from the data.
    pub fn resolve(self, values: &[f64]) -> Option<(f64, f64)> {
        match (self.vmin, self.vmax) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => {
                let (lo, hi) = min_max(values)?;
                Some((self.vmin.unwrap_or(lo), self.vmax.unwrap_or(hi)))
            }
        }
    }

    /// Like [`resolve`](Self::resolve), falling back to `(0, 1)` when there is
    /// no data to derive a bound from.
    pub fn resolve_or_unit(self, values: &[f64]) -> (f64, f64) {
        self.resolve(values).unwrap_or((
            self.vmin.unwrap_or(0.0),
            self.vmax.unwrap_or(1.0),
        ))
    }
}

/// Minimum and maximum of `values`; a NaN anywhere makes both NaN.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let (&first, rest) = values.split_first()?;
    Some(rest.iter().fold((first, first), |(lo, hi), &v| {
        if v.is_nan() || lo.is_nan() {
            (f64::NAN, f64::NAN)
        } else {
            (lo.min(v), hi.max(v))
        }
    }))
}

/// Writes normalized scalars into the value channel of a surface's records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    placement: Placement,
    bounds: FieldBounds,
    entity_map: Vec<u32>,
    cell_count: usize,
    field_len: usize,
    records: usize,
}

impl Normalizer {
    pub fn new(grid: &FlatGrid, placement: Placement, bounds: FieldBounds) -> Self {
        let cell_count = grid.cell_count();
        let records = match placement {
            Placement::Vertex => grid.coordinates().len(),
            Placement::Cell => records_per_cell(grid.topology()) * cell_count,
        };
        Self {
            placement,
            bounds,
            entity_map: grid.entity_map().to_vec(),
            cell_count,
            field_len: grid.size(placement),
            records,
        }
    }

    #[inline]
    pub fn bounds(&self) -> FieldBounds {
        self.bounds
    }

    #[inline]
    pub fn set_bounds(&mut self, bounds: FieldBounds) {
        self.bounds = bounds;
    }

    /// Number of values a field must carry.
    #[inline]
    pub fn field_len(&self) -> usize {
        self.field_len
    }

    /// Normalizes `values` into `out[..].value` and returns the `(vmin, vmax)`
    /// actually used.
    ///
    /// Values are shifted by `-vmin` and divided by `vmax - vmin` only when that
    /// range is positive. Nothing is written when an error is returned.
    pub fn apply(&self, values: &[f64], out: &mut [PatchVertex]) -> Result<(f64, f64), PatchError> {
        if values.is_empty() {
            return Err(PatchError::config("scalar field is empty"));
        }
        if values.len() != self.field_len {
            return Err(PatchError::shape("scalar field", self.field_len, values.len()));
        }
        if out.len() != self.records {
            return Err(PatchError::shape("vertex buffer", self.records, out.len()));
        }

        let Some((vmin, vmax)) = self.bounds.resolve(values) else {
            return Err(PatchError::config("scalar field is empty"));
        };
        let range = vmax - vmin;
        let norm = |v: f64| {
            let shifted = v - vmin;
            (if range > 0.0 { shifted / range } else { shifted }) as f32
        };

        match self.placement {
            Placement::Vertex => {
                for (rec, &e) in out.iter_mut().zip(&self.entity_map) {
                    rec.value = norm(values[e as usize]);
                }
            }
            // Records come in runs of three per render triangle; for quads the
            // second half of the buffer repeats the cell order of the first.
            Placement::Cell => {
                for (r, rec) in out.iter_mut().enumerate() {
                    rec.value = norm(values[(r / 3) % self.cell_count]);
                }
            }
        }

        log::trace!("normalized {} values into [{vmin}, {vmax}]", values.len());
        Ok((vmin, vmax))
    }
}

/// Render records per cell under cell placement.
#[inline]
pub(crate) fn records_per_cell(topology: Topology) -> usize {
    3 * topology.triangles_per_cell()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> FlatGrid {
        FlatGrid::with_identity_map(
            Topology::Triangle,
            vec![0, 1, 2],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        )
        .unwrap()
    }

    fn two_quads() -> FlatGrid {
        let coords = vec![
            [0.0, 0.0], [1.0, 0.0], [2.0, 0.0],
            [0.0, 1.0], [1.0, 1.0], [2.0, 1.0],
        ];
        FlatGrid::with_identity_map(Topology::Quad, vec![0, 1, 4, 3, 1, 2, 5, 4], coords).unwrap()
    }

    fn values(out: &[PatchVertex]) -> Vec<f32> {
        out.iter().map(|v| v.value).collect()
    }

    #[test]
    fn vertex_field_is_mapped_to_unit_range() {
        let n = Normalizer::new(&triangle(), Placement::Vertex, FieldBounds::default());
        let mut out = vec![PatchVertex::default(); 3];
        let used = n.apply(&[0.0, 5.0, 10.0], &mut out).unwrap();
        assert_eq!(used, (0.0, 10.0));
        assert_eq!(values(&out), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn applying_twice_gives_identical_records() {
        let n = Normalizer::new(&triangle(), Placement::Vertex, FieldBounds::default());
        let mut a = vec![PatchVertex::default(); 3];
        let mut b = vec![PatchVertex::default(); 3];
        n.apply(&[3.0, -1.0, 7.5], &mut a).unwrap();
        n.apply(&[3.0, -1.0, 7.5], &mut a).unwrap();
        n.apply(&[3.0, -1.0, 7.5], &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_range_only_shifts() {
        let bounds = FieldBounds::new(Some(2.0), Some(2.0));
        let n = Normalizer::new(&triangle(), Placement::Vertex, bounds);
        let mut out = vec![PatchVertex::default(); 3];
        n.apply(&[2.0, 3.0, 4.5], &mut out).unwrap();
        assert_eq!(values(&out), vec![0.0, 1.0, 2.5]);
    }

    #[test]
    fn overrides_take_precedence() {
        let bounds = FieldBounds::new(Some(-10.0), None);
        let n = Normalizer::new(&triangle(), Placement::Vertex, bounds);
        let mut out = vec![PatchVertex::default(); 3];
        assert_eq!(n.apply(&[0.0, 5.0, 10.0], &mut out).unwrap(), (-10.0, 10.0));
        assert_eq!(values(&out), vec![0.5, 0.75, 1.0]);
    }

    #[test]
    fn periodic_entity_map_reads_grid_vertices() {
        let coords = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let grid = FlatGrid::new(Topology::Quad, vec![0, 1, 2, 3], coords, vec![0, 1, 2, 0], 3)
            .unwrap();
        let n = Normalizer::new(&grid, Placement::Vertex, FieldBounds::default());
        let mut out = vec![PatchVertex::default(); 4];
        n.apply(&[0.0, 1.0, 2.0], &mut out).unwrap();
        assert_eq!(values(&out), vec![0.0, 0.5, 1.0, 0.0]);
    }

    #[test]
    fn quad_cell_values_fill_both_halves() {
        let grid = two_quads();
        let n = Normalizer::new(&grid, Placement::Cell, FieldBounds::default());
        let mut out = vec![PatchVertex::default(); 12];
        n.apply(&[1.0, 3.0], &mut out).unwrap();
        assert_eq!(
            values(&out),
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]
        );
        assert_eq!(records_per_cell(Topology::Quad) * 2, out.len());
    }

    #[test]
    fn triangle_cell_value_is_broadcast() {
        let n = Normalizer::new(&triangle(), Placement::Cell, FieldBounds::new(Some(0.0), Some(4.0)));
        let mut out = vec![PatchVertex::default(); 3];
        n.apply(&[1.0], &mut out).unwrap();
        assert_eq!(values(&out), vec![0.25; 3]);
    }

    #[test]
    fn empty_field_is_a_configuration_error() {
        let n = Normalizer::new(&triangle(), Placement::Vertex, FieldBounds::default());
        let mut out = vec![PatchVertex::default(); 3];
        assert!(matches!(n.apply(&[], &mut out), Err(PatchError::Configuration(_))));
    }

    #[test]
    fn wrong_length_leaves_records_alone() {
        let n = Normalizer::new(&triangle(), Placement::Vertex, FieldBounds::default());
        let mut out = vec![PatchVertex::new([0.0, 0.0], 0.7); 3];
        let err = n.apply(&[1.0, 2.0], &mut out).unwrap_err();
        assert_eq!(err, PatchError::shape("scalar field", 3, 2));
        assert!(out.iter().all(|v| v.value == 0.7));
    }

    #[test]
    fn nan_propagates_through_min_max() {
        let (lo, hi) = min_max(&[1.0, f64::NAN, 3.0]).unwrap();
        assert!(lo.is_nan() && hi.is_nan());
        assert_eq!(min_max(&[2.0, -1.0]), Some((-1.0, 2.0)));
        assert_eq!(min_max(&[]), None);
    }

    #[test]
    fn unit_fallback_without_data() {
        assert_eq!(FieldBounds::default().resolve_or_unit(&[]), (0.0, 1.0));
        assert_eq!(FieldBounds::new(None, Some(4.0)).resolve_or_unit(&[]), (0.0, 4.0));
    }
}
