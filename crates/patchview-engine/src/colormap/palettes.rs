use std::collections::HashMap;

use crate::error::PatchError;

use super::{ColorTable, Rgba};

/// Palette used when a surface is configured without one.
pub const DEFAULT_PALETTE: &str = "YlGnBu_r";

/// Evenly spaced color control points, linearly interpolated.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    stops: Vec<Rgba>,
}

impl Palette {
    /// Creates a palette from control points spaced evenly over `[0, 1]`.
    ///
    /// Returns `None` for an empty stop list.
    pub fn new(stops: Vec<Rgba>) -> Option<Self> {
        if stops.is_empty() { None } else { Some(Self { stops }) }
    }

    pub fn reversed(&self) -> Self {
        let mut stops = self.stops.clone();
        stops.reverse();
        Self { stops }
    }

    /// Samples the palette at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.stops.len();
        if n == 1 {
            return self.stops[0];
        }

        let segments = (n - 1) as f32;
        let idx = ((t * segments).floor() as usize).min(n - 2);
        let frac = t * segments - idx as f32;
        self.stops[idx].lerp(self.stops[idx + 1], frac)
    }

    /// `resolution` samples at `i / (resolution - 1)`.
    pub fn table(&self, resolution: usize) -> Vec<Rgba> {
        match resolution {
            0 => Vec::new(),
            1 => vec![self.sample(0.0)],
            n => (0..n)
                .map(|i| self.sample(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }
}

/// Name-keyed palette registry.
///
/// A name ending in `_r` that is not registered itself resolves to the reverse
/// of the palette without the suffix.
#[derive(Debug, Clone, Default)]
pub struct Palettes {
    palettes: HashMap<String, Palette>,
}

impl Palettes {
    /// Registry with the built-in palettes.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_builtin();
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, palette: Palette) {
        self.palettes.insert(name.into(), palette);
    }

    pub fn get(&self, name: &str) -> Option<Palette> {
        if let Some(p) = self.palettes.get(name) {
            return Some(p.clone());
        }
        name.strip_suffix("_r")
            .and_then(|base| self.palettes.get(base))
            .map(Palette::reversed)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }

    fn register_builtin(&mut self) {
        let builtin: [(&str, &[[f32; 3]]); 4] = [
            (
                "YlGnBu",
                &[
                    [1.000, 1.000, 0.851],
                    [0.929, 0.973, 0.694],
                    [0.780, 0.914, 0.706],
                    [0.498, 0.804, 0.733],
                    [0.255, 0.714, 0.769],
                    [0.114, 0.569, 0.753],
                    [0.133, 0.369, 0.659],
                    [0.145, 0.204, 0.580],
                    [0.031, 0.114, 0.345],
                ],
            ),
            (
                "viridis",
                &[
                    [0.267, 0.004, 0.329],
                    [0.282, 0.140, 0.457],
                    [0.253, 0.265, 0.529],
                    [0.206, 0.371, 0.553],
                    [0.163, 0.471, 0.558],
                    [0.127, 0.566, 0.550],
                    [0.134, 0.658, 0.517],
                    [0.266, 0.749, 0.440],
                    [0.477, 0.821, 0.318],
                    [0.741, 0.873, 0.150],
                    [0.993, 0.906, 0.144],
                ],
            ),
            (
                "coolwarm",
                &[
                    [0.230, 0.299, 0.754],
                    [0.552, 0.690, 0.996],
                    [0.866, 0.866, 0.866],
                    [0.956, 0.604, 0.486],
                    [0.706, 0.016, 0.150],
                ],
            ),
            ("gray", &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]),
        ];

        for (name, points) in builtin {
            let stops = points.iter().map(|&[r, g, b]| Rgba::opaque(r, g, b)).collect();
            if let Some(p) = Palette::new(stops) {
                self.register(name, p);
            }
        }
    }
}

impl ColorTable for Palettes {
    fn table(&self, name: &str, resolution: usize) -> Result<Vec<Rgba>, PatchError> {
        let palette = self
            .get(name)
            .ok_or_else(|| PatchError::config(format!("unknown palette '{name}'")))?;
        if resolution == 0 {
            return Err(PatchError::config("colormap resolution must be positive"));
        }
        Ok(palette.table(resolution))
    }
}
