use crate::error::PatchError;

/// World-space rectangle that is mapped onto the full NDC square.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    #[inline]
    pub const fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// The unit square `([0, 0], [1, 1])`.
    #[inline]
    pub const fn unit() -> Self {
        Self::new([0.0, 0.0], [1.0, 1.0])
    }

    #[inline]
    pub fn size(self) -> [f64; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    /// Returns an error unless both extents are finite and strictly positive.
    pub fn validate(self) -> Result<Self, PatchError> {
        let [w, h] = self.size();
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(PatchError::config(format!(
                "bounding box {:?}..{:?} must have positive finite extent",
                self.min, self.max
            )));
        }
        Ok(self)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::unit()
    }
}

/// Affine map from world space into `[-1, 1] x [-1, 1]`.
///
/// `ndc = (p + shift) * scale` with `scale = 2 / size` and `shift = -min - size / 2`,
/// so `bbox.min` lands on `(-1, -1)` and `bbox.max` on `(1, 1)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NdcTransform {
    pub shift: [f64; 2],
    pub scale: [f64; 2],
}

impl NdcTransform {
    pub fn from_bbox(bbox: BoundingBox) -> Result<Self, PatchError> {
        let bbox = bbox.validate()?;
        let [w, h] = bbox.size();
        Ok(Self {
            shift: [-bbox.min[0] - w / 2.0, -bbox.min[1] - h / 2.0],
            scale: [2.0 / w, 2.0 / h],
        })
    }

    #[inline]
    pub fn apply(&self, p: [f64; 2]) -> [f32; 2] {
        [
            ((p[0] + self.shift[0]) * self.scale[0]) as f32,
            ((p[1] + self.shift[1]) * self.scale[1]) as f32,
        ]
    }
}
