//! 2D affine matrix with canvas-style composition.
//!
//! Stores six components `[sx, shy, shx, sy, tx, ty]`:
//!
//! ```text
//!   | sx  shx tx |
//!   | shy  sy ty |
//!   |  0    0  1 |
//! ```
//!
//! Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
//!
//! The `translate`/`rotate`/`scale` methods post-multiply, the same way a
//! 2D canvas context updates its current transform: the last operation is
//! the first one applied to a point being drawn.

/// Determinants smaller than this are treated as singular.
pub const AFFINE_EPSILON: f64 = 1e-14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn scaling(x: f64, y: f64) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    /// Clockwise rotation (y axis pointing down) by `degrees`.
    ///
    /// Quarter turns produce exact 0/1 entries so that 90/180/270 degree
    /// renders map pixel centers onto pixel centers.
    pub fn rotation_degrees(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let (sin, cos) = if normalized == 0.0 {
            (0.0, 1.0)
        } else if normalized == 90.0 {
            (1.0, 0.0)
        } else if normalized == 180.0 {
            (0.0, -1.0)
        } else if normalized == 270.0 {
            (-1.0, 0.0)
        } else {
            normalized.to_radians().sin_cos()
        };
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// `self * other`: `other` is applied to a point first.
    pub fn multiply(&self, other: &Affine) -> Affine {
        Affine {
            sx: self.sx * other.sx + self.shx * other.shy,
            shy: self.shy * other.sx + self.sy * other.shy,
            shx: self.sx * other.shx + self.shx * other.sy,
            sy: self.shy * other.shx + self.sy * other.sy,
            tx: self.sx * other.tx + self.shx * other.ty + self.tx,
            ty: self.shy * other.tx + self.sy * other.ty + self.ty,
        }
    }

    pub fn translate(self, x: f64, y: f64) -> Self {
        self.multiply(&Self::translation(x, y))
    }

    pub fn scale(self, x: f64, y: f64) -> Self {
        self.multiply(&Self::scaling(x, y))
    }

    pub fn rotate_degrees(self, degrees: f64) -> Self {
        self.multiply(&Self::rotation_degrees(degrees))
    }

    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    /// The inverse matrix, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < AFFINE_EPSILON {
            return None;
        }

        let sx = self.sy / det;
        let sy = self.sx / det;
        let shy = -self.shy / det;
        let shx = -self.shx / det;
        let tx = -self.tx * sx - self.ty * shx;
        let ty = -self.tx * shy - self.ty * sy;

        Some(Affine {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        })
    }

    /// Lengths of the images of the unit x and y vectors.
    pub fn scaling_abs(&self) -> (f64, f64) {
        (self.sx.hypot(self.shy), self.shx.hypot(self.sy))
    }

    /// Transform a point.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.sx + y * self.shx + self.tx,
            x * self.shy + y * self.sy + self.ty,
        )
    }
}
