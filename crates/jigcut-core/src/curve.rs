//! Curve sampling: flatten arcs and cubic Béziers into polylines.
//!
//! Piece outlines are rasterized as dense polygons, so every curved
//! segment is flattened here at a fixed, caller-chosen resolution before
//! it reaches the rasterizer.

use crate::types::Point;

/// A parametric curve segment that can be flattened into points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveSpec {
    /// Cubic Bézier through `p0` and `p3` with control points `p1`, `p2`.
    CubicBezier {
        /// Start point.
        p0: Point,
        /// First control point.
        p1: Point,
        /// Second control point.
        p2: Point,
        /// End point.
        p3: Point,
    },
    /// Circular arc swept from `start_deg` to `end_deg`.
    ///
    /// Angles are in degrees and measured in image coordinates (y down).
    /// `end_deg` may be smaller than `start_deg` to sweep the other way.
    Arc {
        /// Center of the circle.
        center: Point,
        /// Radius of the circle.
        radius: f64,
        /// Angle of the first sample, in degrees.
        start_deg: f64,
        /// Angle of the last sample, in degrees.
        end_deg: f64,
    },
}

impl CurveSpec {
    /// Evaluate the curve at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        match *self {
            Self::CubicBezier { p0, p1, p2, p3 } => {
                let mt = 1.0 - t;
                // Bernstein weights.
                let w0 = mt * mt * mt;
                let w1 = 3.0 * mt * mt * t;
                let w2 = 3.0 * mt * t * t;
                let w3 = t * t * t;
                Point::new(
                    w3.mul_add(p3.x, w2.mul_add(p2.x, w0.mul_add(p0.x, w1 * p1.x))),
                    w3.mul_add(p3.y, w2.mul_add(p2.y, w0.mul_add(p0.y, w1 * p1.y))),
                )
            }
            Self::Arc {
                center,
                radius,
                start_deg,
                end_deg,
            } => {
                let theta = (end_deg - start_deg).mul_add(t, start_deg).to_radians();
                Point::new(
                    radius.mul_add(theta.cos(), center.x),
                    radius.mul_add(theta.sin(), center.y),
                )
            }
        }
    }

    /// Sample the curve at `steps + 1` uniformly spaced parameters.
    ///
    /// Both endpoints are included. A Bézier's first and last samples are
    /// exactly `p0` and `p3`. `steps == 0` is treated as `1`.
    #[must_use]
    pub fn sample(&self, steps: u32) -> Vec<Point> {
        let steps = steps.max(1);
        let n = f64::from(steps);
        (0..=steps)
            .map(|i| {
                if let Self::CubicBezier { p0, p3, .. } = *self {
                    if i == 0 {
                        return p0;
                    }
                    if i == steps {
                        return p3;
                    }
                }
                self.point_at(f64::from(i) / n)
            })
            .collect()
    }
}

/// Sample `curve` at `steps + 1` points; see [`CurveSpec::sample`].
#[must_use]
pub fn sample(curve: &CurveSpec, steps: u32) -> Vec<Point> {
    curve.sample(steps)
}
