//! Edge profiles: the point run along one side of one piece.
//!
//! Every side of a piece is either flat (puzzle border), an outward tab
//! or an inward slot. This module defines the [`EdgeShaper`] trait for
//! pluggable tab shapes and the [`EdgeStyle`] enum for selecting one at
//! runtime.
//!
//! # Edge frame
//!
//! A profile is computed in a local frame: `u` runs along the edge from
//! `start` to `end`, `v` runs along the outward normal `n = (d.y, -d.x)`
//! where `d` is the unit direction of travel. Pieces are traversed
//! clockwise in image coordinates (y down), so `n` always points away
//! from the piece interior. Outward tabs bulge along `+n`, inward slots
//! along `-n`.
//!
//! Both styles are symmetric about the edge midpoint. The two pieces that
//! share an edge traverse it in opposite directions with opposite edge
//! types, so they produce the same curve and interlock exactly.

use serde::{Deserialize, Serialize};

use crate::curve::CurveSpec;
use crate::types::Point;

/// Shape of one side of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Straight side on the outer border of the puzzle.
    Flat,
    /// Tab bulging away from the piece interior.
    Outward,
    /// Slot cut into the piece interior.
    Inward,
}

impl EdgeType {
    /// Sign of the bulge along the outward normal: `1`, `-1`, or `0`
    /// for flat edges.
    #[must_use]
    pub const fn bulge_sign(self) -> f64 {
        match self {
            Self::Flat => 0.0,
            Self::Outward => 1.0,
            Self::Inward => -1.0,
        }
    }

    /// The type the neighboring piece sees on the same shared edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Flat => Self::Flat,
            Self::Outward => Self::Inward,
            Self::Inward => Self::Outward,
        }
    }
}

/// Selects which curve family shapes tabs and slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeStyle {
    /// Half-circle head of radius `tab_size` whose apex sits `tab_size`
    /// off the edge, joined to the corners by straight runs.
    ///
    /// At the default tab fraction the head spans exactly the middle half
    /// of the edge.
    #[default]
    Arc,

    /// Four cubic Béziers following [`REFERENCE_TAB`]: a smooth rise
    /// through junctions at 40 % and 60 % of the span to a peak at the
    /// midpoint.
    Bezier,
}

/// Normalized reference tab for [`EdgeStyle::Bezier`].
///
/// Each entry is one cubic segment `[p0, p1, p2, p3]` as
/// `(fraction of span, multiple of tab size)`. The curve is symmetric
/// about `u = 0.5`; reflecting it and reversing the segment order
/// reproduces it exactly.
pub const REFERENCE_TAB: [[(f64, f64); 4]; 4] = [
    [(0.0, 0.0), (0.33, 0.0), (0.38, 0.0), (0.4, 0.05)],
    [(0.4, 0.05), (0.42, 0.1), (0.46, 0.9), (0.5, 1.0)],
    [(0.5, 1.0), (0.54, 0.9), (0.58, 0.1), (0.6, 0.05)],
    [(0.6, 0.05), (0.62, 0.0), (0.67, 0.0), (1.0, 0.0)],
];

/// Trait for tab shape strategies.
pub trait EdgeShaper {
    /// Points along one side from `start` to `end`, both included.
    ///
    /// The first point is exactly `start` and the last exactly `end`.
    /// Flat edges return just the two endpoints.
    fn profile(
        &self,
        start: Point,
        end: Point,
        edge_type: EdgeType,
        tab_size: f64,
        steps: u32,
    ) -> Vec<Point>;

    /// Furthest perpendicular distance a tab of `tab_size` reaches from
    /// the edge line.
    fn max_protrusion(&self, tab_size: f64) -> f64;
}

impl EdgeShaper for EdgeStyle {
    fn profile(
        &self,
        start: Point,
        end: Point,
        edge_type: EdgeType,
        tab_size: f64,
        steps: u32,
    ) -> Vec<Point> {
        let frame = EdgeFrame::new(start, end);
        if edge_type == EdgeType::Flat || frame.length <= f64::EPSILON {
            return vec![start, end];
        }
        let bulge = edge_type.bulge_sign() * tab_size;
        let mut points = match *self {
            Self::Arc => arc_profile(&frame, tab_size, bulge, steps),
            Self::Bezier => bezier_profile(&frame, bulge, steps),
        };
        // Pin the corners exactly; the frame transform can be off by an ulp.
        if let Some(first) = points.first_mut() {
            *first = start;
        }
        if let Some(last) = points.last_mut() {
            *last = end;
        }
        points
    }

    fn max_protrusion(&self, tab_size: f64) -> f64 {
        match *self {
            // The arc apex is one radius out; the reference tab peaks at
            // exactly one tab size and no control point lies above it.
            Self::Arc | Self::Bezier => tab_size,
        }
    }
}

/// Local `(u, v)` frame of one edge.
struct EdgeFrame {
    origin: Point,
    along: (f64, f64),
    normal: (f64, f64),
    length: f64,
}

impl EdgeFrame {
    fn new(start: Point, end: Point) -> Self {
        let length = start.distance(end);
        let along = if length > 0.0 {
            ((end.x - start.x) / length, (end.y - start.y) / length)
        } else {
            (0.0, 0.0)
        };
        Self {
            origin: start,
            along,
            normal: (along.1, -along.0),
            length,
        }
    }

    /// Map `u` pixels along the edge and `v` pixels along the outward
    /// normal back to the caller's coordinate frame.
    fn to_world(&self, u: f64, v: f64) -> Point {
        Point::new(
            v.mul_add(self.normal.0, u.mul_add(self.along.0, self.origin.x)),
            v.mul_add(self.normal.1, u.mul_add(self.along.1, self.origin.y)),
        )
    }
}

/// Straight lead-in, half-circle head, straight lead-out.
///
/// The circle is centered on the edge midpoint; sweeping 180° → 0°
/// passes through `v = +r`, and 180° → 360° through `v = -r`, so the
/// sweep direction carries the bulge sign.
fn arc_profile(frame: &EdgeFrame, radius: f64, bulge: f64, steps: u32) -> Vec<Point> {
    let mid = frame.length / 2.0;
    let end_deg = if bulge > 0.0 { 0.0 } else { 360.0 };
    let head = CurveSpec::Arc {
        center: Point::new(mid, 0.0),
        radius,
        start_deg: 180.0,
        end_deg,
    };
    // At least two steps so the apex is always sampled.
    let samples = head.sample(steps.max(2));
    let interior = &samples[1..samples.len() - 1];

    let mut points = Vec::with_capacity(interior.len() + 4);
    points.push(frame.to_world(0.0, 0.0));
    points.push(frame.to_world(mid - radius, 0.0));
    points.extend(interior.iter().map(|p| frame.to_world(p.x, p.y)));
    points.push(frame.to_world(mid + radius, 0.0));
    points.push(frame.to_world(frame.length, 0.0));
    points
}

/// The four [`REFERENCE_TAB`] segments scaled onto the edge.
fn bezier_profile(frame: &EdgeFrame, bulge: f64, steps: u32) -> Vec<Point> {
    let scale = |(u, v): (f64, f64)| Point::new(u * frame.length, v * bulge);
    let mut points = Vec::with_capacity(REFERENCE_TAB.len() * steps as usize + 1);
    for (i, segment) in REFERENCE_TAB.iter().enumerate() {
        let curve = CurveSpec::CubicBezier {
            p0: scale(segment[0]),
            p1: scale(segment[1]),
            p2: scale(segment[2]),
            p3: scale(segment[3]),
        };
        let samples = curve.sample(steps);
        // Each segment starts where the previous one ended.
        let skip = usize::from(i > 0);
        points.extend(
            samples[skip..]
                .iter()
                .map(|p| frame.to_world(p.x, p.y)),
        );
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;
    const STYLES: [EdgeStyle; 2] = [EdgeStyle::Arc, EdgeStyle::Bezier];

    fn top_edge(style: EdgeStyle, edge_type: EdgeType) -> Vec<Point> {
        style.profile(
            Point::new(10.0, 10.0),
            Point::new(110.0, 10.0),
            edge_type,
            25.0,
            20,
        )
    }

    #[test]
    fn flat_edge_is_two_endpoints() {
        for style in STYLES {
            let points = top_edge(style, EdgeType::Flat);
            assert_eq!(points, vec![Point::new(10.0, 10.0), Point::new(110.0, 10.0)]);
        }
    }

    #[test]
    fn endpoints_are_exact_on_diagonal_edges() {
        let start = Point::new(3.3, 7.7);
        let end = Point::new(91.1, 45.9);
        for style in STYLES {
            for edge_type in [EdgeType::Outward, EdgeType::Inward] {
                let points = style.profile(start, end, edge_type, 12.0, 20);
                assert_eq!(points.first(), Some(&start));
                assert_eq!(points.last(), Some(&end));
            }
        }
    }

    #[test]
    fn outward_top_edge_bulges_up_by_tab_size() {
        for style in STYLES {
            let points = top_edge(style, EdgeType::Outward);
            let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
            assert!((min_y - (10.0 - 25.0)).abs() < 1e-6, "{style:?}: min_y = {min_y}");
            assert!(max_y <= 10.0 + EPS, "{style:?}: max_y = {max_y}");
        }
    }

    #[test]
    fn inward_top_edge_bulges_down_by_tab_size() {
        for style in STYLES {
            let points = top_edge(style, EdgeType::Inward);
            let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
            assert!(min_y >= 10.0 - EPS, "{style:?}: min_y = {min_y}");
            assert!((max_y - (10.0 + 25.0)).abs() < 1e-6, "{style:?}: max_y = {max_y}");
        }
    }

    #[test]
    fn right_edge_outward_bulges_right() {
        // Travelling down the right side, the outward normal points +x.
        for style in STYLES {
            let points = style.profile(
                Point::new(50.0, 0.0),
                Point::new(50.0, 40.0),
                EdgeType::Outward,
                10.0,
                20,
            );
            let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            assert!((max_x - 60.0).abs() < 1e-6, "{style:?}: max_x = {max_x}");
            assert!(points.iter().all(|p| p.x >= 50.0 - EPS));
        }
    }

    #[test]
    fn profile_never_backtracks_along_the_edge() {
        for style in STYLES {
            for edge_type in [EdgeType::Outward, EdgeType::Inward] {
                let points = top_edge(style, edge_type);
                for pair in points.windows(2) {
                    assert!(
                        pair[1].x >= pair[0].x - EPS,
                        "{style:?} {edge_type:?}: x went from {} to {}",
                        pair[0].x,
                        pair[1].x,
                    );
                }
            }
        }
    }

    #[test]
    fn arc_leads_in_over_the_first_quarter() {
        // tab 25 on a 100px span: the head occupies exactly [35, 85].
        let points = top_edge(EdgeStyle::Arc, EdgeType::Outward);
        assert_eq!(points[0], Point::new(10.0, 10.0));
        assert!(points[1].distance(Point::new(35.0, 10.0)) < EPS);
        let n = points.len();
        assert!(points[n - 2].distance(Point::new(85.0, 10.0)) < EPS);
        assert_eq!(points[n - 1], Point::new(110.0, 10.0));
    }

    #[test]
    fn bezier_passes_through_junctions_and_peak() {
        let points = top_edge(EdgeStyle::Bezier, EdgeType::Outward);
        // Junctions sit at 40 % / 60 % of the span, 0.05 tab sizes up.
        let j1 = Point::new(10.0 + 40.0, 10.0 - 0.05 * 25.0);
        let peak = Point::new(60.0, 10.0 - 25.0);
        let j2 = Point::new(10.0 + 60.0, 10.0 - 0.05 * 25.0);
        for target in [j1, peak, j2] {
            assert!(
                points.iter().any(|p| p.distance(target) < 1e-6),
                "expected a sample at ({}, {})",
                target.x,
                target.y,
            );
        }
    }

    #[test]
    fn no_consecutive_duplicate_points() {
        for style in STYLES {
            for edge_type in [EdgeType::Outward, EdgeType::Inward] {
                for steps in [1, 2, 20] {
                    let points = style.profile(
                        Point::new(0.0, 0.0),
                        Point::new(80.0, 0.0),
                        edge_type,
                        20.0,
                        steps,
                    );
                    for pair in points.windows(2) {
                        assert!(pair[0].distance(pair[1]) > EPS, "{style:?} steps={steps}");
                    }
                }
            }
        }
    }

    #[test]
    fn shared_edge_profiles_mirror_each_other() {
        // One piece walks the edge left to right with a tab; its neighbor
        // walks it right to left with a slot. Same curve, reversed.
        let a = Point::new(20.0, 60.0);
        let b = Point::new(70.0, 60.0);
        for style in STYLES {
            let tab = style.profile(a, b, EdgeType::Outward, 12.5, 20);
            let mut slot = style.profile(b, a, EdgeType::Inward, 12.5, 20);
            slot.reverse();
            assert_eq!(tab.len(), slot.len());
            for (p, q) in tab.iter().zip(&slot) {
                assert!(p.distance(*q) < 1e-9, "{style:?}: ({}, {}) vs ({}, {})", p.x, p.y, q.x, q.y);
            }
        }
    }

    #[test]
    fn max_protrusion_matches_tab_size() {
        for style in STYLES {
            assert!((style.max_protrusion(12.5) - 12.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn opposite_edge_types() {
        assert_eq!(EdgeType::Outward.opposite(), EdgeType::Inward);
        assert_eq!(EdgeType::Inward.opposite(), EdgeType::Outward);
        assert_eq!(EdgeType::Flat.opposite(), EdgeType::Flat);
    }

    #[test]
    fn degenerate_edge_returns_endpoints() {
        let p = Point::new(5.0, 5.0);
        let points = EdgeStyle::Arc.profile(p, p, EdgeType::Outward, 3.0, 20);
        assert_eq!(points, vec![p, p]);
    }
}
