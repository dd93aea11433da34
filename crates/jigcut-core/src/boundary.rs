//! Piece outlines: four edge profiles joined into one closed polygon.
//!
//! Outlines are built in canvas-local coordinates, where the unpadded
//! cell rectangle starts at `(margin, margin)`. The rasterizer fills them
//! directly; [`PieceBoundary::translate`] moves them into source-image
//! space for previews and vector export.

use geo::algorithm::line_intersection::line_intersection;
use geo::{Area, Coord, Line, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::edge::EdgeShaper;
use crate::pattern::PieceEdges;
use crate::types::Point;

/// Everything needed to outline and render one piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceSpec {
    /// Grid row of the piece.
    pub row: u32,
    /// Grid column of the piece.
    pub column: u32,
    /// Edge types, boundary-facing sides already flat.
    pub edges: PieceEdges,
    /// Unpadded cell width in pixels.
    pub width: u32,
    /// Unpadded cell height in pixels.
    pub height: u32,
    /// Tab size in pixels.
    pub tab_size: f64,
    /// Transparent margin on every side of the cell in pixels.
    pub margin: u32,
}

impl PieceSpec {
    /// Canvas width: the cell plus a margin on both sides.
    #[must_use]
    pub const fn canvas_width(&self) -> u32 {
        self.width + 2 * self.margin
    }

    /// Canvas height: the cell plus a margin on both sides.
    #[must_use]
    pub const fn canvas_height(&self) -> u32 {
        self.height + 2 * self.margin
    }
}

/// Closed outline of one piece, clockwise from the top-left corner.
///
/// The last point always equals the first.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceBoundary {
    points: Vec<Point>,
}

/// Build the outline of the piece described by `spec`.
///
/// Sides are traversed top (left to right), right (top to bottom),
/// bottom (right to left) and left (bottom to top), so every outward
/// normal points away from the interior. Seam points shared by two sides
/// appear once.
#[must_use]
pub fn build<S: EdgeShaper + ?Sized>(spec: &PieceSpec, shaper: &S, steps: u32) -> PieceBoundary {
    let m = f64::from(spec.margin);
    let w = f64::from(spec.width);
    let h = f64::from(spec.height);
    let top_left = Point::new(m, m);
    let top_right = Point::new(m + w, m);
    let bottom_right = Point::new(m + w, m + h);
    let bottom_left = Point::new(m, m + h);

    let sides = [
        (top_left, top_right, spec.edges.top),
        (top_right, bottom_right, spec.edges.right),
        (bottom_right, bottom_left, spec.edges.bottom),
        (bottom_left, top_left, spec.edges.left),
    ];

    let mut points = vec![top_left];
    for (start, end, edge_type) in sides {
        let profile = shaper.profile(start, end, edge_type, spec.tab_size, steps);
        points.extend(profile.into_iter().skip(1));
    }
    PieceBoundary { points }
}

impl PieceBoundary {
    /// The outline points, first and last equal.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points, counting the closing point.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the outline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if the outline ends where it starts.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 4 && self.points.first() == self.points.last()
    }

    /// A copy of the outline shifted by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p.offset(dx, dy)).collect(),
        }
    }

    /// Enclosed area in square pixels.
    #[must_use]
    pub fn area(&self) -> f64 {
        Polygon::new(self.line_string(), vec![]).unsigned_area()
    }

    /// Returns `true` if no two non-adjacent segments touch.
    ///
    /// Quadratic in the number of points; meant for validation and
    /// tests, not the render path.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        let segments: Vec<Line<f64>> = self
            .points
            .windows(2)
            .map(|pair| Line::new(to_coord(pair[0]), to_coord(pair[1])))
            .collect();
        let n = segments.len();
        for i in 0..n {
            for j in (i + 2)..n {
                // The first and last segments meet at the start point.
                if i == 0 && j == n - 1 {
                    continue;
                }
                if line_intersection(segments[i], segments[j]).is_some() {
                    return false;
                }
            }
        }
        true
    }

    /// Smallest axis-aligned box containing the outline, as
    /// `(min, max)` corners.
    #[must_use]
    pub fn bounding_box(&self) -> (Point, Point) {
        self.points.iter().fold(
            (
                Point::new(f64::INFINITY, f64::INFINITY),
                Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        )
    }

    fn line_string(&self) -> LineString<f64> {
        self.points.iter().copied().map(to_coord).collect()
    }
}

const fn to_coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}
