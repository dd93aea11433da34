//! Debug previews.
//!
//! Two overlays for checking a puzzle before cutting it: the straight
//! cell grid, and the actual cut lines with every tab and slot. A third
//! image shows the Bézier reference tab on its own, with control points.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as DrawRect;

use crate::boundary::PieceBoundary;
use crate::curve::CurveSpec;
use crate::edge::REFERENCE_TAB;
use crate::types::{Dimensions, Point};

/// Background of the reference tab diagram.
const DIAGRAM_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Lines from segment end points to their control points.
const CONTROL_LINE_COLOR: Rgba<u8> = Rgba([200, 200, 200, 255]);
/// Bézier control points.
const CONTROL_POINT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
/// Segment end points, including the junctions between segments.
const END_POINT_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);
/// Radius of the point markers.
const POINT_RADIUS: i32 = 5;
/// Samples per reference segment.
const REFERENCE_STEPS: u32 = 30;

/// Color and thickness of preview lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    /// Line color.
    pub color: Rgba<u8>,
    /// Line thickness in pixels (at least 1 is drawn).
    pub width: u32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgba([255, 0, 0, 255]),
            width: 2,
        }
    }
}

/// Copy of `source` with a line along every internal cell boundary.
///
/// Cell sizes follow the same floor division as the cutter, so lines
/// land exactly where pieces are split.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn draw_grid(source: &RgbaImage, rows: u32, columns: u32, style: LineStyle) -> RgbaImage {
    let mut image = source.clone();
    let (width, height) = image.dimensions();
    let thickness = style.width.max(1);
    let half = (thickness / 2) as i32;

    if let Some(cell_height) = height.checked_div(rows) {
        for r in 1..rows {
            let y = (r * cell_height) as i32 - half;
            draw_filled_rect_mut(
                &mut image,
                DrawRect::at(0, y).of_size(width, thickness),
                style.color,
            );
        }
    }
    if let Some(cell_width) = width.checked_div(columns) {
        for c in 1..columns {
            let x = (c * cell_width) as i32 - half;
            draw_filled_rect_mut(
                &mut image,
                DrawRect::at(x, 0).of_size(thickness, height),
                style.color,
            );
        }
    }
    image
}

/// Copy of `source` with every outline stroked.
///
/// `outlines` must be in source-image coordinates, as returned by
/// [`PuzzlePlan::outlines`](crate::PuzzlePlan::outlines).
#[must_use]
pub fn draw_cut_lines(source: &RgbaImage, outlines: &[PieceBoundary], style: LineStyle) -> RgbaImage {
    let mut image = source.clone();
    for outline in outlines {
        stroke_polyline(&mut image, outline.points(), style);
    }
    image
}

/// Diagram of the normalized reference tab used by
/// [`EdgeStyle::Bezier`](crate::EdgeStyle::Bezier).
///
/// The tab spans the image width minus `margin` on each side and rises
/// from the bottom margin to the top margin. The curve is drawn with
/// `style`, control lines in light gray, control points in red and
/// segment end points in blue, on a white background.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn draw_reference_tab(size: Dimensions, margin: u32, style: LineStyle) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size.width, size.height, DIAGRAM_BACKGROUND);
    let scale_x = f64::from(size.width.saturating_sub(margin.saturating_mul(2)));
    let scale_y = f64::from(size.height.saturating_sub(margin.saturating_mul(2)));
    let baseline = f64::from(size.height.saturating_sub(margin));
    let left = f64::from(margin);
    // Tab points up, so y is flipped.
    let to_image =
        |(u, v): (f64, f64)| Point::new(u.mul_add(scale_x, left), v.mul_add(-scale_y, baseline));

    let segments: Vec<[Point; 4]> = REFERENCE_TAB
        .iter()
        .map(|segment| segment.map(&to_image))
        .collect();

    for [p0, p1, p2, p3] in &segments {
        draw_line_segment_mut(&mut image, to_f32(*p0), to_f32(*p1), CONTROL_LINE_COLOR);
        draw_line_segment_mut(&mut image, to_f32(*p2), to_f32(*p3), CONTROL_LINE_COLOR);
    }

    let mut curve: Vec<Point> = Vec::new();
    for &[p0, p1, p2, p3] in &segments {
        let samples = CurveSpec::CubicBezier { p0, p1, p2, p3 }.sample(REFERENCE_STEPS);
        let skip = usize::from(!curve.is_empty());
        curve.extend(samples.into_iter().skip(skip));
    }
    stroke_polyline(&mut image, &curve, style);

    let center = |p: Point| (p.x.round() as i32, p.y.round() as i32);
    for [_, p1, p2, _] in &segments {
        draw_filled_circle_mut(&mut image, center(*p1), POINT_RADIUS, CONTROL_POINT_COLOR);
        draw_filled_circle_mut(&mut image, center(*p2), POINT_RADIUS, CONTROL_POINT_COLOR);
    }
    for [p0, _, _, p3] in &segments {
        draw_filled_circle_mut(&mut image, center(*p0), POINT_RADIUS, END_POINT_COLOR);
        draw_filled_circle_mut(&mut image, center(*p3), POINT_RADIUS, END_POINT_COLOR);
    }
    image
}

/// Stroke consecutive points as a line `style.width` pixels thick.
#[allow(clippy::cast_precision_loss)]
fn stroke_polyline(image: &mut RgbaImage, points: &[Point], style: LineStyle) {
    let thickness = style.width.max(1);
    // Offsets centered on the line, e.g. [-0.5, 0.5] for width 2.
    let offsets: Vec<f32> = (0..thickness)
        .map(|i| i as f32 - (thickness - 1) as f32 / 2.0)
        .collect();

    for pair in points.windows(2) {
        let ((ax, ay), (bx, by)) = (to_f32(pair[0]), to_f32(pair[1]));
        for &o in &offsets {
            draw_line_segment_mut(image, (ax + o, ay), (bx + o, by), style.color);
            draw_line_segment_mut(image, (ax, ay + o), (bx, by + o), style.color);
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn to_f32(p: Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}
