//! Piece rasterization: outline to alpha mask, mask onto pixels.
//!
//! Each piece lands on an oversized transparent canvas. The cell's
//! pixels are pasted at `(margin, margin)` and the canvas alpha channel
//! is replaced by the filled outline, so tabs reach into the margin and
//! slots cut into the cell.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Mask, PathBuilder, Transform};

use crate::boundary::{PieceBoundary, PieceSpec};
use crate::pattern::PieceEdges;
use crate::types::{Dimensions, PuzzleError, Rect};

/// How the outline is turned into alpha values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaskMode {
    /// Hard 0/255 edges sampled at pixel centers.
    ///
    /// A piece with four flat sides covers exactly its cell.
    #[default]
    Binary,
    /// Smooth edges: alpha is the fraction of each pixel covered.
    Antialiased,
}

/// Read access to the picture being cut.
///
/// Implemented for [`RgbaImage`]; other sources (tiled, memory-mapped,
/// remote) can plug in by cropping on demand.
pub trait ImageSource {
    /// Size of the full source image.
    fn dimensions(&self) -> Dimensions;

    /// Copy out the pixels inside `rect`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::OutOfBounds`] if `rect` is not entirely
    /// inside the image.
    fn crop(&self, rect: Rect) -> Result<RgbaImage, PuzzleError>;
}

impl ImageSource for RgbaImage {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    fn crop(&self, rect: Rect) -> Result<RgbaImage, PuzzleError> {
        let dimensions = ImageSource::dimensions(self);
        if !rect.fits_within(dimensions) {
            return Err(PuzzleError::OutOfBounds { rect, dimensions });
        }
        Ok(image::imageops::crop_imm(self, rect.x, rect.y, rect.width, rect.height).to_image())
    }
}

/// One finished piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceArtifact {
    /// Grid row of the piece.
    pub row: u32,
    /// Grid column of the piece.
    pub column: u32,
    /// Edge types the outline was built from.
    pub edges: PieceEdges,
    /// Oversized canvas with transparent background.
    pub image: RgbaImage,
    /// Position of the unpadded cell's top-left corner on the canvas.
    pub offset: (u32, u32),
}

impl PieceArtifact {
    /// Size of the canvas.
    #[must_use]
    pub fn canvas_dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }
}

/// Fill `boundary` into a `width` x `height` mask.
///
/// Inside pixels are 255 (or partial coverage in
/// [`MaskMode::Antialiased`]), everything else 0. Even-odd filling.
#[must_use]
pub fn fill_mask(boundary: &PieceBoundary, width: u32, height: u32, mode: MaskMode) -> GrayImage {
    match mode {
        MaskMode::Binary => fill_binary(boundary, width, height),
        MaskMode::Antialiased => fill_skia(boundary, width, height, true),
    }
}

/// Scanline fill sampled at pixel centers.
///
/// tiny-skia's non-anti-aliased fill covers nearly the same pixels, but
/// it converts coordinates to `f32` and occasionally rounds a pixel whose
/// center sits on a shared edge into both neighbors or neither. Crossings
/// here are computed in `f64` from the same points both neighbors share,
/// with a half-open rule, so adjacent pieces partition the image exactly.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_binary(boundary: &PieceBoundary, width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let points = boundary.points();
    let mut crossings: Vec<f64> = Vec::new();
    let max_x = f64::from(width);

    for y in 0..height {
        let yc = f64::from(y) + 0.5;
        crossings.clear();
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if (a.y <= yc) != (b.y <= yc) {
                crossings.push((yc - a.y).mul_add((b.x - a.x) / (b.y - a.y), a.x));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // Pixel x is inside when its center x + 0.5 lies in [left, right).
            let start = (span[0] - 0.5).ceil().clamp(0.0, max_x) as u32;
            let end = (span[1] - 0.5).ceil().clamp(0.0, max_x) as u32;
            for x in start..end {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
    mask
}

/// Even-odd fill through tiny-skia; with `anti_alias` the alpha is
/// coverage.
#[allow(clippy::cast_possible_truncation)]
fn fill_skia(boundary: &PieceBoundary, width: u32, height: u32, anti_alias: bool) -> GrayImage {
    let points = boundary.points();

    let mut pb = PathBuilder::new();
    if let Some(first) = points.first() {
        pb.move_to(first.x as f32, first.y as f32);
        for p in &points[1..] {
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
    }

    let Some(path) = pb.finish() else {
        return GrayImage::new(width, height);
    };
    let Some(mut mask) = Mask::new(width, height) else {
        return GrayImage::new(width, height);
    };
    mask.fill_path(&path, FillRule::EvenOdd, anti_alias, Transform::identity());

    GrayImage::from_raw(width, height, mask.data().to_vec())
        .unwrap_or_else(|| GrayImage::new(width, height))
}

/// Render one piece.
///
/// `crop` is read from `source` and pasted onto the canvas with its
/// top-left corner at `paste_at`. For a plain cut `crop` is the piece's
/// cell and `paste_at` is `(margin, margin)`; a wider crop pasted
/// further up and left fills the tabs with neighboring pixels.
///
/// # Errors
///
/// Returns [`PuzzleError::OutOfBounds`] if `crop` is not inside the
/// source image.
pub fn rasterize<S: ImageSource + ?Sized>(
    spec: &PieceSpec,
    boundary: &PieceBoundary,
    source: &S,
    crop: Rect,
    paste_at: (u32, u32),
    mode: MaskMode,
) -> Result<PieceArtifact, PuzzleError> {
    let width = spec.canvas_width();
    let height = spec.canvas_height();

    let pixels = source.crop(crop)?;
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    image::imageops::replace(
        &mut image,
        &pixels,
        i64::from(paste_at.0),
        i64::from(paste_at.1),
    );

    let mask = fill_mask(boundary, width, height, mode);
    for (pixel, coverage) in image.pixels_mut().zip(mask.pixels()) {
        pixel.0[3] = coverage.0[0];
    }

    Ok(PieceArtifact {
        row: spec.row,
        column: spec.column,
        edges: spec.edges,
        image,
        offset: (spec.margin, spec.margin),
    })
}
