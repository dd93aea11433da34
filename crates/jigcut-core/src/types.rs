//! Shared types for jigcut piece generation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::edge::EdgeStyle;
use crate::raster::MaskMode;

/// Re-export `RgbaImage` so downstream crates can reference piece
/// rasters without depending on `image` directly.
pub use image::RgbaImage;

/// Re-export `GrayImage` for mask rasters.
pub use image::GrayImage;

/// A 2D point.
///
/// Used both in source-image space and in canvas-local piece space;
/// the frame is implied by the owner of the point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// This point shifted by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned pixel rectangle, used for source crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left column of the rectangle.
    pub x: u32,
    /// Top row of the rectangle.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the rectangle lies entirely inside an image of
    /// the given dimensions.
    ///
    /// Computed in `u64` so that rectangles near `u32::MAX` cannot wrap
    /// around and appear to fit.
    #[must_use]
    pub fn fits_within(&self, dimensions: Dimensions) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(dimensions.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(dimensions.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Configuration for cutting an image into jigsaw pieces.
///
/// Read once when a [`PuzzlePlan`](crate::PuzzlePlan) is built and never
/// consulted again mid-run. Call [`validate`](Self::validate) (or build a
/// plan, which validates) before relying on any field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    /// Number of piece rows. Must be at least 1.
    pub rows: u32,

    /// Number of piece columns. Must be at least 1.
    pub columns: u32,

    /// Tab size as a fraction of the smaller cell dimension.
    ///
    /// Must lie in the open interval `(0, 0.5)`. Values above
    /// [`PuzzleConfig::MAX_SIMPLE_TAB_FRACTION`] pass config validation
    /// but are rejected as geometry errors when the plan is built.
    pub tab_fraction: f64,

    /// Seed for the tab/slot pattern. The same seed always produces the
    /// same pattern and byte-identical pieces.
    pub seed: u64,

    /// Line segments per sampled curve. Higher values give smoother
    /// outlines at the cost of more polygon vertices.
    pub curve_steps: u32,

    /// Which curve family shapes the tabs.
    pub edge_style: EdgeStyle,

    /// How the piece outline is rasterized into the alpha mask.
    pub mask_mode: MaskMode,

    /// Require the image dimensions to divide evenly by the grid.
    ///
    /// When `false`, leftover pixels at the right and bottom edges are
    /// dropped.
    pub strict_divisibility: bool,

    /// Fill tab pixels from the neighboring cells.
    ///
    /// When `false`, only the piece's own cell is copied and any tab
    /// area outside it is opaque black. When `true`, the crop is widened
    /// by the margin (clipped to the source image) so tabs show the
    /// picture they were cut from.
    #[serde(default)]
    pub bleed: bool,
}

impl PuzzleConfig {
    /// Default number of piece rows.
    pub const DEFAULT_ROWS: u32 = 5;
    /// Default number of piece columns.
    pub const DEFAULT_COLUMNS: u32 = 5;
    /// Default tab size relative to the smaller cell dimension.
    pub const DEFAULT_TAB_FRACTION: f64 = 0.25;
    /// Default pattern seed.
    pub const DEFAULT_SEED: u64 = 0;
    /// Default curve sampling resolution.
    pub const DEFAULT_CURVE_STEPS: u32 = 20;

    /// Exclusive upper bound accepted by [`validate`](Self::validate).
    pub const MAX_TAB_FRACTION: f64 = 0.5;
    /// Largest tab fraction for which outlines are guaranteed simple.
    pub const MAX_SIMPLE_TAB_FRACTION: f64 = 0.3;
    /// Margin around each piece as a fraction of the smaller cell
    /// dimension. Always covers the largest tab protrusion.
    pub const MARGIN_FRACTION: f64 = 0.5;

    /// Check the parameters that do not depend on the source image.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] if the grid has no rows or
    /// no columns, if `tab_fraction` is not a finite value in `(0, 0.5)`,
    /// or if `curve_steps` is zero.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "grid must have at least one row and one column, got {} rows and {} columns",
                self.rows, self.columns,
            )));
        }
        if !self.tab_fraction.is_finite()
            || self.tab_fraction <= 0.0
            || self.tab_fraction >= Self::MAX_TAB_FRACTION
        {
            return Err(PuzzleError::InvalidConfig(format!(
                "tab_fraction must be in (0, {}), got {}",
                Self::MAX_TAB_FRACTION,
                self.tab_fraction,
            )));
        }
        if self.curve_steps == 0 {
            return Err(PuzzleError::InvalidConfig(
                "curve_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            rows: Self::DEFAULT_ROWS,
            columns: Self::DEFAULT_COLUMNS,
            tab_fraction: Self::DEFAULT_TAB_FRACTION,
            seed: Self::DEFAULT_SEED,
            curve_steps: Self::DEFAULT_CURVE_STEPS,
            edge_style: EdgeStyle::default(),
            mask_mode: MaskMode::default(),
            strict_divisibility: false,
            bleed: false,
        }
    }
}

/// Errors that can occur while planning or rendering a puzzle.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Grid or curve parameters are invalid, or inconsistent with the
    /// image size.
    #[error("invalid puzzle configuration: {0}")]
    InvalidConfig(String),

    /// Tabs this large would make piece outlines self-intersect.
    #[error(
        "tab size {tab_size:.2}px exceeds the {limit:.2}px limit for self-intersection-free outlines"
    )]
    Geometry {
        /// Requested tab size in pixels.
        tab_size: f64,
        /// Largest supported tab size for the cell size in pixels.
        limit: f64,
    },

    /// A crop rectangle fell outside the source image.
    #[error("crop {rect} lies outside the {dimensions} source image")]
    OutOfBounds {
        /// The offending crop rectangle.
        rect: Rect,
        /// Dimensions of the source image.
        dimensions: Dimensions,
    },

    /// The run was cancelled before every piece was rendered.
    #[error("puzzle generation was cancelled")]
    Cancelled,
}
