//! jigcut-core: Jigsaw piece generation (sans-IO).
//!
//! Cuts a raster image into an interlocking grid of pieces:
//! tab pattern -> piece outlines -> alpha masks -> oversized RGBA pieces.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and image buffers and returns structured data. Writing
//! pieces to disk lives in the `jigcut` binary; vector export lives in
//! `jigcut-export`.

pub mod assemble;
pub mod boundary;
pub mod curve;
pub mod decode;
pub mod edge;
pub mod naming;
pub mod pattern;
pub mod preview;
pub mod raster;
pub mod types;

pub use assemble::{CancelToken, GridGeometry, PuzzlePlan, assemble, assemble_with_cancel};
pub use boundary::{PieceBoundary, PieceSpec};
pub use curve::CurveSpec;
pub use edge::{EdgeShaper, EdgeStyle, EdgeType};
pub use pattern::{GridEdgeKey, Orientation, PieceEdges, TabPattern, TabSign};
pub use raster::{ImageSource, MaskMode, PieceArtifact};
pub use types::{Dimensions, Point, PuzzleConfig, PuzzleError, Rect};

/// Decode an image and cut it into pieces.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration and
/// returns one [`PieceArtifact`] per grid cell in row-major order.
///
/// # Steps
///
/// 1. Validate the configuration
/// 2. Decode the image to RGBA
/// 3. Plan: cell geometry and the seeded tab pattern
/// 4. Render every piece in parallel
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidConfig`] for a bad configuration, before
/// the bytes are decoded.
/// Returns [`PuzzleError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PuzzleError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PuzzleError::Geometry`] if the tabs are too large for the
/// cell size.
pub fn cut(image_bytes: &[u8], config: &PuzzleConfig) -> Result<Vec<PieceArtifact>, PuzzleError> {
    // 1. Configuration problems are reported before any decoding work.
    config.validate()?;

    // 2. Decode.
    let source = decode::decode_rgba(image_bytes)?;

    // 3-4. Plan and render.
    assemble(&source, config)
}
