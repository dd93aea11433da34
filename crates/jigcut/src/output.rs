//! Writing pieces to disk: PNG files plus a JSON manifest.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use jigcut_core::naming::piece_file_name;
use jigcut_core::{Dimensions, GridGeometry, PieceArtifact, PieceEdges, PuzzleConfig};
use serde::{Deserialize, Serialize};

/// File name of the manifest written next to the pieces.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Errors from writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Creating a directory or writing a file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Encoding or saving an image failed.
    #[error("failed to save {}: {source}", path.display())]
    Image {
        /// The path being written.
        path: PathBuf,
        /// The underlying image error.
        source: image::ImageError,
    },

    /// Serializing the manifest failed.
    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Description of a written puzzle, stored as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Source image path as given on the command line.
    pub source: String,
    /// Source image size.
    pub dimensions: Dimensions,
    /// Configuration the pieces were cut with.
    pub config: PuzzleConfig,
    /// Cell size, tab size and margin.
    pub geometry: GridGeometry,
    /// One entry per piece, row-major.
    pub pieces: Vec<ManifestPiece>,
}

/// One piece in the [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestPiece {
    /// PNG file name relative to the manifest.
    pub file: String,
    /// Grid row.
    pub row: u32,
    /// Grid column.
    pub column: u32,
    /// Horizontal position of the cell on the piece canvas.
    pub offset_x: u32,
    /// Vertical position of the cell on the piece canvas.
    pub offset_y: u32,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Edge types of the piece.
    pub edges: PieceEdges,
}

impl ManifestPiece {
    /// Manifest entry for a rendered piece.
    #[must_use]
    pub fn from_artifact(piece: &PieceArtifact) -> Self {
        let canvas = piece.canvas_dimensions();
        Self {
            file: piece_file_name(piece.row, piece.column),
            row: piece.row,
            column: piece.column,
            offset_x: piece.offset.0,
            offset_y: piece.offset.1,
            width: canvas.width,
            height: canvas.height,
            edges: piece.edges,
        }
    }
}

/// Save every piece as a PNG in `dir`, creating it if needed.
///
/// Returns the written paths in the same order as `pieces`.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if the directory cannot be created and
/// [`OutputError::Image`] if a piece cannot be saved.
pub fn write_pieces(dir: &Path, pieces: &[PieceArtifact]) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    pieces
        .iter()
        .map(|piece| {
            let path = dir.join(piece_file_name(piece.row, piece.column));
            piece
                .image
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|source| OutputError::Image {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(path = %path.display(), "wrote piece");
            Ok(path)
        })
        .collect()
}

/// Write `manifest` as pretty-printed JSON to `dir/manifest.json`.
///
/// # Errors
///
/// Returns [`OutputError::Json`] if serialization fails and
/// [`OutputError::Io`] if the file cannot be written.
pub fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<PathBuf, OutputError> {
    let json = serde_json::to_string_pretty(manifest)?;
    let path = dir.join(MANIFEST_FILE_NAME);
    fs::write(&path, json).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
