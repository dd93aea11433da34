//! File names for written pieces.
//!
//! Pieces are stored as `piece_{row}_{column}.png`. The grid position can
//! be recovered from the name alone, so a directory of pieces can be
//! reassembled without the manifest.

/// File name for the piece at `(row, column)`.
#[must_use]
pub fn piece_file_name(row: u32, column: u32) -> String {
    format!("piece_{row}_{column}.png")
}

/// Recover `(row, column)` from a name produced by [`piece_file_name`].
///
/// Returns `None` for anything else, including names with extra
/// components or negative indices.
///
/// # Examples
///
/// ```
/// use jigcut_core::naming::{parse_piece_file_name, piece_file_name};
///
/// assert_eq!(parse_piece_file_name(&piece_file_name(2, 7)), Some((2, 7)));
/// assert_eq!(parse_piece_file_name("manifest.json"), None);
/// ```
#[must_use]
pub fn parse_piece_file_name(name: &str) -> Option<(u32, u32)> {
    let stem = name.strip_prefix("piece_")?.strip_suffix(".png")?;
    let (row, column) = stem.split_once('_')?;
    Some((row.parse().ok()?, column.parse().ok()?))
}
