//! jigcut-export: Pure format serializers (sans-IO)
//!
//! Converts piece outlines into vector formats for cutting machines and
//! print previews. Currently supports SVG.

pub mod svg;

pub use svg::{SvgMetadata, build_path_data, piece_id, to_svg};
