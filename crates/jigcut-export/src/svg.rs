//! SVG export serializer.
//!
//! Converts a puzzle's cut lines into an SVG string using the [`svg`]
//! crate for document construction, XML escaping, and path data
//! formatting.
//!
//! Each piece becomes one closed `<path>` element in source-image pixel
//! coordinates, with an `id` of `piece-{row}-{column}`. Shared edges are
//! therefore drawn twice, once per neighbor, along the same curve.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and the puzzle
//! configuration so exported files can be regenerated.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use jigcut_core::{PieceBoundary, PuzzlePlan};

/// Namespace for the embedded configuration element.
const CONFIG_NAMESPACE: &str = "urn:jigcut:config:1";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`PuzzleConfig`](jigcut_core::PuzzleConfig), emitted
    /// inside `<metadata>` wrapped in a namespaced `<jigcut:config>`
    /// element.
    pub config_json: Option<&'a str>,
}

/// The `id` attribute used for the piece at `(row, column)`.
#[must_use]
pub fn piece_id(row: u32, column: u32) -> String {
    format!("piece-{row}-{column}")
}

/// Build an SVG path `d` attribute string from a closed outline.
///
/// Uses `M` for the first point, `L` for the rest and `z` to close. The
/// repeated closing point is not emitted. Returns an empty string for
/// outlines with fewer than 3 distinct points.
///
/// # Examples
///
/// ```
/// use jigcut_core::{PieceEdges, PieceSpec, boundary, EdgeStyle};
/// use jigcut_export::build_path_data;
///
/// let spec = PieceSpec {
///     row: 0,
///     column: 0,
///     edges: PieceEdges::FLAT,
///     width: 10,
///     height: 20,
///     tab_size: 2.5,
///     margin: 5,
/// };
/// let outline = boundary::build(&spec, &EdgeStyle::Arc, 20);
/// assert_eq!(build_path_data(&outline), "M5,5 L15,5 L15,25 L5,25 z");
/// ```
#[must_use]
pub fn build_path_data(outline: &PieceBoundary) -> String {
    let mut points = outline.points();
    if outline.is_closed() {
        points = &points[..points.len() - 1];
    }
    if points.len() < 3 {
        return String::new();
    }

    let first = &points[0];
    let mut data = Data::new().move_to((first.x, first.y));
    for p in &points[1..] {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data.close()))
}

/// Serialize every piece outline of `plan` into an SVG document string.
///
/// The `viewBox` matches the source image pixel grid. Outlines appear in
/// row-major order.
///
/// # Examples
///
/// ```
/// use jigcut_core::{Dimensions, PuzzleConfig, PuzzlePlan};
/// use jigcut_export::{SvgMetadata, to_svg};
///
/// let config = PuzzleConfig { rows: 2, columns: 3, ..PuzzleConfig::default() };
/// let plan = PuzzlePlan::new(&config, Dimensions::new(300, 200)).unwrap();
/// let metadata = SvgMetadata {
///     title: Some("landscape"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&plan, &metadata);
/// assert!(svg.contains("<title>landscape</title>"));
/// assert!(svg.contains(r#"id="piece-1-2""#));
/// ```
#[must_use]
pub fn to_svg(plan: &PuzzlePlan, metadata: &SvgMetadata<'_>) -> String {
    let dimensions = plan.dimensions();
    let (w, h) = (dimensions.width, dimensions.height);
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("jigcut:config");
        config_el.assign("xmlns:jigcut", CONFIG_NAMESPACE);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    let columns = plan.config().columns;
    for (index, outline) in (0u32..).zip(plan.outlines()) {
        let d = build_path_data(&outline);
        if d.is_empty() {
            continue;
        }
        let path = Path::new()
            .set("id", piece_id(index / columns, index % columns))
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", 1);
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
