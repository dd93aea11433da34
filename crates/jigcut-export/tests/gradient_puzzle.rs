//! Integration test: cut a synthetic gradient image and export its cut
//! lines to SVG.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use image::{ImageEncoder, Rgba, RgbaImage};
use jigcut_core::{Dimensions, EdgeStyle, PuzzleConfig, PuzzlePlan};

fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let r = u8::try_from(x * 255 / width).unwrap();
        let b = u8::try_from(y * 255 / height).unwrap();
        Rgba([r, 64, b, 255])
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

#[test]
fn gradient_pieces_and_svg_agree() {
    let bytes = gradient_png(400, 300);
    let config = PuzzleConfig {
        rows: 3,
        columns: 4,
        seed: 42,
        edge_style: EdgeStyle::Bezier,
        ..PuzzleConfig::default()
    };

    let pieces = jigcut_core::cut(&bytes, &config).expect("cut should succeed");
    assert_eq!(pieces.len(), 12);

    let plan = PuzzlePlan::new(&config, Dimensions::new(400, 300)).unwrap();
    let config_json = serde_json::to_string(&config).unwrap();
    let svg = jigcut_export::to_svg(
        &plan,
        &jigcut_export::SvgMetadata {
            title: Some("gradient"),
            description: Some("3x4 bezier, seed 42"),
            config_json: Some(&config_json),
        },
    );
    eprintln!("SVG is {} bytes", svg.len());

    assert!(svg.contains("<svg"));
    assert!(svg.contains("</svg>"));
    assert_eq!(svg.matches("<path").count(), pieces.len());
    for piece in &pieces {
        let id = jigcut_export::piece_id(piece.row, piece.column);
        assert!(svg.contains(&format!(r#"id="{id}""#)), "missing {id}");
    }
}
