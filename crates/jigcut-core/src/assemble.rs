//! Puzzle assembly: plan once, then render every piece in parallel.
//!
//! [`PuzzlePlan::new`] does all the validation and the only random draw.
//! It never touches pixels, so a bad configuration fails before any image
//! work starts. [`PuzzlePlan::render`] then reads the frozen plan from
//! every worker thread and produces one [`PieceArtifact`] per cell in
//! row-major order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::boundary::{self, PieceBoundary, PieceSpec};
use crate::edge::EdgeShaper;
use crate::pattern::TabPattern;
use crate::raster::{self, ImageSource, PieceArtifact};
use crate::types::{Dimensions, PuzzleConfig, PuzzleError, Rect};

/// Shared flag for stopping a render from another thread.
///
/// Clones share the same flag. Workers check it before each cell, so a
/// cancelled run stops after the pieces already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any
    /// clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Pixel sizes shared by every piece of one puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Width of one cell.
    pub cell_width: u32,
    /// Height of one cell.
    pub cell_height: u32,
    /// Tab size in pixels.
    pub tab_size: f64,
    /// Transparent margin around each cell.
    pub margin: u32,
}

impl GridGeometry {
    /// Derive cell size, tab size and margin for `config` on an image of
    /// `dimensions`.
    ///
    /// # Errors
    ///
    /// - [`PuzzleError::InvalidConfig`] if a cell would be smaller than one
    ///   pixel, or if `strict_divisibility` is set and the image does not
    ///   divide evenly.
    /// - [`PuzzleError::Geometry`] if the tab would be too large for
    ///   self-intersection-free outlines.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn compute(config: &PuzzleConfig, dimensions: Dimensions) -> Result<Self, PuzzleError> {
        let Dimensions { width, height } = dimensions;
        let cell_width = width / config.columns;
        let cell_height = height / config.rows;
        if cell_width == 0 || cell_height == 0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "a {dimensions} image is too small for {} rows and {} columns",
                config.rows, config.columns,
            )));
        }
        if config.strict_divisibility && (width % config.columns != 0 || height % config.rows != 0)
        {
            return Err(PuzzleError::InvalidConfig(format!(
                "a {dimensions} image does not divide evenly into {} rows and {} columns",
                config.rows, config.columns,
            )));
        }

        let min_cell = f64::from(cell_width.min(cell_height));
        let tab_size = config.tab_fraction * min_cell;
        let limit = PuzzleConfig::MAX_SIMPLE_TAB_FRACTION * min_cell;
        let margin = PuzzleConfig::MARGIN_FRACTION * min_cell;
        if tab_size > limit || config.edge_style.max_protrusion(tab_size) > margin {
            return Err(PuzzleError::Geometry { tab_size, limit });
        }

        Ok(Self {
            cell_width,
            cell_height,
            tab_size,
            margin: margin.ceil() as u32,
        })
    }
}

/// A validated puzzle ready to render.
///
/// Holds the configuration, the cell geometry and the frozen tab pattern.
/// Nothing in a plan changes after construction.
#[derive(Debug, Clone)]
pub struct PuzzlePlan {
    config: PuzzleConfig,
    dimensions: Dimensions,
    geometry: GridGeometry,
    pattern: TabPattern,
}

impl PuzzlePlan {
    /// Validate `config` against an image of `dimensions` and draw the
    /// tab pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidConfig`] or [`PuzzleError::Geometry`];
    /// see [`PuzzleConfig::validate`] and [`GridGeometry::compute`].
    pub fn new(config: &PuzzleConfig, dimensions: Dimensions) -> Result<Self, PuzzleError> {
        config.validate()?;
        let geometry = GridGeometry::compute(config, dimensions)?;
        let pattern = TabPattern::from_seed(config.rows, config.columns, config.seed);

        tracing::info!(
            rows = config.rows,
            columns = config.columns,
            cell_width = geometry.cell_width,
            cell_height = geometry.cell_height,
            tab_size = geometry.tab_size,
            margin = geometry.margin,
            seed = config.seed,
            "planned {dimensions} puzzle",
        );

        Ok(Self {
            config: config.clone(),
            dimensions,
            geometry,
            pattern,
        })
    }

    /// The configuration the plan was built from.
    #[must_use]
    pub const fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    /// Dimensions of the source image the plan expects.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Cell size, tab size and margin.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// The frozen tab pattern.
    #[must_use]
    pub const fn pattern(&self) -> &TabPattern {
        &self.pattern
    }

    /// Number of pieces the plan produces.
    #[must_use]
    pub const fn piece_count(&self) -> usize {
        self.config.rows as usize * self.config.columns as usize
    }

    /// The source rectangle of cell `(row, column)`.
    #[must_use]
    pub const fn cell_rect(&self, row: u32, column: u32) -> Rect {
        let GridGeometry {
            cell_width,
            cell_height,
            ..
        } = self.geometry;
        Rect::new(column * cell_width, row * cell_height, cell_width, cell_height)
    }

    /// Everything needed to outline and render piece `(row, column)`.
    #[must_use]
    pub fn piece_spec(&self, row: u32, column: u32) -> PieceSpec {
        PieceSpec {
            row,
            column,
            edges: self.pattern.piece_edges(row, column),
            width: self.geometry.cell_width,
            height: self.geometry.cell_height,
            tab_size: self.geometry.tab_size,
            margin: self.geometry.margin,
        }
    }

    /// Canvas-local outline of piece `(row, column)`.
    #[must_use]
    pub fn boundary(&self, row: u32, column: u32) -> PieceBoundary {
        boundary::build(
            &self.piece_spec(row, column),
            &self.config.edge_style,
            self.config.curve_steps,
        )
    }

    /// Every outline in source-image coordinates, row-major.
    #[must_use]
    pub fn outlines(&self) -> Vec<PieceBoundary> {
        let margin = f64::from(self.geometry.margin);
        self.cells()
            .map(|(row, column)| {
                let cell = self.cell_rect(row, column);
                self.boundary(row, column)
                    .translate(f64::from(cell.x) - margin, f64::from(cell.y) - margin)
            })
            .collect()
    }

    /// Render every piece from `source`.
    ///
    /// Cells are processed in parallel; the result is in row-major order.
    /// The first error aborts the run and no pieces are returned.
    ///
    /// # Errors
    ///
    /// - [`PuzzleError::OutOfBounds`] if `source` is smaller than the plan
    ///   expects.
    /// - [`PuzzleError::Cancelled`] if `cancel` fires before every cell has
    ///   started.
    pub fn render<S: ImageSource + Sync + ?Sized>(
        &self,
        source: &S,
        cancel: &CancelToken,
    ) -> Result<Vec<PieceArtifact>, PuzzleError> {
        let columns = self.config.columns as usize;

        let result = (0..self.piece_count())
            .into_par_iter()
            .map(|index| {
                if cancel.is_cancelled() {
                    return Err(PuzzleError::Cancelled);
                }
                #[allow(clippy::cast_possible_truncation)]
                let (row, column) = ((index / columns) as u32, (index % columns) as u32);
                self.render_piece(source, row, column)
            })
            .collect::<Result<Vec<_>, _>>();

        if matches!(result, Err(PuzzleError::Cancelled)) {
            tracing::warn!("puzzle generation cancelled");
        }
        result
    }

    /// Render the single piece at `(row, column)`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::OutOfBounds`] if the crop does not fit in
    /// `source`.
    pub fn render_piece<S: ImageSource + ?Sized>(
        &self,
        source: &S,
        row: u32,
        column: u32,
    ) -> Result<PieceArtifact, PuzzleError> {
        let spec = self.piece_spec(row, column);
        let outline = boundary::build(&spec, &self.config.edge_style, self.config.curve_steps);
        let (crop, paste_at) = self.crop_for(row, column);
        let artifact = raster::rasterize(
            &spec,
            &outline,
            source,
            crop,
            paste_at,
            self.config.mask_mode,
        )?;
        tracing::debug!(row, column, edges = ?spec.edges, "rendered piece");
        Ok(artifact)
    }

    /// Source crop for a cell and where it lands on the canvas.
    fn crop_for(&self, row: u32, column: u32) -> (Rect, (u32, u32)) {
        let cell = self.cell_rect(row, column);
        let margin = self.geometry.margin;
        if !self.config.bleed {
            return (cell, (margin, margin));
        }
        let left = cell.x.saturating_sub(margin);
        let top = cell.y.saturating_sub(margin);
        let right = (cell.x + cell.width).saturating_add(margin).min(self.dimensions.width);
        let bottom = (cell.y + cell.height).saturating_add(margin).min(self.dimensions.height);
        (
            Rect::new(left, top, right - left, bottom - top),
            (margin - (cell.x - left), margin - (cell.y - top)),
        )
    }

    fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.config.rows).flat_map(move |r| (0..self.config.columns).map(move |c| (r, c)))
    }
}

/// Cut `source` into pieces.
///
/// The configuration is validated before `source` is consulted at all.
///
/// # Errors
///
/// Any error from [`PuzzlePlan::new`] or [`PuzzlePlan::render`].
pub fn assemble<S: ImageSource + Sync + ?Sized>(
    source: &S,
    config: &PuzzleConfig,
) -> Result<Vec<PieceArtifact>, PuzzleError> {
    assemble_with_cancel(source, config, &CancelToken::new())
}

/// [`assemble`] with a cancellation token checked before each cell.
///
/// # Errors
///
/// Any error from [`PuzzlePlan::new`] or [`PuzzlePlan::render`].
pub fn assemble_with_cancel<S: ImageSource + Sync + ?Sized>(
    source: &S,
    config: &PuzzleConfig,
    cancel: &CancelToken,
) -> Result<Vec<PieceArtifact>, PuzzleError> {
    config.validate()?;
    let plan = PuzzlePlan::new(config, source.dimensions())?;
    plan.render(source, cancel)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::edge::{EdgeStyle, EdgeType};

    /// Image source that counts how often it is consulted.
    struct CountingSource {
        image: RgbaImage,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(image: RgbaImage) -> Self {
            Self {
                image,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ImageSource for CountingSource {
        fn dimensions(&self) -> Dimensions {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ImageSource::dimensions(&self.image)
        }

        fn crop(&self, rect: Rect) -> Result<RgbaImage, PuzzleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.image.crop(rect)
        }
    }

    /// Image source that cancels its token on the first crop.
    struct CancellingSource {
        image: RgbaImage,
        token: CancelToken,
    }

    impl ImageSource for CancellingSource {
        fn dimensions(&self) -> Dimensions {
            ImageSource::dimensions(&self.image)
        }

        fn crop(&self, rect: Rect) -> Result<RgbaImage, PuzzleError> {
            self.token.cancel();
            ImageSource::crop(&self.image, rect)
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    fn config(rows: u32, columns: u32, seed: u64) -> PuzzleConfig {
        PuzzleConfig {
            rows,
            columns,
            seed,
            ..PuzzleConfig::default()
        }
    }

    #[test]
    fn two_by_two_end_to_end() {
        let source = gradient(100, 100);
        let pieces = assemble(&source, &config(2, 2, 42)).unwrap();

        let positions: Vec<_> = pieces.iter().map(|p| (p.row, p.column)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        for piece in &pieces {
            assert_eq!(piece.canvas_dimensions(), Dimensions::new(100, 100));
            assert_eq!(piece.offset, (25, 25));
        }

        // Seed 42 puts a slot on the left of (0, 1), so (0, 0) has a tab.
        assert_eq!(pieces[0].edges.right, EdgeType::Outward);
        assert_eq!(pieces[1].edges.left, EdgeType::Inward);
        assert_eq!(pieces[0].edges.top, EdgeType::Flat);
        assert_eq!(pieces[3].edges.bottom, EdgeType::Flat);
    }

    #[test]
    fn neighbors_fill_each_others_gaps() {
        // Where (0, 0)'s tab reaches past its cell, (0, 1) has a hole in
        // the same source pixels, and the reverse.
        let source = gradient(100, 100);
        let pieces = assemble(&source, &config(2, 2, 42)).unwrap();
        let (left, right) = (&pieces[0].image, &pieces[1].image);
        // Source x in 50..100 is (0, 1)'s cell at canvas x 25..75, and
        // (0, 0)'s canvas x 75..125 (clipped to 100).
        let mut overlap = 0;
        // From row 35 down, (0, 1)'s bottom slot is filled by the piece
        // underneath instead.
        for sy in 0..35 {
            for sx in 50..75 {
                let in_left = left.get_pixel(sx + 25, sy + 25).0[3] == 255;
                let in_right = right.get_pixel(sx - 25, sy + 25).0[3] == 255;
                assert!(!(in_left && in_right), "source pixel ({sx}, {sy}) claimed twice");
                if in_left {
                    overlap += 1;
                }
                assert!(in_left || in_right, "source pixel ({sx}, {sy}) claimed by neither");
            }
        }
        assert!(overlap > 0);
    }

    #[test]
    fn same_seed_gives_byte_identical_pieces() {
        let source = gradient(120, 90);
        let cfg = PuzzleConfig {
            edge_style: EdgeStyle::Bezier,
            ..config(3, 4, 7)
        };
        let a = assemble(&source, &cfg).unwrap();
        let b = assemble(&source, &cfg).unwrap();
        assert_eq!(a.len(), 12);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.image.as_raw(), y.image.as_raw());
            assert_eq!(x.edges, y.edges);
        }
    }

    #[test]
    fn zero_rows_fails_before_touching_the_source() {
        let source = CountingSource::new(gradient(10, 10));
        let err = assemble(&source, &config(0, 2, 0)).unwrap_err();
        assert!(matches!(err, PuzzleError::InvalidConfig(_)));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn invalid_tab_fraction_fails_before_touching_the_source() {
        let source = CountingSource::new(gradient(10, 10));
        let cfg = PuzzleConfig {
            tab_fraction: 0.5,
            ..config(2, 2, 0)
        };
        assert!(assemble(&source, &cfg).is_err());
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn cells_smaller_than_a_pixel_are_rejected() {
        let err = PuzzlePlan::new(&config(11, 2, 0), Dimensions::new(10, 10)).unwrap_err();
        assert!(matches!(err, PuzzleError::InvalidConfig(_)));
    }

    #[test]
    fn strict_divisibility_rejects_remainders() {
        let strict = PuzzleConfig {
            strict_divisibility: true,
            ..config(3, 3, 0)
        };
        assert!(matches!(
            PuzzlePlan::new(&strict, Dimensions::new(100, 90)),
            Err(PuzzleError::InvalidConfig(_))
        ));
        assert!(PuzzlePlan::new(&strict, Dimensions::new(99, 90)).is_ok());
    }

    #[test]
    fn remainder_pixels_are_dropped() {
        let plan = PuzzlePlan::new(&config(3, 3, 0), Dimensions::new(100, 91)).unwrap();
        assert_eq!(plan.geometry().cell_width, 33);
        assert_eq!(plan.geometry().cell_height, 30);
        assert_eq!(plan.cell_rect(2, 2), Rect::new(66, 60, 33, 30));
    }

    #[test]
    fn oversized_tabs_are_a_geometry_error() {
        let cfg = PuzzleConfig {
            tab_fraction: 0.35,
            ..config(2, 2, 0)
        };
        let err = PuzzlePlan::new(&cfg, Dimensions::new(100, 100)).unwrap_err();
        match err {
            PuzzleError::Geometry { tab_size, limit } => {
                assert!((tab_size - 17.5).abs() < 1e-9);
                assert!((limit - 15.0).abs() < 1e-9);
            }
            other => panic!("expected geometry error, got {other:?}"),
        }
    }

    #[test]
    fn largest_simple_tab_is_accepted() {
        let cfg = PuzzleConfig {
            tab_fraction: PuzzleConfig::MAX_SIMPLE_TAB_FRACTION,
            ..config(2, 2, 0)
        };
        assert!(PuzzlePlan::new(&cfg, Dimensions::new(100, 100)).is_ok());
    }

    #[test]
    fn margin_is_half_the_smaller_cell_rounded_up() {
        let plan = PuzzlePlan::new(&config(2, 3, 0), Dimensions::new(93, 50)).unwrap();
        // Cells are 31x25.
        assert_eq!(plan.geometry().margin, 13);
        let piece = plan.piece_spec(0, 0);
        assert_eq!((piece.canvas_width(), piece.canvas_height()), (57, 51));
    }

    #[test]
    fn smaller_source_than_planned_is_out_of_bounds() {
        let plan = PuzzlePlan::new(&config(2, 2, 0), Dimensions::new(100, 100)).unwrap();
        let err = plan.render(&gradient(60, 100), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, PuzzleError::OutOfBounds { .. }));
    }

    #[test]
    fn cancelled_before_start_renders_nothing() {
        let source = CountingSource::new(gradient(50, 50));
        let token = CancelToken::new();
        token.cancel();
        let err = assemble_with_cancel(&source, &config(2, 2, 0), &token).unwrap_err();
        assert!(matches!(err, PuzzleError::Cancelled));
        // Only the dimensions query; no crops.
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn cancelling_mid_run_aborts() {
        let token = CancelToken::new();
        let source = CancellingSource {
            image: gradient(200, 200),
            token: token.clone(),
        };
        // Enough cells that some start after the first crop cancels.
        let err = assemble_with_cancel(&source, &config(20, 20, 0), &token).unwrap_err();
        assert!(matches!(err, PuzzleError::Cancelled));
    }

    #[test]
    fn outlines_are_in_source_coordinates() {
        let plan = PuzzlePlan::new(&config(2, 2, 42), Dimensions::new(100, 100)).unwrap();
        let outlines = plan.outlines();
        assert_eq!(outlines.len(), 4);
        // Each outline starts at its cell's top-left corner.
        let starts: Vec<_> = outlines.iter().map(|o| o.points()[0]).collect();
        assert_eq!(starts[0], crate::Point::new(0.0, 0.0));
        assert_eq!(starts[1], crate::Point::new(50.0, 0.0));
        assert_eq!(starts[2], crate::Point::new(0.0, 50.0));
        assert_eq!(starts[3], crate::Point::new(50.0, 50.0));
        for outline in &outlines {
            assert!(outline.is_closed());
        }
    }

    #[test]
    fn bleed_fills_tabs_from_the_neighbor() {
        let source = gradient(100, 100);
        let cfg = PuzzleConfig {
            bleed: true,
            ..config(2, 2, 42)
        };
        let pieces = assemble(&source, &cfg).unwrap();
        // (0, 0) has an outward tab on its right; canvas (80, 50) is source
        // (55, 25), inside the arc head.
        let pixel = pieces[0].image.get_pixel(80, 50);
        assert_eq!(pixel, &Rgba([55, 25, 80, 255]));
        // The cell itself is unchanged by bleeding.
        assert_eq!(pieces[0].image.get_pixel(25, 25), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn bleed_crop_is_clipped_to_the_source() {
        let cfg = PuzzleConfig {
            bleed: true,
            ..config(2, 2, 42)
        };
        let plan = PuzzlePlan::new(&cfg, Dimensions::new(100, 100)).unwrap();
        assert_eq!(plan.crop_for(0, 0), (Rect::new(0, 0, 75, 75), (25, 25)));
        assert_eq!(plan.crop_for(1, 1), (Rect::new(25, 25, 75, 75), (0, 0)));
    }

    #[test]
    fn single_piece_is_the_whole_image() {
        let source = gradient(40, 30);
        let pieces = assemble(&source, &config(1, 1, 3)).unwrap();
        assert_eq!(pieces.len(), 1);
        let piece = &pieces[0];
        assert_eq!(piece.offset, (15, 15));
        let opaque = piece.image.pixels().filter(|p| p.0[3] == 255).count();
        assert_eq!(opaque, 40 * 30);
    }
}
