//! Grid geometry for multi-image canvases.
//!
//! Decides how many columns and rows a set of images gets, and where each
//! cell sits on the output canvas. Pure geometry: no pixel operations, no
//! allocations, `no_std` compatible.
//!
//! # Example
//!
//! ```
//! use zencompose::{GridShape, LayoutMode, Size, cell_rect, grid_shape};
//!
//! let shape = grid_shape(5, LayoutMode::Auto, None);
//! assert_eq!(shape, GridShape::new(3, 2));
//!
//! // The last row holds two images, so its cells widen to fill the row.
//! let cell = cell_rect(4, shape, 5, Size::new(1200, 600), 0);
//! assert_eq!((cell.x, cell.y, cell.width, cell.height), (600.0, 300.0, 600.0, 300.0));
//! ```

use num_traits::Float;

/// Largest width or height an output canvas may have, in pixels.
pub const MAX_CANVAS_DIMENSION: u32 = 16384;

/// How images are arranged into rows and columns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LayoutMode {
    /// Pick a pleasant shape from the image count.
    #[default]
    Auto,
    /// Everything in one row.
    Horizontal,
    /// Everything in one column.
    Vertical,
    /// Near-square grid, `ceil(sqrt(count))` columns.
    Grid,
}

impl LayoutMode {
    /// Parse a layout name (case-insensitive). Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        [
            ("auto", Self::Auto),
            ("horizontal", Self::Horizontal),
            ("vertical", Self::Vertical),
            ("grid", Self::Grid),
        ]
        .into_iter()
        .find(|(name, _)| s.eq_ignore_ascii_case(name))
        .map(|(_, mode)| mode)
    }
}

/// Column and row count of a cell grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub cols: u32,
    pub rows: u32,
}

impl GridShape {
    /// Create a new grid shape.
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// Number of cells the grid can hold.
    pub const fn capacity(&self) -> u32 {
        self.cols.saturating_mul(self.rows)
    }

    /// Number of images placed in `row` when `count` images fill the grid
    /// row-major. Only the last row can be short.
    pub fn cells_in_row(&self, row: u32, count: u32) -> u32 {
        let cols = self.cols.max(1);
        if row + 1 >= self.rows {
            count.saturating_sub(row.saturating_mul(cols)).clamp(1, cols)
        } else {
            cols
        }
    }
}

/// Width × height dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions into `1..=MAX_CANVAS_DIMENSION`.
    pub fn clamp_to_canvas(self) -> Self {
        Self {
            width: self.width.clamp(1, MAX_CANVAS_DIMENSION),
            height: self.height.clamp(1, MAX_CANVAS_DIMENSION),
        }
    }

    /// The whole canvas as a rectangle at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Axis-aligned rectangle in canvas or source coordinates.
///
/// Coordinates are fractional: cells in a grid with gaps rarely land on
/// whole pixels, and source windows are fractions of natural image size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink by `amount` on every side. Negative amounts grow the rect.
    pub fn inset(self, amount: f64) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: self.width - 2.0 * amount,
            height: self.height - 2.0 * amount,
        }
    }

    /// Move by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// All four components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// No area (or non-finite).
    pub fn is_empty(&self) -> bool {
        !self.is_finite() || self.width <= 0.0 || self.height <= 0.0
    }

    /// Whole-pixel span covered by this rect, clipped to `bounds`.
    ///
    /// Partially covered edge pixels are included. Returns `None` when the
    /// rect is empty or lies entirely outside `bounds`.
    pub fn pixel_bounds(&self, bounds: Size) -> Option<PixelBounds> {
        if self.is_empty() {
            return None;
        }
        let max_x = f64::from(bounds.width);
        let max_y = f64::from(bounds.height);
        let x0 = Float::floor(self.x).clamp(0.0, max_x);
        let y0 = Float::floor(self.y).clamp(0.0, max_y);
        let x1 = Float::ceil(self.right()).clamp(0.0, max_x);
        let y1 = Float::ceil(self.bottom()).clamp(0.0, max_y);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelBounds {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

/// Half-open pixel span `[x0, x1) × [y0, y1)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelBounds {
    /// Overlap of two spans, `None` if they are disjoint.
    pub fn intersect(&self, other: &PixelBounds) -> Option<PixelBounds> {
        let r = PixelBounds {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (r.x1 > r.x0 && r.y1 > r.y0).then_some(r)
    }

    /// Span width in pixels.
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Span height in pixels.
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Compute the column and row count for `count` images.
///
/// `cols_per_row` overrides the derived column count for [`LayoutMode::Auto`]
/// and [`LayoutMode::Grid`]; horizontal and vertical layouts ignore it.
/// A `cols_per_row` of zero is treated as one column.
///
/// For every `count ≥ 1` the result satisfies `cols * rows ≥ count` and
/// `cols * (rows - 1) < count`. Zero images yield a `0 × 0` shape.
pub fn grid_shape(count: u32, layout: LayoutMode, cols_per_row: Option<u32>) -> GridShape {
    if count == 0 {
        return GridShape::new(0, 0);
    }
    match layout {
        LayoutMode::Horizontal => return GridShape::new(count, 1),
        LayoutMode::Vertical => return GridShape::new(1, count),
        LayoutMode::Auto | LayoutMode::Grid => {}
    }
    if let Some(cpr) = cols_per_row {
        let cols = cpr.max(1).min(count);
        return GridShape::new(cols, count.div_ceil(cols));
    }
    match (layout, count) {
        (LayoutMode::Auto, 1..=3) => GridShape::new(count, 1),
        (LayoutMode::Auto, 4) => GridShape::new(2, 2),
        (LayoutMode::Auto, 5..=6) => GridShape::new(3, 2),
        _ => {
            let cols = ceil_sqrt(count);
            GridShape::new(cols, count.div_ceil(cols))
        }
    }
}

/// Bounding box of cell `index` in a row-major grid.
///
/// Row height is uniform across the grid. Each row's cell width is computed
/// from the number of images actually in that row, so a short last row
/// stretches to the full canvas width instead of leaving trailing space.
pub fn cell_rect(index: u32, shape: GridShape, count: u32, canvas: Size, gap: u32) -> Rect {
    let cols = shape.cols.max(1);
    let rows = shape.rows.max(1);
    let gap = f64::from(gap);
    let row = index / cols;
    let col = index % cols;
    let in_row = f64::from(shape.cells_in_row(row, count));

    let cell_w = (f64::from(canvas.width) - gap * (in_row - 1.0)) / in_row;
    let cell_h = (f64::from(canvas.height) - gap * f64::from(rows - 1)) / f64::from(rows);
    Rect::new(
        f64::from(col) * (cell_w + gap),
        f64::from(row) * (cell_h + gap),
        cell_w,
        cell_h,
    )
}

/// Smallest `c` with `c * c >= n`.
fn ceil_sqrt(n: u32) -> u32 {
    let n = u64::from(n);
    let mut c = Float::sqrt(n as f64) as u64;
    while c * c < n {
        c += 1;
    }
    while c > 0 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUTS: [LayoutMode; 4] = [
        LayoutMode::Auto,
        LayoutMode::Horizontal,
        LayoutMode::Vertical,
        LayoutMode::Grid,
    ];

    // ── grid_shape ──────────────────────────────────────────────────────

    #[test]
    fn auto_shapes() {
        assert_eq!(grid_shape(1, LayoutMode::Auto, None), GridShape::new(1, 1));
        assert_eq!(grid_shape(2, LayoutMode::Auto, None), GridShape::new(2, 1));
        assert_eq!(grid_shape(3, LayoutMode::Auto, None), GridShape::new(3, 1));
        assert_eq!(grid_shape(4, LayoutMode::Auto, None), GridShape::new(2, 2));
        assert_eq!(grid_shape(5, LayoutMode::Auto, None), GridShape::new(3, 2));
        assert_eq!(grid_shape(6, LayoutMode::Auto, None), GridShape::new(3, 2));
        assert_eq!(grid_shape(7, LayoutMode::Auto, None), GridShape::new(3, 3));
        assert_eq!(grid_shape(10, LayoutMode::Auto, None), GridShape::new(4, 3));
    }

    #[test]
    fn grid_without_cols_is_near_square() {
        assert_eq!(grid_shape(6, LayoutMode::Grid, None), GridShape::new(3, 2));
        assert_eq!(grid_shape(3, LayoutMode::Grid, None), GridShape::new(2, 2));
        assert_eq!(grid_shape(9, LayoutMode::Grid, None), GridShape::new(3, 3));
        assert_eq!(grid_shape(20, LayoutMode::Grid, None), GridShape::new(5, 4));
    }

    #[test]
    fn cols_per_row_overrides_auto_and_grid() {
        assert_eq!(grid_shape(5, LayoutMode::Auto, Some(4)), GridShape::new(4, 2));
        assert_eq!(grid_shape(5, LayoutMode::Grid, Some(2)), GridShape::new(2, 3));
        // More columns than images collapses to one row.
        assert_eq!(grid_shape(3, LayoutMode::Grid, Some(8)), GridShape::new(3, 1));
    }

    #[test]
    fn cols_per_row_ignored_for_linear_layouts() {
        assert_eq!(grid_shape(5, LayoutMode::Horizontal, Some(2)), GridShape::new(5, 1));
        assert_eq!(grid_shape(5, LayoutMode::Vertical, Some(2)), GridShape::new(1, 5));
    }

    #[test]
    fn zero_cols_per_row_means_one_column() {
        assert_eq!(grid_shape(4, LayoutMode::Grid, Some(0)), GridShape::new(1, 4));
    }

    #[test]
    fn zero_images_is_empty_shape() {
        for layout in LAYOUTS {
            assert_eq!(grid_shape(0, layout, None), GridShape::new(0, 0));
        }
    }

    #[test]
    fn shape_never_has_empty_trailing_row() {
        for layout in LAYOUTS {
            for cpr in [None, Some(1), Some(2), Some(3), Some(4), Some(7)] {
                for count in 1..=64 {
                    let s = grid_shape(count, layout, cpr);
                    assert!(
                        s.capacity() >= count,
                        "{layout:?} {cpr:?} {count}: {s:?} too small"
                    );
                    assert!(
                        s.cols * (s.rows - 1) < count,
                        "{layout:?} {cpr:?} {count}: {s:?} has an empty row"
                    );
                }
            }
        }
    }

    #[test]
    fn ceil_sqrt_exact_and_between_squares() {
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(4), 2);
        assert_eq!(ceil_sqrt(5), 3);
        assert_eq!(ceil_sqrt(16), 4);
        assert_eq!(ceil_sqrt(17), 5);
        assert_eq!(ceil_sqrt(u32::MAX), 65536);
    }

    #[test]
    fn layout_mode_parse() {
        assert_eq!(LayoutMode::parse("GRID"), Some(LayoutMode::Grid));
        assert_eq!(LayoutMode::parse(" horizontal "), Some(LayoutMode::Horizontal));
        assert_eq!(LayoutMode::parse("diagonal"), None);
    }

    // ── cell_rect ───────────────────────────────────────────────────────

    #[test]
    fn full_rows_split_evenly() {
        let shape = GridShape::new(2, 2);
        let canvas = Size::new(1000, 800);
        assert_eq!(cell_rect(0, shape, 4, canvas, 0), Rect::new(0.0, 0.0, 500.0, 400.0));
        assert_eq!(cell_rect(3, shape, 4, canvas, 0), Rect::new(500.0, 400.0, 500.0, 400.0));
    }

    #[test]
    fn gaps_separate_cells() {
        let shape = GridShape::new(2, 2);
        let canvas = Size::new(1010, 810);
        let a = cell_rect(0, shape, 4, canvas, 10);
        let b = cell_rect(1, shape, 4, canvas, 10);
        let c = cell_rect(2, shape, 4, canvas, 10);
        assert_eq!(a, Rect::new(0.0, 0.0, 500.0, 400.0));
        assert_eq!(b.x, 510.0);
        assert_eq!(c.y, 410.0);
        assert_eq!(b.right(), 1010.0);
    }

    #[test]
    fn last_row_widens_to_fill() {
        // 7 images in 3×3: last row holds one image spanning the full width.
        let shape = grid_shape(7, LayoutMode::Auto, None);
        let canvas = Size::new(900, 900);
        let last = cell_rect(6, shape, 7, canvas, 0);
        assert_eq!(last, Rect::new(0.0, 600.0, 900.0, 300.0));

        // 5 images in 3×2 with a gap: last row is two cells.
        let shape = GridShape::new(3, 2);
        let r3 = cell_rect(3, shape, 5, Size::new(1210, 610), 10);
        let r4 = cell_rect(4, shape, 5, Size::new(1210, 610), 10);
        assert_eq!(r3.width, 600.0);
        assert_eq!(r4.x, 610.0);
        assert_eq!(r4.right(), 1210.0);
        assert_eq!(r3.height, 300.0);
    }

    #[test]
    fn single_cell_covers_canvas() {
        let shape = grid_shape(1, LayoutMode::Auto, None);
        let r = cell_rect(0, shape, 1, Size::new(640, 480), 12);
        assert_eq!(r, Rect::new(0.0, 0.0, 640.0, 480.0));
    }

    // ── Rect / Size ─────────────────────────────────────────────────────

    #[test]
    fn canvas_size_is_clamped() {
        assert_eq!(Size::new(0, 20000).clamp_to_canvas(), Size::new(1, MAX_CANVAS_DIMENSION));
    }

    #[test]
    fn pixel_bounds_include_partial_edges() {
        let r = Rect::new(1.5, 2.25, 3.0, 1.0);
        assert_eq!(
            r.pixel_bounds(Size::new(100, 100)),
            Some(PixelBounds { x0: 1, y0: 2, x1: 5, y1: 4 })
        );
    }

    #[test]
    fn pixel_bounds_clip_and_reject() {
        let canvas = Size::new(10, 10);
        let r = Rect::new(-5.0, 8.0, 10.0, 10.0);
        assert_eq!(r.pixel_bounds(canvas), Some(PixelBounds { x0: 0, y0: 8, x1: 5, y1: 10 }));
        assert_eq!(Rect::new(20.0, 0.0, 5.0, 5.0).pixel_bounds(canvas), None);
        assert_eq!(Rect::new(0.0, 0.0, f64::NAN, 5.0).pixel_bounds(canvas), None);
        assert_eq!(Rect::new(0.0, 0.0, 4.0, 4.0).inset(3.0).pixel_bounds(canvas), None);
    }
}
