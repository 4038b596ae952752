//! Drawing backend abstraction.
//!
//! The renderer issues a small, fixed set of operations against a
//! [`Surface`]: save/restore of clip and alpha state, clipping to a rect or
//! rounded rect, solid fills, strokes, drop shadows and scaled image blits.
//! `RasterSurface` (feature `raster`) implements them on an RGBA pixel
//! buffer, `svg::SvgSurface` (feature `svg`) records them as SVG.

use crate::color::Color;
use crate::geometry::{Rect, Size};

/// A decoded image the renderer can measure and hand to a surface.
pub trait SourceImage {
    /// Natural `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);
}

impl<T: SourceImage + ?Sized> SourceImage for &T {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }
}

/// Outline used for clips, strokes and shadows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Rect(Rect),
    /// Rect with circular corners. The radius is clamped to half the
    /// shorter side when drawn.
    RoundedRect { rect: Rect, radius: f64 },
}

impl Shape {
    /// Rounded rect, or a plain rect when `radius <= 0`.
    pub fn rounded(rect: Rect, radius: f64) -> Self {
        if radius > 0.0 {
            Self::RoundedRect { rect, radius }
        } else {
            Self::Rect(rect)
        }
    }

    /// Bounding box.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Rect(rect) | Self::RoundedRect { rect, .. } => rect,
        }
    }

    /// Corner radius actually used: 0 for plain rects, otherwise clamped
    /// into `0..=min(width, height) / 2`.
    pub fn radius(&self) -> f64 {
        match *self {
            Self::Rect(_) => 0.0,
            Self::RoundedRect { rect, radius } => {
                let max = (rect.width.min(rect.height) * 0.5).max(0.0);
                radius.clamp(0.0, max)
            }
        }
    }

    /// Same shape moved by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        match self {
            Self::Rect(rect) => Self::Rect(rect.translate(dx, dy)),
            Self::RoundedRect { rect, radius } => Self::RoundedRect {
                rect: rect.translate(dx, dy),
                radius,
            },
        }
    }
}

/// Blurred, offset silhouette drawn beneath a shape.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Shadow {
    pub color: Color,
    /// Blur radius in pixels.
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// A 2D canvas the renderer draws onto.
///
/// Clip and alpha state nest: [`save`](Surface::save) pushes the current
/// state and [`restore`](Surface::restore) pops it. Clips intersect with
/// whatever is already in effect.
pub trait Surface {
    /// Image type this surface can blit.
    type Image: SourceImage + ?Sized;

    /// Canvas dimensions.
    fn size(&self) -> Size;

    /// Whether rounded clips are available. When `false` the renderer
    /// clips to the bounding rectangle instead.
    fn supports_rounded_clip(&self) -> bool {
        true
    }

    fn save(&mut self);
    fn restore(&mut self);

    /// Intersect the clip region with `shape`.
    fn clip(&mut self, shape: Shape);

    /// Opacity (`0.0..=1.0`) applied to subsequent drawing until restore.
    fn set_alpha(&mut self, alpha: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Scale the `src` window of `image` (natural pixel coordinates) into
    /// `dst` (canvas coordinates).
    fn draw_image(&mut self, image: &Self::Image, src: Rect, dst: Rect);

    /// Stroke the outline of `shape`, centered on its edge.
    fn stroke(&mut self, shape: Shape, width: f64, color: Color);

    /// Draw the blurred, offset silhouette of `shape` under the current
    /// clip and alpha.
    fn draw_shadow(&mut self, shape: Shape, shadow: Shadow);
}
