//! Template renderer: draws a set of adjusted images onto a [`Surface`].
//!
//! [`render`] dispatches on the configured [`Template`]:
//!
//! - [`Template::Grid`]: uniform grid with per-cell mat, inner clip, image
//!   and border.
//! - [`Template::Overlap`]: stacked layers, each inset by a fixed offset
//!   from the previous one, with drop shadows under all but the top layer.
//! - [`Template::Background`]: the first image as a faded full-bleed
//!   backdrop, the rest as rounded cards laid out on a grid over it.
//!
//! Images whose source window cannot be resolved (zero width or height), or
//! whose cell leaves no room inside its padding, are skipped and reported;
//! the rest still draw.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use tracing::{debug, trace, warn};

use crate::adjust::{Adjustment, FitMode, resolve_source_rect};
use crate::config::MergeConfig;
use crate::geometry::{GridShape, LayoutMode, Rect, Size, cell_rect, grid_shape};
use crate::surface::{Shape, SourceImage, Surface};
use crate::template::{BackgroundStyle, DARK_BACKDROP, GridStyle, OverlapStyle, Template};

/// Inner image radius is this much smaller than a grid cell's radius.
const GRID_INNER_RADIUS_DELTA: f64 = 2.0;
/// Inner image radius is this much smaller than a background card's radius.
const CARD_INNER_RADIUS_DELTA: f64 = 4.0;

/// Caller-assigned identity of an image, stable across reordering and
/// removal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageId(pub u64);

/// An image to draw, in canvas order.
#[derive(Debug)]
pub struct InputImage<'a, I: ?Sized> {
    pub id: ImageId,
    pub image: &'a I,
}

impl<'a, I: ?Sized> InputImage<'a, I> {
    pub fn new(id: ImageId, image: &'a I) -> Self {
        Self { id, image }
    }
}

impl<I: ?Sized> Clone for InputImage<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized> Copy for InputImage<'_, I> {}

/// Per-image adjustments keyed by [`ImageId`].
///
/// Images without an entry use [`Adjustment::default`]. Removing an image
/// from the canvas only needs its own entry dropped; other entries are
/// unaffected because they are not keyed by position.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Adjustments {
    map: BTreeMap<ImageId, Adjustment>,
}

impl Adjustments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjustment for `id`, or the default when none is stored.
    pub fn get(&self, id: ImageId) -> Adjustment {
        self.map.get(&id).copied().unwrap_or_default()
    }

    /// Store `adjustment` for `id`, returning the previous entry.
    pub fn set(&mut self, id: ImageId, adjustment: Adjustment) -> Option<Adjustment> {
        self.map.insert(id, adjustment)
    }

    /// Modify the adjustment for `id` in place, starting from the default
    /// when absent.
    pub fn update(&mut self, id: ImageId, f: impl FnOnce(&mut Adjustment)) {
        f(self.map.entry(id).or_default());
    }

    pub fn remove(&mut self, id: ImageId) -> Option<Adjustment> {
        self.map.remove(&id)
    }

    /// Keep only entries whose id satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(ImageId) -> bool) {
        self.map.retain(|id, _| keep(*id));
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.map.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImageId, &Adjustment)> + '_ {
        self.map.iter().map(|(id, adj)| (*id, adj))
    }
}

impl FromIterator<(ImageId, Adjustment)> for Adjustments {
    fn from_iter<T: IntoIterator<Item = (ImageId, Adjustment)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Outcome of a [`render`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Images placed on the canvas.
    pub drawn: usize,
    /// Images left out because they have no drawable pixels or no room
    /// inside their cell.
    pub skipped: Vec<ImageId>,
}

/// Draw `images` onto `surface` according to `config`.
///
/// The canvas is `config.canvas_size()`; the surface is expected to be at
/// least that large. Rendering is deterministic: the same inputs always
/// issue the same sequence of surface operations. An empty `images` slice
/// draws nothing.
pub fn render<S: Surface>(
    surface: &mut S,
    images: &[InputImage<'_, S::Image>],
    config: &MergeConfig,
    adjustments: &Adjustments,
) -> RenderSummary {
    let mut summary = RenderSummary::default();
    if images.is_empty() {
        debug!("no images, nothing to render");
        return summary;
    }
    let canvas = config.canvas_size();
    if surface.size() != canvas {
        warn!(
            surface_width = surface.size().width,
            surface_height = surface.size().height,
            canvas_width = canvas.width,
            canvas_height = canvas.height,
            "surface size differs from configured canvas"
        );
    }
    let rounded_clip = surface.supports_rounded_clip();
    let mut ctx = RenderContext {
        surface,
        canvas,
        rounded_clip,
        default_fit: config.fit_mode,
        adjustments,
        summary: &mut summary,
    };

    match &config.template {
        Template::Grid(style) => {
            let shape = grid_shape(images.len() as u32, config.layout, config.cols_per_row);
            debug!(
                count = images.len(),
                cols = shape.cols,
                rows = shape.rows,
                width = canvas.width,
                height = canvas.height,
                "rendering grid template"
            );
            ctx.draw_grid(images, shape, style);
        }
        Template::Overlap(style) => {
            debug!(count = images.len(), offset = style.overlap_offset, "rendering overlap template");
            ctx.draw_overlap(images, style);
        }
        Template::Background(style) => {
            debug!(count = images.len(), "rendering background template");
            ctx.draw_background(images, config.layout, config.cols_per_row, style);
        }
    }
    summary
}

/// Live preview of a single adjusted image.
///
/// Fills the canvas with the dark backdrop, then stretches the resolved
/// visible window over the whole canvas. Fit mode is not applied. Returns
/// `false` when the image has no drawable pixels.
pub fn render_preview<S: Surface>(
    surface: &mut S,
    image: &S::Image,
    adjustment: &Adjustment,
    canvas: Size,
) -> bool {
    let canvas = canvas.clamp_to_canvas();
    let (w, h) = image.dimensions();
    let Some(src) = resolve_source_rect(w, h, adjustment) else {
        warn!(width = w, height = h, "preview image has no pixels");
        return false;
    };
    surface.fill_rect(canvas.to_rect(), DARK_BACKDROP);
    surface.draw_image(image, src, canvas.to_rect());
    true
}

struct RenderContext<'s, 'a, S: Surface> {
    surface: &'s mut S,
    canvas: Size,
    rounded_clip: bool,
    default_fit: FitMode,
    adjustments: &'a Adjustments,
    summary: &'a mut RenderSummary,
}

impl<S: Surface> RenderContext<'_, '_, S> {
    /// Resolve `input`'s source window and fit mode, recording a skip when
    /// the image has no pixels.
    fn resolve(&mut self, input: &InputImage<'_, S::Image>) -> Option<(Rect, FitMode)> {
        let (w, h) = input.image.dimensions();
        let adjustment = self.adjustments.get(input.id);
        match resolve_source_rect(w, h, &adjustment) {
            Some(src) => Some((src, adjustment.effective_fit(self.default_fit))),
            None => {
                warn!(id = input.id.0, width = w, height = h, "skipping image without pixels");
                self.summary.skipped.push(input.id);
                None
            }
        }
    }

    /// Rounded shape when the surface can clip to one, plain rect otherwise.
    fn clip_shape(&self, rect: Rect, radius: f64) -> Shape {
        if self.rounded_clip {
            Shape::rounded(rect, radius)
        } else {
            Shape::Rect(rect)
        }
    }

    fn draw_fitted(&mut self, image: &S::Image, src: Rect, dst: Rect, fit: FitMode) {
        let dst = match fit {
            FitMode::Fit => dst,
            FitMode::Fill => cover(src, dst),
        };
        trace!(
            src_x = src.x,
            src_y = src.y,
            src_w = src.width,
            src_h = src.height,
            dst_x = dst.x,
            dst_y = dst.y,
            dst_w = dst.width,
            dst_h = dst.height,
            "draw image"
        );
        self.surface.draw_image(image, src, dst);
        self.summary.drawn += 1;
    }

    /// Clip to `inner` (rounded by `radius`) and draw the image into it.
    fn draw_inner(&mut self, input: &InputImage<'_, S::Image>, src: Rect, fit: FitMode, inner: Rect, radius: f64) {
        if inner.is_empty() {
            debug!(id = input.id.0, "no room inside padding, skipping image");
            self.summary.skipped.push(input.id);
            return;
        }
        let clip = self.clip_shape(inner, radius.max(0.0));
        self.surface.save();
        self.surface.clip(clip);
        self.draw_fitted(input.image, src, inner, fit);
        self.surface.restore();
    }

    fn draw_grid(&mut self, images: &[InputImage<'_, S::Image>], shape: GridShape, style: &GridStyle) {
        let count = images.len() as u32;
        self.surface.fill_rect(self.canvas.to_rect(), style.background_color);

        let radius = f64::from(style.border_radius);
        let padding = f64::from(style.padding);
        let border = f64::from(style.border_width);
        for (i, input) in images.iter().enumerate() {
            let cell = cell_rect(i as u32, shape, count, self.canvas, style.gap);
            let Some((src, fit)) = self.resolve(input) else {
                continue;
            };

            let clip = self.clip_shape(cell, radius);
            self.surface.save();
            self.surface.clip(clip);
            if let Some(mat) = style.mat_color
                && style.padding > 0
            {
                self.surface.fill_rect(cell, mat);
            }
            let inner_radius = if style.border_radius > 0 {
                radius - GRID_INNER_RADIUS_DELTA
            } else {
                0.0
            };
            self.draw_inner(input, src, fit, cell.inset(padding), inner_radius);
            self.surface.restore();

            if style.border_width > 0 {
                let outline = if self.rounded_clip && style.border_radius > 0 {
                    Shape::rounded(cell, radius)
                } else {
                    Shape::Rect(cell.inset(border / 2.0))
                };
                self.surface.stroke(outline, border, style.border_color);
            }
        }
    }

    fn draw_overlap(&mut self, images: &[InputImage<'_, S::Image>], style: &OverlapStyle) {
        let canvas = self.canvas.to_rect();
        self.surface.fill_rect(canvas, style.background_color);

        let offset = f64::from(style.overlap_offset);
        let shadow = style.shadow();
        let last = images.len() - 1;
        for (i, input) in images.iter().enumerate() {
            let Some((src, fit)) = self.resolve(input) else {
                continue;
            };
            let inset = i as f64 * offset;
            let layer = Rect::new(
                inset,
                inset,
                (canvas.width - 2.0 * inset).max(1.0),
                (canvas.height - 2.0 * inset).max(1.0),
            );
            if let Some(shadow) = shadow
                && i < last
            {
                self.surface.draw_shadow(Shape::Rect(layer), shadow);
            }
            self.surface.save();
            self.surface.clip(Shape::Rect(layer));
            self.draw_fitted(input.image, src, layer, fit);
            self.surface.restore();
        }
    }

    fn draw_background(
        &mut self,
        images: &[InputImage<'_, S::Image>],
        layout: LayoutMode,
        cols_per_row: Option<u32>,
        style: &BackgroundStyle,
    ) {
        let canvas = self.canvas.to_rect();
        self.surface.fill_rect(canvas, style.backdrop_color);

        let Some((backdrop, cards)) = images.split_first() else {
            return;
        };
        let (w, h) = backdrop.image.dimensions();
        if w > 0 && h > 0 {
            // The backdrop always shows the whole image; adjustments apply
            // to cards only.
            let src = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
            self.surface.save();
            self.surface.set_alpha(style.background_opacity);
            self.draw_fitted(backdrop.image, src, canvas, FitMode::Fill);
            self.surface.restore();
        } else {
            warn!(id = backdrop.id.0, "skipping backdrop image without pixels");
            self.summary.skipped.push(backdrop.id);
        }
        if cards.is_empty() {
            return;
        }

        let count = cards.len() as u32;
        let shape = grid_shape(count, layout, cols_per_row);
        trace!(cols = shape.cols, rows = shape.rows, "background card grid");
        let radius = f64::from(style.overlay_radius);
        let padding = f64::from(style.overlay_padding);
        for (i, input) in cards.iter().enumerate() {
            let card = cell_rect(i as u32, shape, count, self.canvas, style.overlay_gap);
            let Some((src, fit)) = self.resolve(input) else {
                continue;
            };
            let outline = self.clip_shape(card, radius);
            self.surface.draw_shadow(outline, style.card_shadow);
            self.surface.save();
            self.surface.clip(outline);
            self.surface.fill_rect(card, style.card_color);
            let inner_radius = if style.overlay_radius > 0 {
                radius - CARD_INNER_RADIUS_DELTA
            } else {
                0.0
            };
            self.draw_inner(input, src, fit, card.inset(padding), inner_radius);
            self.surface.restore();
        }
    }
}

/// Scale `src` uniformly to cover `dst`, centered on it.
fn cover(src: Rect, dst: Rect) -> Rect {
    let scale = (dst.width / src.width).max(dst.height / src.height);
    let w = src.width * scale;
    let h = src.height * scale;
    Rect::new(dst.x + (dst.width - w) / 2.0, dst.y + (dst.height - h) / 2.0, w, h)
}
