//! Pixel backend on [`image::RgbaImage`], plus decode and export helpers.
//!
//! Drawing is source-over with straight alpha. Clips are kept as a stack of
//! shapes and evaluated per pixel with analytic anti-aliasing, so nested
//! rounded clips cost no extra buffers. Images are sampled bilinearly;
//! large downscales are pre-filtered with [`imageops::resize`].

use std::path::{Path, PathBuf};

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma, Rgba, RgbImage, RgbaImage};
use tracing::{debug, trace};

use crate::color::Color;
use crate::config::MergeConfig;
use crate::error::ComposeError;
use crate::geometry::{PixelBounds, Rect, Size};
use crate::render::{Adjustments, InputImage, RenderSummary, render};
use crate::surface::{Shadow, Shape, SourceImage, Surface};

/// JPEG export quality.
pub const JPEG_QUALITY: u8 = 92;

/// Downscales steeper than this are pre-filtered before bilinear sampling.
const PREFILTER_BELOW: f64 = 0.5;

impl SourceImage for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

#[derive(Clone, Debug)]
struct State {
    clips: Vec<Shape>,
    alpha: f32,
}

/// A [`Surface`] that rasterizes into an RGBA8 buffer.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    canvas: RgbaImage,
    state: State,
    saved: Vec<State>,
}

impl RasterSurface {
    /// Transparent canvas of `size`.
    pub fn new(size: Size) -> Self {
        Self::from_image(RgbaImage::new(size.width, size.height))
    }

    /// Draw on top of an existing buffer.
    pub fn from_image(canvas: RgbaImage) -> Self {
        Self {
            canvas,
            state: State {
                clips: Vec::new(),
                alpha: 1.0,
            },
            saved: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    /// Pixels `rect` may touch, limited to the canvas and the clip bounds.
    fn region(&self, rect: Rect) -> Option<PixelBounds> {
        let size = Size::new(self.canvas.width(), self.canvas.height());
        let mut bounds = rect.pixel_bounds(size)?;
        for clip in &self.state.clips {
            bounds = bounds.intersect(&clip.bounds().pixel_bounds(size)?)?;
        }
        Some(bounds)
    }

    /// Combined clip coverage of pixel `(px, py)`.
    fn clip_coverage(&self, px: u32, py: u32) -> f32 {
        let (x, y) = (f64::from(px), f64::from(py));
        self.state
            .clips
            .iter()
            .map(|clip| coverage(clip, x, y))
            .product()
    }

    /// Composite `color` over the pixels in `bounds`, weighted by
    /// `shape_coverage` and the current clip and alpha.
    fn paint(&mut self, bounds: PixelBounds, color: Color, shape_coverage: impl Fn(u32, u32) -> f32) {
        let alpha = self.state.alpha * color.opacity();
        if alpha <= 0.0 {
            return;
        }
        let src = [f32::from(color.r), f32::from(color.g), f32::from(color.b), 1.0];
        for py in bounds.y0..bounds.y1 {
            for px in bounds.x0..bounds.x1 {
                let cov = shape_coverage(px, py);
                if cov <= 0.0 {
                    continue;
                }
                let cov = cov * self.clip_coverage(px, py) * alpha;
                blend(self.canvas.get_pixel_mut(px, py), src, cov);
            }
        }
    }
}

impl Surface for RasterSurface {
    type Image = RgbaImage;

    fn size(&self) -> Size {
        Size::new(self.canvas.width(), self.canvas.height())
    }

    fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn clip(&mut self, shape: Shape) {
        self.state.clips.push(shape);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(bounds) = self.region(rect) else {
            return;
        };
        let shape = Shape::Rect(rect);
        self.paint(bounds, color, |px, py| {
            coverage(&shape, f64::from(px), f64::from(py))
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, src: Rect, dst: Rect) {
        if src.is_empty() || image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(bounds) = self.region(dst) else {
            return;
        };
        let prefiltered = prefilter(image, src, dst);
        let (source, src) = match &prefiltered {
            Some((small, small_src)) => (small, *small_src),
            None => (image, src),
        };

        let kx = src.width / dst.width;
        let ky = src.height / dst.height;
        let dst_shape = Shape::Rect(dst);
        let alpha = self.state.alpha;
        for py in bounds.y0..bounds.y1 {
            for px in bounds.x0..bounds.x1 {
                let (x, y) = (f64::from(px), f64::from(py));
                let cov = coverage(&dst_shape, x, y);
                if cov <= 0.0 {
                    continue;
                }
                let sx = clamp_to_centers(src.x + (x + 0.5 - dst.x) * kx, src.x, src.width);
                let sy = clamp_to_centers(src.y + (y + 0.5 - dst.y) * ky, src.y, src.height);
                let texel = sample_bilinear(source, sx, sy);
                let cov = cov * self.clip_coverage(px, py) * alpha;
                blend(self.canvas.get_pixel_mut(px, py), texel, cov);
            }
        }
    }

    fn stroke(&mut self, shape: Shape, width: f64, color: Color) {
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let half = width / 2.0;
        let outer = grow(shape, half);
        let inner = grow(shape, -half);
        let Some(bounds) = self.region(outer.bounds()) else {
            return;
        };
        self.paint(bounds, color, |px, py| {
            let (x, y) = (f64::from(px), f64::from(py));
            (coverage(&outer, x, y) - coverage(&inner, x, y)).max(0.0)
        });
    }

    fn draw_shadow(&mut self, shape: Shape, shadow: Shadow) {
        if shadow.color.is_transparent() {
            return;
        }
        let shape = shape.translate(shadow.offset_x, shadow.offset_y);
        let b = shape.bounds();
        if b.is_empty() {
            return;
        }
        let sigma = if shadow.blur.is_finite() { (shadow.blur / 2.0).max(0.0) } else { 0.0 };
        let pad = (sigma * 3.0).ceil();
        let origin_x = b.x.floor() - pad;
        let origin_y = b.y.floor() - pad;
        let extent = Rect::new(
            origin_x,
            origin_y,
            b.right().ceil() + pad - origin_x,
            b.bottom().ceil() + pad - origin_y,
        );
        let Some(bounds) = self.region(extent) else {
            return;
        };

        // Only pixels within `pad` of the painted region can blur into it.
        let origin_x = origin_x.max(f64::from(bounds.x0) - pad);
        let origin_y = origin_y.max(f64::from(bounds.y0) - pad);
        let mask_w = extent.right().min(f64::from(bounds.x1) + pad) - origin_x;
        let mask_h = extent.bottom().min(f64::from(bounds.y1) + pad) - origin_y;
        let mut mask = GrayImage::new(mask_w as u32, mask_h as u32);
        for (mx, my, p) in mask.enumerate_pixels_mut() {
            let cov = coverage(&shape, origin_x + f64::from(mx), origin_y + f64::from(my));
            *p = Luma([(cov * 255.0 + 0.5) as u8]);
        }
        let mask = if sigma > 0.0 {
            imageops::blur(&mask, sigma as f32)
        } else {
            mask
        };
        trace!(sigma, width = mask.width(), height = mask.height(), "shadow mask");

        self.paint(bounds, shadow.color, |px, py| {
            let mx = (f64::from(px) - origin_x) as u32;
            let my = (f64::from(py) - origin_y) as u32;
            mask.get_pixel_checked(mx, my)
                .map_or(0.0, |p| f32::from(p.0[0]) / 255.0)
        });
    }
}

/// Fraction of pixel `[x, x+1) × [y, y+1)` covered by `shape`.
///
/// Exact area for plain rects. Rounded corners use the distance from the
/// pixel center to the corner arc.
fn coverage(shape: &Shape, x: f64, y: f64) -> f32 {
    let r = shape.bounds();
    if r.is_empty() {
        return 0.0;
    }
    let cx = ((x + 1.0).min(r.right()) - x.max(r.x)).clamp(0.0, 1.0);
    let cy = ((y + 1.0).min(r.bottom()) - y.max(r.y)).clamp(0.0, 1.0);
    let area = cx * cy;
    let radius = shape.radius();
    if area <= 0.0 || radius <= 0.0 {
        return area as f32;
    }
    let (px, py) = (x + 0.5, y + 0.5);
    let qx = px.clamp(r.x + radius, r.right() - radius);
    let qy = py.clamp(r.y + radius, r.bottom() - radius);
    if qx == px || qy == py {
        return area as f32;
    }
    let dist = (px - qx).hypot(py - qy) - radius;
    area.min((0.5 - dist).clamp(0.0, 1.0)) as f32
}

/// Expand (or with negative `by`, shrink) a shape around its outline.
fn grow(shape: Shape, by: f64) -> Shape {
    match shape {
        Shape::Rect(rect) => Shape::Rect(rect.inset(-by)),
        Shape::RoundedRect { .. } => {
            let radius = shape.radius();
            Shape::RoundedRect {
                rect: shape.bounds().inset(-by),
                radius: (radius + by).max(0.0),
            }
        }
    }
}

/// Source-over `src` (straight RGB in `0..=255`, alpha in `0..=1`) onto
/// `dst` with extra weight `coverage`.
fn blend(dst: &mut Rgba<u8>, src: [f32; 4], coverage: f32) {
    let sa = (src[3] * coverage).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let keep = da * (1.0 - sa);
    for c in 0..3 {
        let v = (src[c] * sa + f32::from(dst[c]) * keep) / out_a;
        dst[c] = (v + 0.5).clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
}

/// Keep a sample position between the first and last pixel centers of the
/// span `start..start + len`, so neighbours outside the window do not bleed in.
fn clamp_to_centers(v: f64, start: f64, len: f64) -> f64 {
    if len >= 1.0 {
        v.clamp(start + 0.5, start + len - 0.5)
    } else {
        start + len / 2.0
    }
}

/// Bilinear sample at `(x, y)` in pixel-space coordinates (pixel centers at
/// `+0.5`), interpolated in premultiplied space.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> [f32; 4] {
    let max_x = i64::from(image.width()) - 1;
    let max_y = i64::from(image.height()) - 1;
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f32; 4];
    for (dx, dy, w) in [
        (0, 0, (1.0 - tx) * (1.0 - ty)),
        (1, 0, tx * (1.0 - ty)),
        (0, 1, (1.0 - tx) * ty),
        (1, 1, tx * ty),
    ] {
        if w <= 0.0 {
            continue;
        }
        let sx = (x0 + dx).clamp(0, max_x) as u32;
        let sy = (y0 + dy).clamp(0, max_y) as u32;
        let p = image.get_pixel(sx, sy);
        let a = f32::from(p[3]) / 255.0 * w;
        acc[0] += f32::from(p[0]) * a;
        acc[1] += f32::from(p[1]) * a;
        acc[2] += f32::from(p[2]) * a;
        acc[3] += a;
    }
    if acc[3] <= 0.0 {
        return [0.0; 4];
    }
    [acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3]]
}

/// For steep downscales, resize the covered part of `image` close to the
/// destination size and return it with `src` mapped into its coordinates.
fn prefilter(image: &RgbaImage, src: Rect, dst: Rect) -> Option<(RgbaImage, Rect)> {
    let scale_x = dst.width / src.width;
    let scale_y = dst.height / src.height;
    if scale_x >= PREFILTER_BELOW && scale_y >= PREFILTER_BELOW {
        return None;
    }
    let x0 = src.x.floor().max(0.0) as u32;
    let y0 = src.y.floor().max(0.0) as u32;
    let x1 = (src.right().ceil() as u32).min(image.width());
    let y1 = (src.bottom().ceil() as u32).min(image.height());
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    let (rw, rh) = (x1 - x0, y1 - y0);
    let tw = ((f64::from(rw) * scale_x.min(1.0)).ceil() as u32).clamp(1, rw);
    let th = ((f64::from(rh) * scale_y.min(1.0)).ceil() as u32).clamp(1, rh);
    debug!(from_w = rw, from_h = rh, to_w = tw, to_h = th, "pre-filtering downscale");

    let region = imageops::crop_imm(image, x0, y0, rw, rh).to_image();
    let small = imageops::resize(&region, tw, th, FilterType::Triangle);
    let kx = f64::from(tw) / f64::from(rw);
    let ky = f64::from(th) / f64::from(rh);
    let mapped = Rect::new(
        (src.x - f64::from(x0)) * kx,
        (src.y - f64::from(y0)) * ky,
        src.width * kx,
        src.height * ky,
    );
    Some((small, mapped))
}

/// Render `images` into a fresh canvas of `config.canvas_size()`.
pub fn render_to_image(
    images: &[InputImage<'_, RgbaImage>],
    config: &MergeConfig,
    adjustments: &Adjustments,
) -> (RgbaImage, RenderSummary) {
    let mut surface = RasterSurface::new(config.canvas_size());
    let summary = render(&mut surface, images, config, adjustments);
    (surface.into_image(), summary)
}

/// Decode every file in `paths` to RGBA8.
///
/// All-or-nothing: the first failure aborts the batch.
pub fn load_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RgbaImage>, ComposeError> {
    MergeConfig::check_image_count(paths.len())?;
    paths
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let path = path.as_ref();
            debug!(index, path = %path.display(), "loading image");
            image::open(path)
                .map(|img| img.to_rgba8())
                .map_err(|source| ComposeError::ImageLoad { index, source })
        })
        .collect()
}

/// Decode every in-memory encoded image to RGBA8.
///
/// All-or-nothing: the first failure aborts the batch.
pub fn decode_images<B: AsRef<[u8]>>(inputs: &[B]) -> Result<Vec<RgbaImage>, ComposeError> {
    MergeConfig::check_image_count(inputs.len())?;
    inputs
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            image::load_from_memory(bytes.as_ref())
                .map(|img| img.to_rgba8())
                .map_err(|source| ComposeError::ImageLoad { index, source })
        })
        .collect()
}

/// Export format for a merged canvas.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OutputFormat {
    #[default]
    Png,
    /// Quality [`JPEG_QUALITY`]; alpha is dropped.
    Jpeg,
}

impl OutputFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Parse `png`, `jpg` or `jpeg` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else if s.eq_ignore_ascii_case("jpg") || s.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        }
    }
}

/// Download name for a merged canvas: `merged-{w}x{h}.{ext}`.
pub fn output_file_name(width: u32, height: u32, format: OutputFormat) -> String {
    format!("merged-{width}x{height}.{}", format.extension())
}

/// Encode `canvas` in `format`.
pub fn encode(canvas: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, ComposeError> {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return Err(ComposeError::InvalidGeometry("cannot encode an empty canvas"));
    }
    let mut out = Vec::new();
    let result = match format {
        OutputFormat::Png => {
            PngEncoder::new(&mut out).write_image(canvas.as_raw(), w, h, ExtendedColorType::Rgba8)
        }
        OutputFormat::Jpeg => {
            let rgb: RgbImage = canvas.convert();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            )
        }
    };
    result.map_err(|source| ComposeError::Encode {
        format: format.name(),
        source,
    })?;
    debug!(format = format.name(), width = w, height = h, bytes = out.len(), "encoded canvas");
    Ok(out)
}

/// Encode `canvas` and write it into `dir` under [`output_file_name`].
pub fn write_output(canvas: &RgbaImage, dir: &Path, format: OutputFormat) -> Result<PathBuf, ComposeError> {
    let bytes = encode(canvas, format)?;
    let path = dir.join(output_file_name(canvas.width(), canvas.height(), format));
    std::fs::write(&path, bytes)?;
    Ok(path)
}
