//! SVG backend: records a composition as a standalone SVG document.
//!
//! Images are referenced by URL (or data URI) rather than embedded pixels,
//! so the output stays small and previews the exact layout a raster render
//! would produce. Clips become `<clipPath>` groups, shadows a Gaussian-blur
//! filter.
//!
//! # Example
//!
//! ```
//! use zencompose::svg::{SvgImage, render_svg};
//! use zencompose::{Adjustments, ImageId, InputImage, MergeConfig, TemplateId};
//!
//! let a = SvgImage::new("a.jpg", 800, 600);
//! let b = SvgImage::new("b.jpg", 600, 800);
//! let images = [InputImage::new(ImageId(1), &a), InputImage::new(ImageId(2), &b)];
//! let config = MergeConfig::new(1200, 600).template(TemplateId::Gallery);
//!
//! let (svg, summary) = render_svg(&images, &config, &Adjustments::new());
//! assert_eq!(summary.drawn, 2);
//! assert!(svg.starts_with("<svg"));
//! ```

use crate::color::Color;
use crate::config::MergeConfig;
use crate::geometry::{Rect, Size};
use crate::render::{Adjustments, InputImage, RenderSummary, render};
use crate::surface::{Shadow, Shape, SourceImage, Surface};

/// An image referenced by URL, with its natural size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvgImage {
    pub href: String,
    pub width: u32,
    pub height: u32,
}

impl SvgImage {
    pub fn new(href: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            href: href.into(),
            width,
            height,
        }
    }
}

impl SourceImage for SvgImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A [`Surface`] that writes SVG elements.
///
/// `set_alpha` opens an opacity group, so nested calls multiply rather than
/// replace; the renderer only sets it once per saved state.
#[derive(Clone, Debug)]
pub struct SvgSurface {
    size: Size,
    body: String,
    next_id: u32,
    /// Groups opened since each `save`; the first entry holds groups opened
    /// at top level.
    open_groups: Vec<u32>,
}

impl SvgSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            body: String::with_capacity(4096),
            next_id: 0,
            open_groups: vec![0],
        }
    }

    /// Close any open groups and return the complete document.
    pub fn finish(mut self) -> String {
        let open: u32 = self.open_groups.iter().sum();
        for _ in 0..open {
            self.body.push_str("</g>\n");
        }
        let (w, h) = (self.size.width, self.size.height);
        let mut svg = String::with_capacity(self.body.len() + 256);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        ));
        svg.push('\n');
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn open_group(&mut self, attrs: &str) {
        self.body.push_str(&format!("<g {attrs}>\n"));
        if let Some(top) = self.open_groups.last_mut() {
            *top += 1;
        }
    }
}

impl Surface for SvgSurface {
    type Image = SvgImage;

    fn size(&self) -> Size {
        self.size
    }

    fn save(&mut self) {
        self.open_groups.push(0);
    }

    fn restore(&mut self) {
        if self.open_groups.len() < 2 {
            return;
        }
        let open = self.open_groups.pop().unwrap_or(0);
        for _ in 0..open {
            self.body.push_str("</g>\n");
        }
    }

    fn clip(&mut self, shape: Shape) {
        let id = self.id("clip");
        self.body.push_str(&format!(
            "<clipPath id=\"{id}\">{}</clipPath>\n",
            shape_element(&shape, "")
        ));
        self.open_group(&format!("clip-path=\"url(#{id})\""));
    }

    fn set_alpha(&mut self, alpha: f32) {
        let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
        self.open_group(&format!("opacity=\"{alpha}\""));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.body.push_str(&shape_element(&Shape::Rect(rect), &fill_attrs(color)));
        self.body.push('\n');
    }

    fn draw_image(&mut self, image: &SvgImage, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        self.body.push_str(&format!(
            "<svg x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\" preserveAspectRatio=\"none\">\
             <image width=\"{}\" height=\"{}\" href=\"{}\"/></svg>\n",
            dst.x,
            dst.y,
            dst.width,
            dst.height,
            src.x,
            src.y,
            src.width,
            src.height,
            image.width,
            image.height,
            escape_xml(&image.href),
        ));
    }

    fn stroke(&mut self, shape: Shape, width: f64, color: Color) {
        let mut attrs = format!("fill=\"none\" stroke=\"{}\" stroke-width=\"{width}\"", hex(color));
        if color.a < 255 {
            attrs.push_str(&format!(" stroke-opacity=\"{}\"", color.opacity()));
        }
        self.body.push_str(&shape_element(&shape, &attrs));
        self.body.push('\n');
    }

    fn draw_shadow(&mut self, shape: Shape, shadow: Shadow) {
        let id = self.id("shadow");
        let sigma = (shadow.blur / 2.0).max(0.0);
        self.body.push_str(&format!(
            "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\
             <feGaussianBlur stdDeviation=\"{sigma}\"/></filter>\n"
        ));
        let shape = shape.translate(shadow.offset_x, shadow.offset_y);
        let attrs = format!("{} filter=\"url(#{id})\"", fill_attrs(shadow.color));
        self.body.push_str(&shape_element(&shape, &attrs));
        self.body.push('\n');
    }
}

/// Render `images` into an SVG document of `config.canvas_size()`.
pub fn render_svg(
    images: &[InputImage<'_, SvgImage>],
    config: &MergeConfig,
    adjustments: &Adjustments,
) -> (String, RenderSummary) {
    let mut surface = SvgSurface::new(config.canvas_size());
    let summary = render(&mut surface, images, config, adjustments);
    (surface.finish(), summary)
}

fn shape_element(shape: &Shape, attrs: &str) -> String {
    let r = shape.bounds();
    let radius = shape.radius();
    let rounding = if radius > 0.0 {
        format!(" rx=\"{radius}\" ry=\"{radius}\"")
    } else {
        String::new()
    };
    let sep = if attrs.is_empty() { "" } else { " " };
    format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{rounding}{sep}{attrs}/>",
        r.x,
        r.y,
        r.width.max(0.0),
        r.height.max(0.0)
    )
}

fn fill_attrs(color: Color) -> String {
    if color.a < 255 {
        format!("fill=\"{}\" fill-opacity=\"{}\"", hex(color), color.opacity())
    } else {
        format!("fill=\"{}\"", hex(color))
    }
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Escape special characters for XML attribute values.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
