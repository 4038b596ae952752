//! Per-image crop, zoom and pan, resolved to a source sampling window.
//!
//! An [`Adjustment`] describes what part of an image the user wants to see;
//! [`resolve_source_rect`] turns it into the sub-rectangle of the image's
//! natural pixels that gets drawn into the image's cell.
//!
//! # Example
//!
//! ```
//! use zencompose::{Adjustment, ZoomOrigin, resolve_source_rect};
//!
//! let adj = Adjustment::default().zoom(2.0).zoom_origin(ZoomOrigin::Center);
//! let window = resolve_source_rect(1000, 800, &adj).unwrap();
//! assert_eq!((window.x, window.y), (250.0, 200.0));
//! assert_eq!((window.width, window.height), (500.0, 400.0));
//! ```

use crate::geometry::Rect;

/// Largest fraction that may be cropped from a single edge.
pub const MAX_CROP: f64 = 0.9;
/// Smallest accepted zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest accepted zoom factor.
pub const MAX_ZOOM: f64 = 2.0;

/// Opposite crops never leave less than this fraction of the image.
const MIN_REMAINING: f64 = 0.01;

/// How the visible window is mapped onto its destination rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FitMode {
    /// Stretch to the destination exactly, distorting aspect ratio.
    #[default]
    Fit,
    /// Scale uniformly to cover the destination, cropping overflow.
    Fill,
}

impl FitMode {
    /// Parse a fit mode name (case-insensitive).
    ///
    /// Accepts `fit`/`stretch` and `fill`/`crop`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("fit") || s.eq_ignore_ascii_case("stretch") {
            Some(Self::Fit)
        } else if s.eq_ignore_ascii_case("fill") || s.eq_ignore_ascii_case("crop") {
            Some(Self::Fill)
        } else {
            None
        }
    }
}

/// Anchor the zoomed window is pinned to inside the crop box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum ZoomOrigin {
    /// Zoom toward the middle of the crop box.
    #[default]
    Center,
    /// Keep the top-left corner fixed.
    LeftTop,
    /// Keep the top-right corner fixed.
    RightTop,
    /// Keep the bottom-left corner fixed.
    BottomLeft,
    /// Keep the bottom-right corner fixed.
    BottomRight,
}

impl ZoomOrigin {
    /// Parse an origin name, ignoring case, `-` and `_`
    /// (`leftTop`, `left-top`, `topleft` all work).
    pub fn parse(s: &str) -> Option<Self> {
        let mut buf = [0u8; 16];
        let mut len = 0;
        for b in s.trim().bytes().filter(|b| *b != b'-' && *b != b'_') {
            if len == buf.len() {
                return None;
            }
            buf[len] = b.to_ascii_lowercase();
            len += 1;
        }
        match &buf[..len] {
            b"center" | b"middle" => Some(Self::Center),
            b"lefttop" | b"topleft" => Some(Self::LeftTop),
            b"righttop" | b"topright" => Some(Self::RightTop),
            b"bottomleft" | b"leftbottom" => Some(Self::BottomLeft),
            b"bottomright" | b"rightbottom" => Some(Self::BottomRight),
            _ => None,
        }
    }

    /// Fractional position of the window within the crop box's slack:
    /// `(0, 0)` pins to the top-left, `(1, 1)` to the bottom-right.
    fn anchor(self) -> (f64, f64) {
        match self {
            Self::Center => (0.5, 0.5),
            Self::LeftTop => (0.0, 0.0),
            Self::RightTop => (1.0, 0.0),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }
}

/// User adjustments for one image.
///
/// Crop fractions are measured from each edge of the natural image. Zoom
/// magnifies the cropped box toward [`zoom_origin`](Self::zoom_origin); pan
/// slides the visible window by a fraction of the remaining slack.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct Adjustment {
    pub crop_left: f64,
    pub crop_top: f64,
    pub crop_right: f64,
    pub crop_bottom: f64,
    /// `1.0` shows the whole crop box, `2.0` half of it on each axis.
    pub zoom: f64,
    pub zoom_origin: ZoomOrigin,
    /// Horizontal pan in `-1.0..=1.0`.
    pub pan_x: f64,
    /// Vertical pan in `-1.0..=1.0`.
    pub pan_y: f64,
    /// Per-image override of the canvas-wide fit mode.
    pub fit_mode: Option<FitMode>,
}

impl Default for Adjustment {
    fn default() -> Self {
        Self {
            crop_left: 0.0,
            crop_top: 0.0,
            crop_right: 0.0,
            crop_bottom: 0.0,
            zoom: 1.0,
            zoom_origin: ZoomOrigin::Center,
            pan_x: 0.0,
            pan_y: 0.0,
            fit_mode: None,
        }
    }
}

impl Adjustment {
    /// Set crop fractions (CSS order: top, right, bottom, left).
    pub fn crop(mut self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        self.crop_top = top;
        self.crop_right = right;
        self.crop_bottom = bottom;
        self.crop_left = left;
        self
    }

    /// Set the zoom factor.
    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the zoom anchor.
    pub fn zoom_origin(mut self, origin: ZoomOrigin) -> Self {
        self.zoom_origin = origin;
        self
    }

    /// Set pan fractions.
    pub fn pan(mut self, x: f64, y: f64) -> Self {
        self.pan_x = x;
        self.pan_y = y;
        self
    }

    /// Override the canvas-wide fit mode for this image.
    pub fn fit_mode(mut self, mode: FitMode) -> Self {
        self.fit_mode = Some(mode);
        self
    }

    /// Fit mode for this image, falling back to `default`.
    pub fn effective_fit(&self, default: FitMode) -> FitMode {
        self.fit_mode.unwrap_or(default)
    }

    /// Clamp every field into its valid range.
    ///
    /// Non-finite values fall back to their defaults. When opposite crops
    /// would leave nothing, the far-side crop (right/bottom) gives way.
    pub fn sanitized(&self) -> Self {
        let (crop_left, crop_right) = sanitize_crop_pair(self.crop_left, self.crop_right);
        let (crop_top, crop_bottom) = sanitize_crop_pair(self.crop_top, self.crop_bottom);
        Self {
            crop_left,
            crop_top,
            crop_right,
            crop_bottom,
            zoom: finite_or(self.zoom, 1.0).clamp(MIN_ZOOM, MAX_ZOOM),
            zoom_origin: self.zoom_origin,
            pan_x: finite_or(self.pan_x, 0.0).clamp(-1.0, 1.0),
            pan_y: finite_or(self.pan_y, 0.0).clamp(-1.0, 1.0),
            fit_mode: self.fit_mode,
        }
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

fn sanitize_crop_pair(near: f64, far: f64) -> (f64, f64) {
    let near = finite_or(near, 0.0).clamp(0.0, MAX_CROP);
    let far = finite_or(far, 0.0).clamp(0.0, MAX_CROP);
    (near, far.min(1.0 - MIN_REMAINING - near).max(0.0))
}

/// Resolve an image's visible window in natural pixel coordinates.
///
/// 1. Crop fractions define the crop box.
/// 2. Zoom shrinks the window inside the crop box (never grows it; zoom
///    below 1 behaves like 1).
/// 3. The window is anchored per [`ZoomOrigin`] and kept inside the box.
/// 4. Pan shifts the window by a fraction of the leftover slack. With no
///    slack and `zoom ≥ 1`, half the crop box acts as slack so the image can
///    still be nudged.
/// 5. The result is clamped to the full image, not the crop box: pan may
///    reveal pixels outside the crop but never outside the image.
///
/// The returned rect always satisfies `x ≥ 0`, `y ≥ 0`, `x + width ≤ image_w`,
/// `y + height ≤ image_h` and `width, height ≥ 1`. Returns `None` only for
/// an image with a zero dimension.
pub fn resolve_source_rect(image_w: u32, image_h: u32, adjustment: &Adjustment) -> Option<Rect> {
    if image_w == 0 || image_h == 0 {
        return None;
    }
    let adj = adjustment.sanitized();
    let iw = f64::from(image_w);
    let ih = f64::from(image_h);

    let crop_box = Rect::new(
        adj.crop_left * iw,
        adj.crop_top * ih,
        ((1.0 - adj.crop_left - adj.crop_right) * iw).max(1.0),
        ((1.0 - adj.crop_top - adj.crop_bottom) * ih).max(1.0),
    );
    let (ax, ay) = adj.zoom_origin.anchor();
    let (x, w) = resolve_axis(crop_box.x, crop_box.width, iw, adj.zoom, ax, adj.pan_x);
    let (y, h) = resolve_axis(crop_box.y, crop_box.height, ih, adj.zoom, ay, adj.pan_y);
    let window = Rect::new(x, y, w, h);
    window.is_finite().then_some(window)
}

/// One axis of [`resolve_source_rect`]: returns `(origin, extent)`.
fn resolve_axis(start: f64, extent: f64, full: f64, zoom: f64, anchor: f64, pan: f64) -> (f64, f64) {
    let visible = extent.min((extent / zoom).max(1.0)).min(full);
    let slack = (extent - visible).max(0.0);

    let anchored = (start + slack * anchor).clamp(start, start + slack);

    let shift = if slack == 0.0 && zoom >= 1.0 {
        extent * 0.5
    } else {
        slack
    };
    let panned = anchored + pan * shift;

    (panned.clamp(0.0, (full - visible).max(0.0)), visible)
}
