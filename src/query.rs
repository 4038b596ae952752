//! Query-string configuration.
//!
//! Parses strings like `?w=1920&h=1080&layout=grid&cols=3&template=polaroid`
//! into a [`MergeConfig`] plus per-image [`Adjustments`]. Problems never
//! abort parsing; they are collected as [`ParseWarning`]s and the offending
//! value is ignored.
//!
//! | key | value |
//! |-----|-------|
//! | `w`, `width`, `h`, `height` | output size in pixels |
//! | `layout` | `auto`, `horizontal`, `vertical`, `grid` |
//! | `cols` | columns per row |
//! | `fit` | `fit` (stretch) or `fill` (cover) |
//! | `template` | built-in template name |
//! | `gap`, `padding`, `border`, `radius` | grid template overrides, pixels |
//! | `bgcolor`, `bordercolor`, `matcolor` | grid template colors (`matcolor=none` removes the mat) |
//! | `offset`, `shadow` | overlap template offsets, pixels |
//! | `opacity` | background template backdrop opacity |
//! | `i.<id>.crop` | `left,top,right,bottom` fractions |
//! | `i.<id>.zoom` | `0.5` to `2` |
//! | `i.<id>.origin` | `center`, `left-top`, `right-top`, `bottom-left`, `bottom-right` |
//! | `i.<id>.pan` | `x,y` in `-1..=1` |
//! | `i.<id>.fit` | per-image fit mode |
//!
//! # Example
//!
//! ```
//! use zencompose::query;
//! use zencompose::{ImageId, LayoutMode};
//!
//! let result = query::parse("w=1200&h=800&layout=grid&cols=2&i.7.zoom=1.5");
//! assert!(result.warnings.is_empty());
//! assert_eq!(result.config.layout, LayoutMode::Grid);
//! assert_eq!(result.adjustments.get(ImageId(7)).zoom, 1.5);
//! ```

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::adjust::{Adjustment, FitMode, ZoomOrigin};
use crate::color::Color;
use crate::config::MergeConfig;
use crate::geometry::LayoutMode;
use crate::render::{Adjustments, ImageId};
use crate::template::{Template, TemplateId};

/// Result of parsing a query string.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub config: MergeConfig,
    pub adjustments: Adjustments,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from query string parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A key appeared more than once (last value wins).
    DuplicateKey { key: String, value: String },
    /// A key was not recognized.
    KeyNotRecognized { key: String, value: String },
    /// A key was recognized but its value could not be used.
    ValueInvalid {
        key: String,
        value: String,
        reason: &'static str,
    },
}

/// Parse a query string (with or without leading `?`).
pub fn parse(query: &str) -> ParseResult {
    let mut draft = Draft::default();
    let mut warnings = Vec::new();

    for pair in split_query(query) {
        let (raw_key, raw_value) = split_pair(pair);
        let key = percent_decode(raw_key).to_ascii_lowercase();
        let value = percent_decode(raw_value);
        draft.dispatch(&key, &value, &mut warnings);
    }

    draft.finish(warnings)
}

#[derive(Default)]
struct Draft {
    width: Option<u32>,
    height: Option<u32>,
    layout: Option<LayoutMode>,
    cols: Option<u32>,
    fit: Option<FitMode>,
    template: Option<TemplateId>,
    gap: Option<u32>,
    padding: Option<u32>,
    border: Option<u32>,
    radius: Option<u32>,
    bgcolor: Option<Color>,
    bordercolor: Option<Color>,
    matcolor: Option<Option<Color>>,
    offset: Option<u32>,
    shadow: Option<u32>,
    opacity: Option<f32>,
    images: BTreeMap<ImageId, ImageDraft>,
}

#[derive(Default)]
struct ImageDraft {
    crop: Option<[f64; 4]>,
    zoom: Option<f64>,
    origin: Option<ZoomOrigin>,
    pan: Option<[f64; 2]>,
    fit: Option<FitMode>,
}

impl Draft {
    fn dispatch(&mut self, key: &str, value: &str, warnings: &mut Vec<ParseWarning>) {
        let mut w = Field { key, value, warnings };
        match key {
            "w" | "width" => w.set(&mut self.width, parse_dimension(value), "expected a positive integer"),
            "h" | "height" => w.set(&mut self.height, parse_dimension(value), "expected a positive integer"),
            "layout" => w.set(
                &mut self.layout,
                LayoutMode::parse(value),
                "expected auto|horizontal|vertical|grid",
            ),
            "cols" => w.set(&mut self.cols, parse_u32(value), "expected a non-negative integer"),
            "fit" => w.set(&mut self.fit, FitMode::parse(value), "expected fit|fill"),
            "template" => w.set(
                &mut self.template,
                TemplateId::from_name(value),
                "unknown template, using default",
            ),
            "gap" => w.set(&mut self.gap, parse_u32(value), "expected a non-negative integer"),
            "padding" => w.set(&mut self.padding, parse_u32(value), "expected a non-negative integer"),
            "border" => w.set(&mut self.border, parse_u32(value), "expected a non-negative integer"),
            "radius" => w.set(&mut self.radius, parse_u32(value), "expected a non-negative integer"),
            "bgcolor" => w.set(&mut self.bgcolor, Color::parse(value), "expected a hex color"),
            "bordercolor" => w.set(&mut self.bordercolor, Color::parse(value), "expected a hex color"),
            "matcolor" => {
                let parsed = if value.trim().eq_ignore_ascii_case("none") {
                    Some(None)
                } else {
                    Color::parse(value).map(Some)
                };
                w.set(&mut self.matcolor, parsed, "expected a hex color or none");
            }
            "offset" => w.set(&mut self.offset, parse_u32(value), "expected a non-negative integer"),
            "shadow" => w.set(&mut self.shadow, parse_u32(value), "expected a non-negative integer"),
            "opacity" => w.set(&mut self.opacity, parse_unit(value), "expected a number in 0..=1"),
            _ => match parse_image_key(key) {
                Some((id, field)) => {
                    let image = self.images.entry(id).or_default();
                    image.dispatch(field, &mut w);
                }
                None => w.unrecognized(),
            },
        }
    }

    fn finish(self, mut warnings: Vec<ParseWarning>) -> ParseResult {
        let defaults = MergeConfig::default();
        let mut config = MergeConfig::new(
            self.width.unwrap_or(defaults.width),
            self.height.unwrap_or(defaults.height),
        )
        .template(self.template.unwrap_or_default());
        config.layout = self.layout.unwrap_or_default();
        config.cols_per_row = self.cols;
        config.fit_mode = self.fit.unwrap_or_default();

        match &mut config.template {
            Template::Grid(style) => {
                override_with(&mut style.gap, self.gap);
                override_with(&mut style.padding, self.padding);
                override_with(&mut style.border_width, self.border);
                override_with(&mut style.border_radius, self.radius);
                override_with(&mut style.background_color, self.bgcolor);
                override_with(&mut style.border_color, self.bordercolor);
                override_with(&mut style.mat_color, self.matcolor);
                reject("offset", self.offset, "only applies to the overlap template", &mut warnings);
                reject("shadow", self.shadow, "only applies to the overlap template", &mut warnings);
                reject("opacity", self.opacity, "only applies to the background template", &mut warnings);
            }
            Template::Overlap(style) => {
                override_with(&mut style.overlap_offset, self.offset);
                override_with(&mut style.shadow_offset, self.shadow);
                override_with(&mut style.background_color, self.bgcolor);
                reject_grid_overrides(&self, &mut warnings);
                reject("opacity", self.opacity, "only applies to the background template", &mut warnings);
            }
            Template::Background(style) => {
                override_with(&mut style.background_opacity, self.opacity);
                override_with(&mut style.overlay_gap, self.gap);
                override_with(&mut style.overlay_padding, self.padding);
                override_with(&mut style.overlay_radius, self.radius);
                override_with(&mut style.backdrop_color, self.bgcolor);
                reject("border", self.border, "only applies to grid templates", &mut warnings);
                reject("bordercolor", self.bordercolor, "only applies to grid templates", &mut warnings);
                reject("matcolor", self.matcolor, "only applies to grid templates", &mut warnings);
                reject("offset", self.offset, "only applies to the overlap template", &mut warnings);
                reject("shadow", self.shadow, "only applies to the overlap template", &mut warnings);
            }
        }

        let adjustments = self
            .images
            .into_iter()
            .filter_map(|(id, draft)| draft.into_adjustment().map(|adj| (id, adj)))
            .collect();

        ParseResult {
            config,
            adjustments,
            warnings,
        }
    }
}

fn reject_grid_overrides(draft: &Draft, warnings: &mut Vec<ParseWarning>) {
    const REASON: &str = "only applies to grid templates";
    reject("gap", draft.gap, REASON, warnings);
    reject("padding", draft.padding, REASON, warnings);
    reject("border", draft.border, REASON, warnings);
    reject("radius", draft.radius, REASON, warnings);
    reject("bordercolor", draft.bordercolor, REASON, warnings);
    reject("matcolor", draft.matcolor, REASON, warnings);
}

impl ImageDraft {
    fn dispatch(&mut self, field: &str, w: &mut Field<'_>) {
        let value = w.value;
        match field {
            "crop" => w.set(&mut self.crop, parse_list::<4>(value), "expected left,top,right,bottom"),
            "zoom" => w.set(&mut self.zoom, parse_f64(value), "expected a number"),
            "origin" => w.set(
                &mut self.origin,
                ZoomOrigin::parse(value),
                "expected center|left-top|right-top|bottom-left|bottom-right",
            ),
            "pan" => w.set(&mut self.pan, parse_list::<2>(value), "expected x,y"),
            "fit" => w.set(&mut self.fit, FitMode::parse(value), "expected fit|fill"),
            _ => w.unrecognized(),
        }
    }

    fn into_adjustment(self) -> Option<Adjustment> {
        if self.crop.is_none()
            && self.zoom.is_none()
            && self.origin.is_none()
            && self.pan.is_none()
            && self.fit.is_none()
        {
            return None;
        }
        let mut adj = Adjustment::default();
        if let Some([left, top, right, bottom]) = self.crop {
            adj = adj.crop(top, right, bottom, left);
        }
        if let Some(zoom) = self.zoom {
            adj = adj.zoom(zoom);
        }
        if let Some(origin) = self.origin {
            adj = adj.zoom_origin(origin);
        }
        if let Some([x, y]) = self.pan {
            adj = adj.pan(x, y);
        }
        adj.fit_mode = self.fit;
        Some(adj.sanitized())
    }
}

/// The key/value pair being dispatched, plus the warning sink.
struct Field<'a> {
    key: &'a str,
    value: &'a str,
    warnings: &'a mut Vec<ParseWarning>,
}

impl Field<'_> {
    /// Store `parsed`, warning on duplicates and on values that failed to
    /// parse.
    fn set<T>(&mut self, field: &mut Option<T>, parsed: Option<T>, reason: &'static str) {
        match parsed {
            Some(v) => {
                if field.is_some() {
                    self.warnings.push(ParseWarning::DuplicateKey {
                        key: String::from(self.key),
                        value: String::from(self.value),
                    });
                }
                *field = Some(v);
            }
            None => self.warnings.push(ParseWarning::ValueInvalid {
                key: String::from(self.key),
                value: String::from(self.value),
                reason,
            }),
        }
    }

    fn unrecognized(&mut self) {
        self.warnings.push(ParseWarning::KeyNotRecognized {
            key: String::from(self.key),
            value: String::from(self.value),
        });
    }
}

fn override_with<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

fn reject<T>(key: &str, value: Option<T>, reason: &'static str, warnings: &mut Vec<ParseWarning>) {
    if value.is_some() {
        warnings.push(ParseWarning::ValueInvalid {
            key: String::from(key),
            value: String::new(),
            reason,
        });
    }
}

/// `i.<id>.<field>` → `(id, field)`.
fn parse_image_key(key: &str) -> Option<(ImageId, &str)> {
    let rest = key.strip_prefix("i.")?;
    let (id, field) = rest.split_once('.')?;
    Some((ImageId(id.parse().ok()?), field))
}

// ---- Value parsers ----

fn parse_dimension(s: &str) -> Option<u32> {
    parse_u32(s).filter(|&v| v > 0)
}

fn parse_u32(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok()
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_unit(s: &str) -> Option<f32> {
    parse_f64(s)
        .filter(|v| (0.0..=1.0).contains(v))
        .map(|v| v as f32)
}

/// Exactly `N` comma-separated finite numbers.
fn parse_list<const N: usize>(s: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut parts = s.split(',');
    for slot in &mut out {
        *slot = parse_f64(parts.next()?)?;
    }
    parts.next().is_none().then_some(out)
}

// ---- Tokenizer ----

fn split_query(query: &str) -> impl Iterator<Item = &str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query.split('&').filter(|s| !s.is_empty())
}

/// Split a single "key=value" pair on the first '='.
fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}

/// Percent-decode a URL component. Also handles '+' as space.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                match (
                    bytes.get(i + 1).copied().and_then(hex_digit),
                    bytes.get(i + 2).copied().and_then(hex_digit),
                ) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
