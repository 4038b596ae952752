//! Visual templates: gaps, mats, borders, rounded corners, and the two
//! creative whole-canvas compositions.
//!
//! A [`Template`] is a tagged variant. Grid templates decorate each cell of
//! the uniform grid; [`Template::Overlap`] and [`Template::Background`]
//! replace the grid with their own arrangement. Built-in templates are
//! addressed by [`TemplateId`]; unknown names resolve to
//! [`TemplateId::Default`].
//!
//! # Example
//!
//! ```
//! use zencompose::{Template, TemplateId};
//!
//! let Template::Grid(style) = TemplateId::Polaroid.template() else {
//!     unreachable!()
//! };
//! assert_eq!(style.gap, 16);
//! assert_eq!(TemplateId::resolve("no-such-template"), TemplateId::Default);
//! ```

use core::str::FromStr;

use crate::color::Color;
use crate::error::ComposeError;
use crate::surface::Shadow;

/// Canvas fill behind the default grid and the background composition.
pub const DARK_BACKDROP: Color = Color::hex(0x0a0c10);

/// Built-in template identifiers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum TemplateId {
    #[default]
    Default,
    Framed,
    Polaroid,
    Chunky,
    Gallery,
    Minimal,
    Overlap,
    Background,
    Scrapbook,
    Moodboard,
    Retro,
    ModernLight,
}

impl TemplateId {
    /// Every built-in template, in menu order.
    pub const ALL: [TemplateId; 12] = [
        Self::Default,
        Self::Framed,
        Self::Polaroid,
        Self::Chunky,
        Self::Gallery,
        Self::Minimal,
        Self::Overlap,
        Self::Background,
        Self::Scrapbook,
        Self::Moodboard,
        Self::Retro,
        Self::ModernLight,
    ];

    /// Stable identifier (`"modernLight"`, `"polaroid"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Framed => "framed",
            Self::Polaroid => "polaroid",
            Self::Chunky => "chunky",
            Self::Gallery => "gallery",
            Self::Minimal => "minimal",
            Self::Overlap => "overlap",
            Self::Background => "background",
            Self::Scrapbook => "scrapbook",
            Self::Moodboard => "moodboard",
            Self::Retro => "retro",
            Self::ModernLight => "modernLight",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ModernLight => "Modern Light",
            Self::Default => "Default",
            Self::Framed => "Framed",
            Self::Polaroid => "Polaroid",
            Self::Chunky => "Chunky",
            Self::Gallery => "Gallery",
            Self::Minimal => "Minimal",
            Self::Overlap => "Overlap",
            Self::Background => "Background",
            Self::Scrapbook => "Scrapbook",
            Self::Moodboard => "Moodboard",
            Self::Retro => "Retro",
        }
    }

    /// Look up an identifier (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(name))
    }

    /// Look up an identifier, falling back to [`TemplateId::Default`].
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(template = name, "unknown template, using default");
            Self::Default
        })
    }

    /// Whether this template bypasses the uniform grid.
    pub const fn is_creative(self) -> bool {
        matches!(self, Self::Overlap | Self::Background)
    }

    /// The style record for this identifier.
    pub const fn template(self) -> Template {
        match self {
            Self::Default => Template::Grid(GridStyle::PLAIN),
            Self::Framed => Template::Grid(GridStyle {
                padding: 12,
                border_width: 3,
                border_color: Color::hex(0x2a2a2a),
                mat_color: Some(Color::hex(0x1a1a1a)),
                ..GridStyle::PLAIN
            }),
            Self::Polaroid => Template::Grid(GridStyle {
                gap: 16,
                padding: 14,
                border_color: Color::hex(0xeeeeee),
                background_color: Color::hex(0xf0ebe0),
                mat_color: Some(Color::hex(0xfafaf8)),
                border_radius: 2,
                ..GridStyle::PLAIN
            }),
            Self::Chunky => Template::Grid(GridStyle {
                gap: 14,
                border_color: Color::hex(0x111111),
                background_color: Color::hex(0x0d0d0d),
                ..GridStyle::PLAIN
            }),
            Self::Gallery => Template::Grid(GridStyle {
                gap: 6,
                padding: 4,
                border_width: 1,
                border_color: Color::hex(0x3a3a3a),
                background_color: Color::hex(0x141414),
                border_radius: 8,
                ..GridStyle::PLAIN
            }),
            Self::Minimal => Template::Grid(GridStyle {
                gap: 3,
                ..GridStyle::PLAIN
            }),
            Self::Overlap => Template::Overlap(OverlapStyle::DEFAULT),
            Self::Background => Template::Background(BackgroundStyle::DEFAULT),
            Self::Scrapbook => Template::Grid(GridStyle {
                gap: 12,
                padding: 10,
                border_color: Color::hex(0xd4c4a8),
                background_color: Color::hex(0xf5f0e8),
                mat_color: Some(Color::hex(0xfaf8f5)),
                border_radius: 8,
                ..GridStyle::PLAIN
            }),
            Self::Moodboard => Template::Grid(GridStyle {
                gap: 8,
                padding: 6,
                border_color: Color::hex(0xdddddd),
                background_color: Color::hex(0xe8e6e1),
                border_radius: 12,
                ..GridStyle::PLAIN
            }),
            Self::Retro => Template::Grid(GridStyle {
                gap: 10,
                border_color: Color::hex(0xe8d5c4),
                background_color: Color::hex(0xf5e6d3),
                border_radius: 6,
                ..GridStyle::PLAIN
            }),
            Self::ModernLight => Template::Grid(GridStyle {
                gap: 4,
                padding: 4,
                border_width: 1,
                border_color: Color::hex(0xe0e0e0),
                background_color: Color::hex(0xfafafa),
                border_radius: 4,
                ..GridStyle::PLAIN
            }),
        }
    }
}

impl FromStr for TemplateId {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or(ComposeError::UnknownTemplate)
    }
}

/// A template's drawing parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "camelCase")
)]
pub enum Template {
    /// Decorate each cell of the uniform grid.
    Grid(GridStyle),
    /// Staggered, shrinking layers stacked on top of each other.
    Overlap(OverlapStyle),
    /// First image as a faded full-bleed backdrop, the rest as cards on top.
    Background(BackgroundStyle),
}

impl Default for Template {
    fn default() -> Self {
        TemplateId::Default.template()
    }
}

impl Template {
    /// Whether this template bypasses the uniform grid.
    pub fn is_creative(&self) -> bool {
        !matches!(self, Self::Grid(_))
    }
}

/// Per-cell decoration for grid templates. All lengths in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct GridStyle {
    /// Space between neighbouring cells.
    pub gap: u32,
    /// Inset of the image inside its cell; the inset shows the mat.
    pub padding: u32,
    /// Stroke width around each cell; 0 disables the border.
    pub border_width: u32,
    pub border_color: Color,
    /// Canvas fill behind all cells.
    pub background_color: Color,
    /// Fill behind the padding inset. Only drawn when `padding > 0`.
    pub mat_color: Option<Color>,
    /// Corner radius of each cell.
    pub border_radius: u32,
}

impl GridStyle {
    /// Edge-to-edge cells on a dark backdrop: the `default` template.
    pub const PLAIN: Self = Self {
        gap: 0,
        padding: 0,
        border_width: 0,
        border_color: Color::hex(0x333333),
        background_color: DARK_BACKDROP,
        mat_color: None,
        border_radius: 0,
    };
}

impl Default for GridStyle {
    fn default() -> Self {
        Self::PLAIN
    }
}

/// Parameters of the overlapping-stack composition.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct OverlapStyle {
    /// Per-layer inset from each canvas edge.
    pub overlap_offset: u32,
    /// Drop-shadow offset on both axes; 0 disables shadows.
    pub shadow_offset: u32,
    /// Blur radius of the drop shadow.
    pub shadow_blur: f64,
    pub shadow_color: Color,
    pub background_color: Color,
}

impl OverlapStyle {
    pub const DEFAULT: Self = Self {
        overlap_offset: 48,
        shadow_offset: 8,
        shadow_blur: 20.0,
        shadow_color: Color::rgba(0, 0, 0, 115),
        background_color: Color::hex(0x0f1216),
    };

    /// Shadow cast by every layer but the topmost, if enabled.
    pub fn shadow(&self) -> Option<Shadow> {
        (self.shadow_offset > 0).then(|| Shadow {
            color: self.shadow_color,
            blur: self.shadow_blur,
            offset_x: f64::from(self.shadow_offset),
            offset_y: f64::from(self.shadow_offset),
        })
    }
}

impl Default for OverlapStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters of the backdrop-with-cards composition.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct BackgroundStyle {
    /// Opacity of the full-bleed first image.
    pub background_opacity: f32,
    /// Space between cards.
    pub overlay_gap: u32,
    /// Inset of each image inside its card.
    pub overlay_padding: u32,
    /// Card corner radius; the image inside is rounded 4px less.
    pub overlay_radius: u32,
    /// Opaque fill under the faded backdrop image.
    pub backdrop_color: Color,
    pub card_color: Color,
    pub card_shadow: Shadow,
}

impl BackgroundStyle {
    pub const DEFAULT: Self = Self {
        background_opacity: 0.35,
        overlay_gap: 8,
        overlay_padding: 6,
        overlay_radius: 12,
        backdrop_color: DARK_BACKDROP,
        card_color: Color::rgba(20, 20, 24, 235),
        card_shadow: Shadow {
            color: Color::rgba(0, 0, 0, 89),
            blur: 16.0,
            offset_x: 4.0,
            offset_y: 4.0,
        },
    };
}

impl Default for BackgroundStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}
