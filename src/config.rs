//! Merge configuration: output size, layout, default fit mode and template.

use crate::adjust::FitMode;
use crate::error::ComposeError;
use crate::geometry::{LayoutMode, Size};
use crate::template::{Template, TemplateId};

/// Most images a single merge accepts.
pub const MAX_IMAGES: usize = 20;

/// Everything the renderer needs besides the images and their adjustments.
///
/// ```
/// use zencompose::{FitMode, LayoutMode, MergeConfig, TemplateId};
///
/// let config = MergeConfig::new(1920, 1080)
///     .layout(LayoutMode::Grid)
///     .cols_per_row(3)
///     .fit_mode(FitMode::Fill)
///     .template(TemplateId::Polaroid);
/// assert_eq!(config.canvas_size().width, 1920);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct MergeConfig {
    /// Requested output width. See [`canvas_size`](Self::canvas_size).
    pub width: u32,
    /// Requested output height.
    pub height: u32,
    pub layout: LayoutMode,
    /// Column override for [`LayoutMode::Auto`] and [`LayoutMode::Grid`].
    pub cols_per_row: Option<u32>,
    /// Fit mode for images whose adjustment does not set one.
    pub fit_mode: FitMode,
    pub template: Template,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl MergeConfig {
    /// Auto layout, fit mode, default template.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layout: LayoutMode::Auto,
            cols_per_row: None,
            fit_mode: FitMode::Fit,
            template: Template::default(),
        }
    }

    /// Start from a resolution preset.
    pub fn preset(preset: &Preset) -> Self {
        Self::new(preset.width, preset.height)
    }

    pub fn layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    /// Fix the column count. Zero is treated as one column.
    pub fn cols_per_row(mut self, cols: u32) -> Self {
        self.cols_per_row = Some(cols);
        self
    }

    pub fn fit_mode(mut self, mode: FitMode) -> Self {
        self.fit_mode = mode;
        self
    }

    /// Use a built-in template.
    pub fn template(mut self, id: TemplateId) -> Self {
        self.template = id.template();
        self
    }

    /// Use a built-in template by name; unknown names select the default.
    pub fn template_named(self, name: &str) -> Self {
        self.template(TemplateId::resolve(name))
    }

    /// Use a hand-built template.
    pub fn custom_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Output dimensions, each clamped into `1..=MAX_CANVAS_DIMENSION`.
    pub fn canvas_size(&self) -> Size {
        Size::new(self.width, self.height).clamp_to_canvas()
    }

    /// Reject batches larger than [`MAX_IMAGES`].
    pub fn check_image_count(count: usize) -> Result<(), ComposeError> {
        if count > MAX_IMAGES {
            return Err(ComposeError::TooManyImages {
                count,
                max: MAX_IMAGES,
            });
        }
        Ok(())
    }
}

/// A named output resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Preset {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Preset {
    /// Find a preset by label (case-insensitive).
    pub fn find(label: &str) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| p.label.eq_ignore_ascii_case(label.trim()))
    }
}

/// Common output resolutions.
pub const PRESETS: &[Preset] = &[
    Preset { label: "1080p", width: 1920, height: 1080 },
    Preset { label: "720p", width: 1280, height: 720 },
    Preset { label: "4K", width: 3840, height: 2160 },
    Preset { label: "5K", width: 5120, height: 2880 },
    Preset { label: "8K", width: 7680, height: 4320 },
    Preset { label: "Square 1:1", width: 1080, height: 1080 },
    Preset { label: "Portrait 9:16", width: 1080, height: 1920 },
    Preset { label: "Instagram", width: 1080, height: 1350 },
];
