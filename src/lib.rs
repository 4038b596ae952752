//! Multi-image compositing: grid geometry, crop/zoom/pan resolution, and
//! template rendering.
//!
//! Geometry, adjustment resolution and templates are pure and `no_std`
//! compatible. Rendering goes through the [`Surface`] trait, with a pixel
//! backend (`RasterSurface`, feature `raster`) and an SVG backend
//! (`svg::SvgSurface`, feature `svg`).
//!
//! # Modules
//!
//! - [`geometry`]: grid shape and cell rectangles
//! - [`adjust`]: per-image crop, zoom and pan, resolved to a source window
//! - [`template`]: built-in visual templates
//! - `render`: the template renderer (feature `alloc`)
//! - `raster`: `image`-backed surface, decoding and export (feature `raster`)
//! - `svg`: SVG surface (feature `svg`)
//! - `query`: query-string configuration (feature `query`)
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "raster")] {
//! use image::{Rgba, RgbaImage};
//! use zencompose::{Adjustments, ImageId, InputImage, MergeConfig, TemplateId, render_to_image};
//!
//! let red = RgbaImage::from_pixel(64, 48, Rgba([255, 0, 0, 255]));
//! let blue = RgbaImage::from_pixel(48, 64, Rgba([0, 0, 255, 255]));
//! let images = [InputImage::new(ImageId(1), &red), InputImage::new(ImageId(2), &blue)];
//!
//! let config = MergeConfig::new(200, 100).template(TemplateId::Minimal);
//! let (canvas, summary) = render_to_image(&images, &config, &Adjustments::new());
//! assert_eq!(canvas.dimensions(), (200, 100));
//! assert_eq!(summary.drawn, 2);
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod adjust;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod surface;
pub mod template;

#[cfg(feature = "alloc")]
pub mod render;

#[cfg(feature = "raster")]
pub mod raster;

#[cfg(feature = "svg")]
pub mod svg;

#[cfg(feature = "query")]
pub mod query;

pub use adjust::{Adjustment, FitMode, MAX_CROP, MAX_ZOOM, MIN_ZOOM, ZoomOrigin, resolve_source_rect};
pub use color::Color;
pub use config::{MAX_IMAGES, MergeConfig, PRESETS, Preset};
pub use error::ComposeError;
pub use geometry::{GridShape, LayoutMode, MAX_CANVAS_DIMENSION, Rect, Size, cell_rect, grid_shape};
pub use surface::{Shadow, Shape, SourceImage, Surface};
pub use template::{BackgroundStyle, GridStyle, OverlapStyle, Template, TemplateId};

#[cfg(feature = "alloc")]
pub use render::{Adjustments, ImageId, InputImage, RenderSummary, render, render_preview};

#[cfg(feature = "raster")]
pub use raster::{
    JPEG_QUALITY, OutputFormat, RasterSurface, decode_images, encode, load_images,
    output_file_name, render_to_image, write_output,
};
