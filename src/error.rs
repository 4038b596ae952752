//! Error type shared by loading, configuration and export.
//!
//! Rendering itself never fails: images that cannot be drawn are skipped and
//! reported in [`RenderSummary`](crate::RenderSummary).

/// Errors raised outside the draw loop.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ComposeError {
    /// An input could not be decoded. Loading is all-or-nothing, so no
    /// images from the batch are returned.
    #[cfg(feature = "raster")]
    #[error("failed to load image {index}")]
    ImageLoad {
        index: usize,
        #[source]
        source: image::ImageError,
    },

    /// More inputs than a merge accepts.
    #[error("too many images: {count} (maximum {max})")]
    TooManyImages { count: usize, max: usize },

    /// A size or rectangle that cannot be rendered.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    /// Template name not among the built-ins.
    #[error("unknown template")]
    UnknownTemplate,

    /// The canvas could not be encoded.
    #[cfg(feature = "raster")]
    #[error("failed to encode {format}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// Reading inputs or writing output failed.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
