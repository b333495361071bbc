#![deny(missing_docs)]
//! Image types for row-partitioned convolution

/// image representation for the convolution engine.
pub mod image;

/// Boundary policies for reads outside the image.
pub mod border;

/// Disjoint mutable views over image rows.
pub mod rows;

/// Error types for the image module.
pub mod error;

pub use crate::border::{BorderMode, DEFAULT_BORDER_MODE};
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize, Rgb8};
pub use crate::rows::ImageRowsMut;
