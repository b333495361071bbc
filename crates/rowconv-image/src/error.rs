use crate::ImageSize;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the image has a zero dimension.
    #[error("Image dimensions must be positive, got {0}x{1}")]
    InvalidImageSize(usize, usize),

    /// Error when two images that must match in size do not.
    #[error("Image size mismatch: {0} vs {1}")]
    SizeMismatch(ImageSize, ImageSize),

    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel index ({0}, {1}) out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when row ranges do not tile the image height.
    #[error("Row ranges must be contiguous and cover [0, {0})")]
    InvalidRowRanges(usize),
}
