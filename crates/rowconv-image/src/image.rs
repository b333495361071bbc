use std::ops::Range;

use crate::border::{BorderMode, DEFAULT_BORDER_MODE};
use crate::error::ImageError;
use crate::rows::ImageRowsMut;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use rowconv_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// An 8-bit image with three channels.
pub type Rgb8 = Image<u8, 3>;

/// Represents an image with pixel data.
///
/// The pixels are stored row-major as a flat buffer of `width * height * CHANNELS` values.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Returns
    ///
    /// A new image with the given pixel data.
    ///
    /// # Errors
    ///
    /// If a dimension is zero or the length of the pixel data does not match the image
    /// size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowconv_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::InvalidImageSize(size.width, size.height));
        }

        // check if the data length matches the image size
        if data.len() != size.width * size.height * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.width * size.height * CHANNELS,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and every value set to `val`.
    ///
    /// This is how destination buffers are allocated before a convolution run.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowconv_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///   ImageSize {
    ///     width: 10,
    ///     height: 20,
    ///   }, 0u8).unwrap();
    ///
    /// assert_eq!(image.as_slice().len(), 10 * 20 * 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.width * size.height * CHANNELS];
        Image::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Number of values in one image row.
    pub fn row_stride(&self) -> usize {
        self.size.width * CHANNELS
    }

    /// Get the pixel data of the image as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data of the image as a mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel data.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get the pixel at the given coordinates.
    ///
    /// Coordinates outside the image are resolved with [`DEFAULT_BORDER_MODE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rowconv_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize { width: 2, height: 1 },
    ///     vec![1, 2, 3, 4, 5, 6],
    /// ).unwrap();
    ///
    /// assert_eq!(image.get_pixel(1, 0), [4, 5, 6]);
    /// assert_eq!(image.get_pixel(-3, 7), [1, 2, 3]);
    /// ```
    pub fn get_pixel(&self, x: isize, y: isize) -> [T; CHANNELS]
    where
        T: Copy + Default,
    {
        self.get_pixel_with_border(x, y, DEFAULT_BORDER_MODE)
    }

    /// Get the pixel at the given coordinates resolving out-of-range reads with `border`.
    ///
    /// [`BorderMode::Constant`] yields `T::default()` for every channel outside the image.
    #[inline]
    pub fn get_pixel_with_border(&self, x: isize, y: isize, border: BorderMode) -> [T; CHANNELS]
    where
        T: Copy + Default,
    {
        let (Some(x), Some(y)) = (
            border.map_index(x, self.size.width),
            border.map_index(y, self.size.height),
        ) else {
            return [T::default(); CHANNELS];
        };

        let offset = (y * self.size.width + x) * CHANNELS;
        let mut pixel = [T::default(); CHANNELS];
        pixel.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        pixel
    }

    /// Write a pixel at the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::PixelIndexOutOfBounds`] if the coordinates are outside the image.
    pub fn set_pixel(&mut self, pixel: [T; CHANNELS], x: usize, y: usize) -> Result<(), ImageError>
    where
        T: Copy,
    {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        let offset = (y * self.size.width + x) * CHANNELS;
        self.data[offset..offset + CHANNELS].copy_from_slice(&pixel);
        Ok(())
    }

    /// Split the image into disjoint mutable row bands.
    ///
    /// The ranges must be non-empty, ascending and contiguous, starting at row 0 and
    /// ending at the image height, so every row belongs to exactly one band.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidRowRanges`] if the ranges do not tile the image rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowconv_image::{Image, ImageSize};
    ///
    /// let mut image = Image::<u8, 3>::from_size_val([2, 3].into(), 0).unwrap();
    /// let bands = image.split_rows_mut(&[0..1, 1..3]).unwrap();
    ///
    /// assert_eq!(bands.len(), 2);
    /// assert_eq!(bands[1].rows(), 1..3);
    /// ```
    pub fn split_rows_mut(
        &mut self,
        ranges: &[Range<usize>],
    ) -> Result<Vec<ImageRowsMut<'_, T, CHANNELS>>, ImageError> {
        let height = self.size.height;
        let width = self.size.width;

        let mut expected_start = 0;
        for range in ranges {
            if range.start != expected_start || range.end <= range.start {
                return Err(ImageError::InvalidRowRanges(height));
            }
            expected_start = range.end;
        }
        if expected_start != height {
            return Err(ImageError::InvalidRowRanges(height));
        }

        let row_stride = self.row_stride();
        let mut bands = Vec::with_capacity(ranges.len());
        let mut remaining = self.data.as_mut_slice();

        for range in ranges {
            let (band, rest) = remaining.split_at_mut(range.len() * row_stride);
            bands.push(ImageRowsMut::new(range.clone(), width, band));
            remaining = rest;
        }

        Ok(bands)
    }
}
