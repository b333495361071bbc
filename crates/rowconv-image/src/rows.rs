use std::ops::Range;

use crate::error::ImageError;

/// A mutable view over a contiguous band of image rows.
///
/// Bands are created with [`crate::Image::split_rows_mut`]; bands produced by one call
/// never share a row, so each one can be handed to a different thread.
#[derive(Debug)]
pub struct ImageRowsMut<'a, T, const CHANNELS: usize> {
    rows: Range<usize>,
    width: usize,
    data: &'a mut [T],
}

impl<'a, T, const CHANNELS: usize> ImageRowsMut<'a, T, CHANNELS> {
    pub(crate) fn new(rows: Range<usize>, width: usize, data: &'a mut [T]) -> Self {
        debug_assert_eq!(data.len(), rows.len() * width * CHANNELS);
        Self { rows, width, data }
    }

    /// The absolute image rows covered by this band.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Width of the band in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The band pixel data as a mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    /// Write a pixel at column `x` of the absolute image row `y`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::PixelIndexOutOfBounds`] if `y` is not a row of this band or
    /// `x` is outside the image width.
    pub fn set_pixel(&mut self, pixel: [T; CHANNELS], x: usize, y: usize) -> Result<(), ImageError>
    where
        T: Copy,
    {
        if x >= self.width || !self.rows.contains(&y) {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width,
                self.rows.end,
            ));
        }

        let offset = ((y - self.rows.start) * self.width + x) * CHANNELS;
        self.data[offset..offset + CHANNELS].copy_from_slice(&pixel);
        Ok(())
    }

    /// Iterate the rows of the band as `(absolute_row, row_data)` pairs.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (usize, &mut [T])> {
        let start = self.rows.start;
        self.data
            .chunks_exact_mut(self.width * CHANNELS)
            .enumerate()
            .map(move |(i, row)| (start + i, row))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Image, ImageError};

    #[test]
    fn band_rejects_foreign_rows() -> Result<(), ImageError> {
        let mut image = Image::<u8, 3>::from_size_val([3, 4].into(), 0)?;
        let mut bands = image.split_rows_mut(&[0..2, 2..4])?;

        assert_eq!(
            bands[0].set_pixel([1, 1, 1], 0, 2),
            Err(ImageError::PixelIndexOutOfBounds(0, 2, 3, 2))
        );
        assert!(bands[1].set_pixel([1, 1, 1], 0, 1).is_err());
        assert!(bands[1].set_pixel([1, 1, 1], 3, 2).is_err());
        assert!(bands[1].set_pixel([1, 1, 1], 2, 3).is_ok());
        Ok(())
    }

    #[test]
    fn band_rows_mut() -> Result<(), ImageError> {
        let mut image = Image::<u8, 1>::from_size_val([2, 3].into(), 0)?;
        {
            let mut bands = image.split_rows_mut(&[0..1, 1..3])?;
            for band in bands.iter_mut() {
                for (y, row) in band.rows_mut() {
                    row.iter_mut().for_each(|v| *v = y as u8);
                }
            }
        }
        assert_eq!(image.as_slice(), &[0, 0, 1, 1, 2, 2]);
        Ok(())
    }
}
