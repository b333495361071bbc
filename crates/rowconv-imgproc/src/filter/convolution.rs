use rowconv_image::{BorderMode, Image, ImageError, ImageRowsMut};

use super::Kernel2d;

/// Convert an accumulated channel sum to `u8`.
///
/// Values below 0 become 0, values above 255 become 255, anything else is truncated
/// toward zero.
///
/// # Examples
///
/// ```
/// use rowconv_imgproc::filter::clamp_to_u8;
///
/// assert_eq!(clamp_to_u8(-3.5), 0);
/// assert_eq!(clamp_to_u8(12.9), 12);
/// assert_eq!(clamp_to_u8(300.0), 255);
/// ```
#[inline]
pub fn clamp_to_u8(sum: f32) -> u8 {
    sum.clamp(0.0, 255.0) as u8
}

/// Compute the filtered pixel at `(x, y)`.
///
/// Every kernel tap reads the source through `border`, so taps outside the image never
/// fail. The integer coefficients are accumulated exactly per channel and the kernel
/// divisor is applied once before clamping, which makes the result independent of how
/// the image is split across threads.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The convolution kernel.
/// * `x` - The target column.
/// * `y` - The target row.
/// * `border` - The boundary policy for taps outside the image.
///
/// # Returns
///
/// The filtered pixel.
#[inline]
pub fn convolve_pixel<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel2d,
    x: usize,
    y: usize,
    border: BorderMode,
) -> [u8; C] {
    let half = kernel.half() as isize;
    let (x, y) = (x as isize, y as isize);

    let mut acc = [0i32; C];
    for dy in -half..=half {
        for dx in -half..=half {
            let coefficient = kernel.coefficient_at(dx, dy);
            let pixel = src.get_pixel_with_border(x + dx, y + dy, border);
            acc.iter_mut()
                .zip(pixel.iter())
                .for_each(|(acc, &p)| *acc += coefficient * p as i32);
        }
    }

    let divisor = kernel.divisor() as f32;
    acc.map(|sum| clamp_to_u8(sum as f32 / divisor))
}

/// Convolve every pixel of one destination row band.
///
/// # Arguments
///
/// * `src` - The source image, the full image the band belongs to.
/// * `kernel` - The convolution kernel.
/// * `band` - The destination rows to fill.
/// * `border` - The boundary policy for taps outside the image.
pub fn convolve_rows<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel2d,
    band: &mut ImageRowsMut<'_, u8, C>,
    border: BorderMode,
) {
    debug_assert_eq!(band.width(), src.width());
    for (y, row) in band.rows_mut() {
        row.chunks_exact_mut(C)
            .enumerate()
            .for_each(|(x, dst_pixel)| {
                dst_pixel.copy_from_slice(&convolve_pixel(src, kernel, x, y, border));
            });
    }
}

/// Convolve an image with a kernel on the calling thread.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
/// * `dst` - The destination image with shape (H, W, C).
/// * `border` - The boundary policy for taps outside the image.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Examples
///
/// ```
/// use rowconv_image::{Image, DEFAULT_BORDER_MODE};
/// use rowconv_imgproc::filter::{convolve2d, NamedKernel};
///
/// let src = Image::<u8, 3>::from_size_val([4, 4].into(), 100).unwrap();
/// let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0).unwrap();
/// let kernel = NamedKernel::Blur.kernel().unwrap();
///
/// convolve2d(&src, &kernel, &mut dst, DEFAULT_BORDER_MODE).unwrap();
///
/// assert_eq!(dst, src);
/// ```
pub fn convolve2d<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel2d,
    dst: &mut Image<u8, C>,
    border: BorderMode,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::SizeMismatch(src.size(), dst.size()));
    }

    let height = dst.height();
    for mut band in dst.split_rows_mut(&[0..height])? {
        convolve_rows(src, kernel, &mut band, border);
    }

    Ok(())
}
