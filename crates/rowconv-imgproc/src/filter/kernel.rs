use super::FilterError;

/// A square 2D convolution kernel.
///
/// The kernel owns its normalization: it keeps the integer coefficients together with the
/// divisor they are scaled by, and precomputes the `f32` weights `coefficient / divisor`.
/// A blur built from `[1; 9]` with divisor `9` preserves brightness; the same coefficients
/// with divisor `1` would brighten the image ninefold.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2d {
    size: usize,
    coefficients: Vec<i32>,
    divisor: i32,
    weights: Vec<f32>,
}

impl Kernel2d {
    /// Create a new kernel.
    ///
    /// # Arguments
    ///
    /// * `size` - The side of the square kernel, odd and positive.
    /// * `coefficients` - The `size * size` integer coefficients in row-major order.
    /// * `divisor` - The normalization divisor applied to every coefficient.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is even or zero, the coefficient count does not match,
    /// the divisor is zero, or the coefficients are large enough to overflow the `i32`
    /// per-channel sum of a saturated (255) neighbourhood.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowconv_imgproc::filter::Kernel2d;
    ///
    /// let blur = Kernel2d::new(3, vec![1; 9], 9).unwrap();
    ///
    /// assert_eq!(blur.size(), 3);
    /// assert_eq!(blur.half(), 1);
    /// assert_eq!(blur.value_at(-1, 1), 1.0 / 9.0);
    /// ```
    pub fn new(size: usize, coefficients: Vec<i32>, divisor: i32) -> Result<Self, FilterError> {
        if size == 0 || size % 2 == 0 {
            return Err(FilterError::InvalidKernelSize(size));
        }

        let expected_len = size
            .checked_mul(size)
            .ok_or(FilterError::InvalidKernelSize(size))?;
        if coefficients.len() != expected_len {
            return Err(FilterError::InvalidKernelLength(
                coefficients.len(),
                expected_len,
            ));
        }

        // the per-channel accumulator is i32, bounded by sum(|c|) * 255
        let magnitude = coefficients
            .iter()
            .fold(0i64, |acc, &c| acc.saturating_add((c as i64).abs()));
        if magnitude > i32::MAX as i64 / u8::MAX as i64 {
            return Err(FilterError::AccumulatorOverflow(magnitude));
        }

        if divisor == 0 {
            return Err(FilterError::ZeroDivisor);
        }

        let weights = coefficients
            .iter()
            .map(|&c| c as f32 / divisor as f32)
            .collect();

        Ok(Self {
            size,
            coefficients,
            divisor,
            weights,
        })
    }

    /// The side of the square kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The kernel radius, `size / 2`.
    pub fn half(&self) -> usize {
        self.size / 2
    }

    /// The integer coefficients in row-major order.
    pub fn coefficients(&self) -> &[i32] {
        &self.coefficients
    }

    /// The normalization divisor.
    pub fn divisor(&self) -> i32 {
        self.divisor
    }

    /// The normalized weights in row-major order.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    fn index_of(&self, dx: isize, dy: isize) -> usize {
        let half = self.half() as isize;
        debug_assert!(dx.abs() <= half && dy.abs() <= half);
        let row = (dy + half) as usize;
        let col = (dx + half) as usize;
        row * self.size + col
    }

    /// The normalized weight at the signed offset `(dx, dy)` from the kernel center.
    ///
    /// PRECONDITION: `dx` and `dy` are in `[-half, half]`.
    #[inline]
    pub fn value_at(&self, dx: isize, dy: isize) -> f32 {
        self.weights[self.index_of(dx, dy)]
    }

    /// The integer coefficient at the signed offset `(dx, dy)` from the kernel center.
    ///
    /// PRECONDITION: `dx` and `dy` are in `[-half, half]`.
    #[inline]
    pub fn coefficient_at(&self, dx: isize, dy: isize) -> i32 {
        self.coefficients[self.index_of(dx, dy)]
    }

    /// Sum of the normalized weights.
    ///
    /// Brightness-preserving kernels sum to one.
    pub fn weight_sum(&self) -> f32 {
        self.coefficients.iter().map(|&c| c as i64).sum::<i64>() as f32 / self.divisor as f32
    }
}
