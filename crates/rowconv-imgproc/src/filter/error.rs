use super::kernels::NamedKernel;

/// Errors related to filter kernels.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The kernel name is not in the catalog.
    #[error("Kernel not found: {0} (available: {available})", available = NamedKernel::names().join(", "))]
    KernelNotFound(String),

    /// The kernel size must be odd and positive.
    #[error("Kernel size must be odd and positive, got {0}")]
    InvalidKernelSize(usize),

    /// The coefficient count does not match `size * size`.
    #[error("Kernel has {0} coefficients, expected {1}")]
    InvalidKernelLength(usize, usize),

    /// The coefficient magnitudes could overflow the per-channel accumulator.
    #[error("Kernel coefficients too large: sum of magnitudes {0} times 255 overflows i32")]
    AccumulatorOverflow(i64),

    /// The normalization divisor is zero.
    #[error("Kernel divisor must not be zero")]
    ZeroDivisor,
}
