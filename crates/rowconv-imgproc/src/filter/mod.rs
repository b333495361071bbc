//! Filter operations
//!
//! This module provides the kernel descriptor, the named kernel catalog and the
//! per-pixel convolution routine.

/// Filter error types
mod error;
pub use error::FilterError;

/// Kernel descriptor
mod kernel;
pub use kernel::Kernel2d;

/// Named filter kernels
pub mod kernels;
pub use kernels::NamedKernel;

/// Convolution operations
mod convolution;
pub use convolution::*;
