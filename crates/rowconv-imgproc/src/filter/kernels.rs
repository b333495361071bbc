use super::{FilterError, Kernel2d};

/// 5x5 binomial weights, the outer product of `[1, 4, 6, 4, 1]`.
const BINOMIAL_5X5: [i32; 25] = [
    1, 4, 6, 4, 1, //
    4, 16, 24, 16, 4, //
    6, 24, 36, 24, 6, //
    4, 16, 24, 16, 4, //
    1, 4, 6, 4, 1,
];

/// The kernels available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKernel {
    /// 3x3 identity.
    Identity,
    /// 3x3 sharpen.
    Sharpen,
    /// 3x3 edge detection.
    Edge,
    /// 3x3 emboss.
    Emboss,
    /// 3x3 box blur.
    Blur,
    /// 5x5 gaussian blur.
    Gauss,
    /// 5x5 unsharp masking.
    Unsharp,
}

impl NamedKernel {
    /// Every kernel in the catalog.
    pub const ALL: [NamedKernel; 7] = [
        NamedKernel::Identity,
        NamedKernel::Sharpen,
        NamedKernel::Edge,
        NamedKernel::Emboss,
        NamedKernel::Blur,
        NamedKernel::Gauss,
        NamedKernel::Unsharp,
    ];

    /// The catalog name of the kernel.
    pub fn name(&self) -> &'static str {
        match self {
            NamedKernel::Identity => "identity",
            NamedKernel::Sharpen => "sharpen",
            NamedKernel::Edge => "edge",
            NamedKernel::Emboss => "emboss",
            NamedKernel::Blur => "blur",
            NamedKernel::Gauss => "gauss",
            NamedKernel::Unsharp => "unsharp",
        }
    }

    /// The catalog names of all kernels.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }

    /// The side of the kernel matrix.
    pub fn size(&self) -> usize {
        match self {
            NamedKernel::Gauss | NamedKernel::Unsharp => 5,
            _ => 3,
        }
    }

    /// Build the kernel descriptor.
    pub fn kernel(&self) -> Result<Kernel2d, FilterError> {
        let (coefficients, divisor) = match self {
            NamedKernel::Identity => (vec![0, 0, 0, 0, 1, 0, 0, 0, 0], 1),
            NamedKernel::Sharpen => (vec![0, -1, 0, -1, 5, -1, 0, -1, 0], 1),
            NamedKernel::Edge => (vec![-1, -1, -1, -1, 8, -1, -1, -1, -1], 1),
            NamedKernel::Emboss => (vec![-2, -1, 0, -1, 1, 1, 0, 1, 2], 1),
            NamedKernel::Blur => (vec![1; 9], 9),
            NamedKernel::Gauss => (BINOMIAL_5X5.to_vec(), 256),
            NamedKernel::Unsharp => {
                // 2 * identity - gaussian, folded into one table
                let mut coefficients = BINOMIAL_5X5.to_vec();
                coefficients[12] = -476;
                (coefficients, -256)
            }
        };

        Kernel2d::new(self.size(), coefficients, divisor)
    }
}

impl std::fmt::Display for NamedKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({}x{})", self.name(), self.size(), self.size())
    }
}

impl std::str::FromStr for NamedKernel {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| FilterError::KernelNotFound(s.to_string()))
    }
}

/// Resolve a kernel name to its descriptor.
///
/// # Errors
///
/// Returns [`FilterError::KernelNotFound`] if the name is not in the catalog.
///
/// # Examples
///
/// ```
/// use rowconv_imgproc::filter::kernels;
///
/// let kernel = kernels::from_name("gauss").unwrap();
/// assert_eq!(kernel.size(), 5);
///
/// assert!(kernels::from_name("median").is_err());
/// ```
pub fn from_name(name: &str) -> Result<Kernel2d, FilterError> {
    name.parse::<NamedKernel>()?.kernel()
}
