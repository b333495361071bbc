/// A boundary policy for reads that fall outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Fill the outside with a zero pixel.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Constant,

    /// Clamp to the nearest edge pixel.
    ///
    /// Example: ...d c b a | a a a a...
    #[default]
    Replicate,

    /// Mirror the pixel values at the boundary, starting with the pixel next to the edge.
    ///
    /// Example: ...d c b a | b c d e...
    Reflect101,

    /// Wrap the content from the opposite side.
    ///
    /// Example: ...d c b a | w x y z...
    Wrap,
}

/// The boundary policy used by [`crate::Image::get_pixel`] and the convolution engine
/// unless a mode is given explicitly.
pub const DEFAULT_BORDER_MODE: BorderMode = BorderMode::Replicate;

impl BorderMode {
    /// All the supported border modes.
    pub const ALL: [BorderMode; 4] = [
        BorderMode::Constant,
        BorderMode::Replicate,
        BorderMode::Reflect101,
        BorderMode::Wrap,
    ];

    #[inline]
    fn reflect101(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i;
            } else {
                i = 2 * len - i - 2;
            }
        }
        i as usize
    }

    #[inline]
    fn wrap(i: isize, len: usize) -> usize {
        let len = len as isize;
        ((i % len + len) % len) as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the border mode.
    ///
    /// # Arguments
    ///
    /// * `i` - The (possibly out-of-range) coordinate.
    /// * `len` - The valid length of the dimension, must be positive.
    ///
    /// # Returns
    ///
    /// The mapped index, or `None` when the mode is [`BorderMode::Constant`] and `i` is
    /// outside the image.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }
        match self {
            BorderMode::Constant => None,
            BorderMode::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
            BorderMode::Reflect101 => Some(Self::reflect101(i, len)),
            BorderMode::Wrap => Some(Self::wrap(i, len)),
        }
    }

    /// The lowercase name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            BorderMode::Constant => "constant",
            BorderMode::Replicate => "replicate",
            BorderMode::Reflect101 => "reflect101",
            BorderMode::Wrap => "wrap",
        }
    }
}

impl std::fmt::Display for BorderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BorderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BorderMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s.to_lowercase())
            .ok_or_else(|| {
                let names: Vec<_> = BorderMode::ALL.iter().map(|m| m.name()).collect();
                format!("unknown border mode `{s}`, expected one of: {}", names.join(", "))
            })
    }
}
