//! Image bit depth information

/// The image bit depth.
///
/// Only eight bit depth is currently encodable, sixteen is
/// kept around so that readers can name what they reject.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum BitDepth {
    /// Eight bit depth.
    ///
    /// Images with such bit depth use [`u8`] to store
    /// pixels and use the whole range from 0-255.
    Eight,
    /// Sixteen bit depth.
    ///
    /// Images with such bit depths use [`u16`] to store values
    /// and use the whole range i.e 0-65535
    Sixteen,
    /// Bit depth information is unknown
    Unknown
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::Unknown
    }
}

impl BitDepth {
    /// Number of bits a pixel sample occupies
    pub const fn bit_size(&self) -> usize {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
            Self::Unknown => 0
        }
    }

    /// Number of bytes a pixel sample occupies
    pub const fn size_of(&self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
            Self::Unknown => 0
        }
    }
}
