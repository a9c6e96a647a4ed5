//! Image colorspace information and utilities

#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ColorSpace {
    RGB,
    RGBA,
    Luma,
    LumaA,
    Unknown
}

impl ColorSpace {
    pub const fn num_components(&self) -> usize {
        match self {
            Self::RGB => 3,
            Self::RGBA => 4,
            Self::Luma => 1,
            Self::LumaA => 2,
            Self::Unknown => 0
        }
    }

    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::RGBA | Self::LumaA)
    }
}

/// All colorspaces supported by the library
pub static ALL_COLORSPACES: [ColorSpace; 4] = [
    ColorSpace::RGB,
    ColorSpace::RGBA,
    ColorSpace::Luma,
    ColorSpace::LumaA
];
