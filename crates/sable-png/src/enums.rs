#![allow(dead_code)]
#![allow(clippy::upper_case_acronyms)]

/// Chunk types the encoder emits, see
/// https://www.w3.org/TR/2003/REC-PNG-20031110/ table 5.3
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngChunkType {
    IHDR,
    IDAT,
    IEND
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterMethod {
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl Default for FilterMethod {
    fn default() -> Self {
        FilterMethod::None
    }
}

impl FilterMethod {
    pub const fn to_int(self) -> u8 {
        match self {
            FilterMethod::None => 0,
            FilterMethod::Sub => 1,
            FilterMethod::Up => 2,
            FilterMethod::Average => 3,
            FilterMethod::Paeth => 4
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColor {
    Luma,
    Palette,
    LumaA,
    RGB,
    RGBA,
    Unknown
}

impl PngColor {
    pub(crate) const fn to_int(self) -> u8 {
        match self {
            PngColor::Luma => 0,
            PngColor::RGB => 2,
            PngColor::Palette => 3,
            PngColor::LumaA => 4,
            PngColor::RGBA => 6,
            PngColor::Unknown => u8::MAX
        }
    }
}
