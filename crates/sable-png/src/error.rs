use std::fmt::{Debug, Formatter};

use sable_core::bytestream::ByteIoError;

pub enum PngErrors {
    GenericStatic(&'static str),
    Generic(String),
    /// The image uses a feature the encoder deliberately
    /// does not implement
    Unsupported(&'static str),
    /// Pixel buffer does not match the dimensions,
    /// expected and found sizes
    WrongDataSize(usize, usize),
    IoErrors(ByteIoError)
}

impl Debug for PngErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::Generic(val) => writeln!(f, "{val}"),
            Self::Unsupported(val) => writeln!(f, "Unsupported: {val}"),
            Self::WrongDataSize(expected, found) => {
                writeln!(f, "Wrong data size, expected {expected} but found {found}")
            }
            Self::IoErrors(err) => writeln!(f, "{err:?}")
        }
    }
}

impl From<&'static str> for PngErrors {
    fn from(val: &'static str) -> Self {
        Self::GenericStatic(val)
    }
}

impl From<String> for PngErrors {
    fn from(val: String) -> Self {
        Self::Generic(val)
    }
}

impl From<ByteIoError> for PngErrors {
    fn from(val: ByteIoError) -> Self {
        Self::IoErrors(val)
    }
}
