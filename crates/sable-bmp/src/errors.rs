/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Formatter};

use sable_core::bytestream::ByteIoError;

/// BMP errors that can occur during decoding
#[non_exhaustive]
pub enum BmpDecoderErrors {
    /// The file/bytes do not start with `BM`
    InvalidMagicBytes,
    /// Generic message
    GenericStatic(&'static str),
    /// Generic allocated message
    Generic(String),
    /// The file uses a BMP variant this decoder deliberately
    /// does not handle
    Unsupported(&'static str),
    /// Too large dimensions for a given width or
    /// height
    TooLargeDimensions(&'static str, usize, usize),
    IoErrors(ByteIoError)
}

impl Debug for BmpDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMagicBytes => {
                writeln!(f, "Invalid magic bytes, file does not start with BM")
            }
            Self::GenericStatic(message) => {
                writeln!(f, "{message}")
            }
            Self::Generic(message) => {
                writeln!(f, "{message}")
            }
            Self::Unsupported(message) => {
                writeln!(f, "Unsupported: {message}")
            }
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            Self::IoErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl From<ByteIoError> for BmpDecoderErrors {
    fn from(value: ByteIoError) -> Self {
        BmpDecoderErrors::IoErrors(value)
    }
}
