/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A PNG encoder
//!
//! This crate assembles valid ISO/IEC 15948:2003 (E) PNG streams for
//! 8-bit truecolor images: the signature, an IHDR chunk, IDAT chunks
//! carrying a zlib stream produced by [`sable_deflate`], and IEND.
//!
//! # Features
//! - From-scratch deflate below, nothing links against zlib
//! - CRC-32 chunk framing
//! - Compression level plumbed through [`EncoderOptions`](sable_core::options::EncoderOptions)
//!
//! # Usage
//!
//! ```
//! use sable_core::bit_depth::BitDepth;
//! use sable_core::colorspace::ColorSpace;
//! use sable_core::options::EncoderOptions;
//! use sable_png::PngEncoder;
//!
//! // a lone red pixel
//! let pixels = [255_u8, 0, 0];
//!
//! let options = EncoderOptions::default()
//!     .set_width(1)
//!     .set_height(1)
//!     .set_colorspace(ColorSpace::RGB)
//!     .set_depth(BitDepth::Eight);
//!
//! let mut sink = vec![];
//! PngEncoder::new(&pixels, options).encode(&mut sink).unwrap();
//! ```
//!
//! # Limitations
//! Color types other than truecolor RGB, 16 bit depth, interlacing
//! and ancillary chunks are not implemented.

pub use sable_core;

pub use crate::encoder::PngEncoder;
pub use crate::enums::FilterMethod;
pub use crate::error::PngErrors;

mod constants;
mod crc;
mod encoder;
mod enums;
pub mod error;
mod headers;
