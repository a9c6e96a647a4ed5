/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A thin BMP decoder
//!
//! This crate reads the common uncompressed 24 bits-per-pixel BMP
//! flavor (BITMAPINFOHEADER, no palette) and hands out top-down
//! row major RGB bytes, which is the layout the PNG encoder wants.
//!
//! # Supported
//! - 24 bpp uncompressed Windows bitmaps, bottom-up or top-down
//!
//! # Unsupported
//! - Palette, RLE, bitfield and OS/2 variants
//! - Embedded PNG and JPEGs (`BI_PNG`, `BI_JPEG`)
//!
//! # Usage
//! ```no_run
//! use sable_bmp::BmpDecoder;
//!
//! let file = std::fs::read("image.bmp").unwrap();
//! let pixels = BmpDecoder::new(&file[..]).decode().unwrap();
//! ```

pub use sable_core;

pub use crate::decoder::{probe_bmp, BmpDecoder};
pub use crate::errors::BmpDecoderErrors;

mod decoder;
mod errors;
