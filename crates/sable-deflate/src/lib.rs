//! An unassuming deflate encoder (and a partial decoder).
//!
//! This crate implements the compression side of RFC 1950/1951 from
//! scratch: LZ77 match finding over a 32 KiB window, canonical
//! huffman construction (fixed and dynamic alphabets), bit-packed
//! block emission and the zlib container with its Adler-32 trailer.
//!
//! Decompression handles stored and fixed-huffman blocks, enough to
//! round-trip this crate's own output at the lower levels; dynamic
//! block decoding is deliberately out of scope.
//!
//! # Usage
//!
//! Compressing to a zlib stream:
//!
//! ```
//! use sable_deflate::DeflateEncoder;
//!
//! let compressed = DeflateEncoder::new(b"hello world").encode_zlib();
//! ```
//!
//! Choosing a strategy and level:
//!
//! ```
//! use sable_deflate::{DeflateEncoder, DeflateEncodingOptions, DeflateEncodingStrategy};
//!
//! let options = DeflateEncodingOptions::default()
//!     .set_strategy(DeflateEncodingStrategy::FixedHuffman)
//!     .set_level(9);
//! let compressed = DeflateEncoder::new_with_options(b"hello world", options).encode_zlib();
//! ```
//!
//! Decoding zlib data without confirming the Adler-32 checksum:
//!
//! ```
//! use sable_deflate::{DeflateDecoder, DeflateOptions};
//!
//! let options = DeflateOptions::default().set_confirm_checksum(false);
//! let mut decoder = DeflateDecoder::new_with_options(&[0x78, 0x01], options);
//!
//! let result = decoder.decode_zlib();
//! ```
pub use crate::adler::{adler_combine, calc_adler_hash, Adler32};
pub use crate::decoder::{DeflateDecoder, DeflateOptions};
pub use crate::encoder::{DeflateEncoder, DeflateEncodingOptions, DeflateEncodingStrategy};
pub use crate::lz77::Token;

mod adler;
mod bitstream;
mod constants;
mod decoder;
mod encoder;
pub mod errors;
mod huffman;
mod lz77;
mod window;
