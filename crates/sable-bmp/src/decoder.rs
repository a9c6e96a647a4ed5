/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::{trace, warn};
use sable_core::bytestream::{ByteReader, ByteReaderTrait};
use sable_core::colorspace::ColorSpace;
use sable_core::options::DecoderOptions;

use crate::errors::BmpDecoderErrors;

/// Size of the BITMAPINFOHEADER DIB header, the only variant
/// this decoder reads.
const DIB_HEADER_SIZE: u32 = 40;
/// Size of the file header preceding the DIB header.
const FILE_HEADER_SIZE: usize = 14;

/// Probe some bytes to see
/// if they consist of a BMP image this decoder can read
pub fn probe_bmp(bytes: &[u8]) -> bool {
    if let Some(magic_bytes) = bytes.get(0..2) {
        if magic_bytes == b"BM" {
            // skip file_size   -> 4
            // skip reserved    -> 4
            // skip data offset -> 4
            // read DIB size
            if let Some(dib_size) = bytes.get(FILE_HEADER_SIZE) {
                return u32::from(*dib_size) == DIB_HEADER_SIZE;
            }
        }
    }
    false
}

/// A 24 bits-per-pixel BMP decoder.
///
/// Produces tightly packed RGB bytes, row major with the top row
/// first, whatever the row order stored in the file.
///
/// # Usage
/// ```
/// use sable_bmp::BmpDecoder;
///
/// let mut decoder = BmpDecoder::new(&b"not a bmp"[..]);
/// assert!(decoder.decode().is_err());
/// ```
pub struct BmpDecoder<T>
where
    T: ByteReaderTrait
{
    bytes:           ByteReader<T>,
    options:         DecoderOptions,
    width:           usize,
    height:          usize,
    flip_vertically: bool,
    data_offset:     usize,
    decoded_headers: bool
}

impl<T> BmpDecoder<T>
where
    T: ByteReaderTrait
{
    /// Create a new bmp decoder that reads data from `data`
    pub fn new(data: T) -> BmpDecoder<T> {
        BmpDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder instance with specified options
    pub fn new_with_options(data: T, options: DecoderOptions) -> BmpDecoder<T> {
        BmpDecoder {
            bytes: ByteReader::new(data),
            options,
            width: 0,
            height: 0,
            flip_vertically: false,
            data_offset: 0,
            decoded_headers: false
        }
    }

    /// Decode headers stored in the bmp file and store
    /// information in the decode context
    ///
    /// After calling this, the width, height and colorspace
    /// accessors return their real values
    pub fn decode_headers(&mut self) -> Result<(), BmpDecoderErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        if self.bytes.get_u8_err()? != b'B' || self.bytes.get_u8_err()? != b'M' {
            return Err(BmpDecoderErrors::InvalidMagicBytes);
        }
        // 4 bytes file size, 4 reserved bytes
        self.bytes.skip(8);

        self.data_offset = self.bytes.get_u32_le_err()? as usize;

        let dib_size = self.bytes.get_u32_le_err()?;
        if dib_size != DIB_HEADER_SIZE {
            return Err(BmpDecoderErrors::Unsupported(
                "only the 40 byte BITMAPINFOHEADER variant is handled"
            ));
        }

        let width = self.bytes.get_u32_le_err()? as i32;
        let height = self.bytes.get_u32_le_err()? as i32;

        if width <= 0 {
            return Err(BmpDecoderErrors::GenericStatic("width cannot be zero or negative"));
        }
        if height == 0 {
            return Err(BmpDecoderErrors::GenericStatic("height cannot be zero"));
        }
        // positive heights mean the rows are stored bottom up
        self.flip_vertically = height > 0;
        self.width = width.unsigned_abs() as usize;
        self.height = height.unsigned_abs() as usize;

        if self.width > self.options.max_width() {
            return Err(BmpDecoderErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                self.width
            ));
        }
        if self.height > self.options.max_height() {
            return Err(BmpDecoderErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                self.height
            ));
        }

        let planes = self.bytes.get_u16_le_err()?;
        if planes != 1 {
            return Err(BmpDecoderErrors::Generic(format!(
                "expected one color plane, found {planes}"
            )));
        }

        let depth = self.bytes.get_u16_le_err()?;
        if depth != 24 {
            return Err(BmpDecoderErrors::Unsupported(
                "only 24 bits per pixel images are handled"
            ));
        }

        let compression = self.bytes.get_u32_le_err()?;
        match compression {
            0 => {}
            4 => {
                return Err(BmpDecoderErrors::Unsupported(
                    "BI_JPEG, an embedded jpeg wearing a bmp header"
                ))
            }
            5 => {
                return Err(BmpDecoderErrors::Unsupported(
                    "BI_PNG, an embedded png wearing a bmp header"
                ))
            }
            _ => {
                return Err(BmpDecoderErrors::Unsupported(
                    "compressed bitmaps are not handled"
                ))
            }
        }
        // image size, resolutions, palette sizes
        self.bytes.skip(20);

        if self.data_offset < self.bytes.position() {
            if self.options.strict_mode() {
                return Err(BmpDecoderErrors::GenericStatic(
                    "pixel data offset points inside the headers"
                ));
            }
            warn!(
                "pixel data offset {} points inside the headers, reading pixels right after them",
                self.data_offset
            );
            self.data_offset = self.bytes.position();
        }

        trace!("Width: {}", self.width);
        trace!("Height: {}", self.height);
        trace!("Flip vertically: {}", self.flip_vertically);

        self.decoded_headers = true;

        Ok(())
    }

    /// Return image dimensions as `(width, height)`, present
    /// after headers have been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            Some((self.width, self.height))
        } else {
            None
        }
    }

    /// Colorspace of the decoded pixels
    pub const fn colorspace(&self) -> Option<ColorSpace> {
        if self.decoded_headers {
            Some(ColorSpace::RGB)
        } else {
            None
        }
    }

    /// Decode the pixel array into top-down row major RGB
    pub fn decode(&mut self) -> Result<Vec<u8>, BmpDecoderErrors> {
        self.decode_headers()?;

        // rows are stored padded to four byte multiples
        let row_stride = (self.width * 3 + 3) & !3;
        let out_row_size = self.width * 3;

        self.bytes
            .skip(self.data_offset.saturating_sub(self.bytes.position()));

        let mut out = vec![0_u8; out_row_size * self.height];

        for row in 0..self.height {
            let src_row = self.bytes.get_as_ref(row_stride)?;

            let dest_row = if self.flip_vertically {
                self.height - 1 - row
            } else {
                row
            };
            let dest = &mut out[dest_row * out_row_size..][..out_row_size];

            // stored as BGR, handed out as RGB
            for (dest_px, src_px) in dest.chunks_exact_mut(3).zip(src_row.chunks_exact(3)) {
                dest_px[0] = src_px[2];
                dest_px[1] = src_px[1];
                dest_px[2] = src_px[0];
            }
        }

        Ok(out)
    }
}
