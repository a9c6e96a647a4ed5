/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::trace;
use sable_core::bit_depth::BitDepth;
use sable_core::bytestream::{ByteWriter, ByteWriterTrait};
use sable_core::colorspace::ColorSpace;
use sable_core::options::EncoderOptions;
use sable_deflate::{DeflateEncoder, DeflateEncodingOptions};

use crate::constants::{IDAT_CHUNK_SIZE, PNG_SIGNATURE};
use crate::enums::{FilterMethod, PngChunkType};
use crate::error::PngErrors;
use crate::headers::writers::{write_chunk, write_header_fn, write_ihdr, write_iend};

/// A single chunk in flight.
pub(crate) struct PngChunk {
    pub length:     usize,
    #[allow(dead_code)]
    pub chunk_type: PngChunkType,
    pub chunk:      [u8; 4]
}

/// Encodes an 8-bit RGB pixel buffer into a PNG stream.
///
/// Each scanline gets a filter-type byte of zero prepended and the
/// filtered stream is deflated into 8 KiB IDAT chunks.
pub struct PngEncoder<'a> {
    pub(crate) options: EncoderOptions,
    data:               &'a [u8],
    row_filter:         FilterMethod,
    encoded_chunks:     Vec<u8>,
    filtered_scanlines: Vec<u8>
}

impl<'a> PngEncoder<'a> {
    /// Create a new encoder that can encode `data` into a PNG stream.
    ///
    /// `data` is expected to be tightly packed RGB, row major, top
    /// row first.
    pub fn new(data: &'a [u8], options: EncoderOptions) -> PngEncoder<'a> {
        PngEncoder {
            options,
            data,
            row_filter: FilterMethod::None,
            encoded_chunks: vec![],
            filtered_scanlines: vec![]
        }
    }

    fn check_options(&self) -> Result<(), PngErrors> {
        if self.options.colorspace() != ColorSpace::RGB {
            return Err(PngErrors::Unsupported(
                "only the RGB colorspace (color type 2) can be encoded"
            ));
        }
        if self.options.depth() != BitDepth::Eight {
            return Err(PngErrors::Unsupported("only eight bit depth can be encoded"));
        }
        if self.options.width() == 0 || self.options.height() == 0 {
            return Err(PngErrors::GenericStatic("width or height cannot be zero"));
        }

        let expected_data_size = self
            .options
            .width()
            .checked_mul(self.options.height())
            .and_then(|size| size.checked_mul(self.options.colorspace().num_components()))
            .and_then(|size| size.checked_mul(self.options.depth().size_of()))
            .ok_or(PngErrors::GenericStatic("image dimensions overflow"))?;

        if self.data.len() != expected_data_size {
            return Err(PngErrors::WrongDataSize(expected_data_size, self.data.len()));
        }
        Ok(())
    }

    /// Encode the image, writing the stream into `sink` and
    /// returning the number of bytes written.
    pub fn encode<T: ByteWriterTrait>(&mut self, sink: T) -> Result<usize, PngErrors> {
        self.check_options()?;

        let mut writer = ByteWriter::new(sink);
        writer.reserve(self.data.len() / 2 + 128)?;

        self.encode_headers(&mut writer)?;

        self.add_filters();

        self.write_idat_chunks(&mut writer)?;

        write_header_fn(self, &mut writer, b"IEND", write_iend)?;

        trace!(
            "encoded {}x{} png into {} bytes",
            self.options.width(),
            self.options.height(),
            writer.bytes_written()
        );

        Ok(writer.bytes_written())
    }

    fn encode_headers<T: ByteWriterTrait>(
        &self, writer: &mut ByteWriter<T>
    ) -> Result<(), PngErrors> {
        // signature
        writer.write_u64_be_err(PNG_SIGNATURE)?;
        // ihdr
        write_header_fn(self, writer, b"IHDR", write_ihdr)?;
        Ok(())
    }

    const fn scanline_size(&self) -> usize {
        self.options.width()
            * self.options.depth().size_of()
            * self.options.colorspace().num_components()
    }

    /// Prepend the filter type byte to every scanline and deflate the
    /// concatenation of all filtered rows.
    fn add_filters(&mut self) {
        let scanline_size = self.scanline_size();

        self.filtered_scanlines
            .reserve((scanline_size + 1) * self.options.height());

        for scanline in self
            .data
            .chunks_exact(scanline_size)
            .take(self.options.height())
        {
            self.filtered_scanlines.push(self.row_filter.to_int());
            self.filtered_scanlines.extend_from_slice(scanline);
        }

        let deflate_options = DeflateEncodingOptions::default().set_level(self.options.level());

        self.encoded_chunks =
            DeflateEncoder::new_with_options(&self.filtered_scanlines, deflate_options)
                .encode_zlib();
    }

    fn write_idat_chunks<T: ByteWriterTrait>(
        &self, writer: &mut ByteWriter<T>
    ) -> Result<(), PngErrors> {
        debug_assert!(!self.encoded_chunks.is_empty());
        // Most decoders love data in 8KB chunks, probably because
        // libpng emits that by default, so let's emulate that
        for chunk in self.encoded_chunks.chunks(IDAT_CHUNK_SIZE) {
            let chunk_type = PngChunk {
                length:     chunk.len(),
                chunk_type: PngChunkType::IDAT,
                chunk:      *b"IDAT"
            };
            write_chunk(chunk_type, chunk, writer)?;
        }
        Ok(())
    }
}
