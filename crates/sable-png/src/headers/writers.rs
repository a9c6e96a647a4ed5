/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use sable_core::bytestream::{ByteIoError, ByteWriter, ByteWriterTrait};
use sable_core::colorspace::ColorSpace;

use crate::crc::{calc_crc, calc_crc_with_bytes};
use crate::encoder::{PngChunk, PngEncoder};
use crate::enums::PngColor;

pub(crate) fn write_ihdr(ctx: &PngEncoder, output: &mut ByteWriter<&mut Vec<u8>>) {
    // width and height
    output.write_u32_be(ctx.options.width() as u32);
    output.write_u32_be(ctx.options.height() as u32);
    // depth
    output.write_u8(ctx.options.depth().bit_size() as u8);
    // color type
    let color = match ctx.options.colorspace() {
        ColorSpace::Luma => PngColor::Luma,
        ColorSpace::RGB => PngColor::RGB,
        ColorSpace::LumaA => PngColor::LumaA,
        ColorSpace::RGBA => PngColor::RGBA,
        _ => PngColor::Unknown
    };
    output.write_u8(color.to_int());
    // compression method, always deflate
    output.write_u8(0);
    // filter method, always zero
    output.write_u8(0);
    // interlace method, always standard
    output.write_u8(0);
}

// iend is a no-op
pub(crate) fn write_iend(_: &PngEncoder, _: &mut ByteWriter<&mut Vec<u8>>) {}

/// Write the boilerplate around one png chunk.
///
/// It writes the length, chunk type, calls a function to write the
/// data and then calculates the CRC for that chunk and writes it.
///
/// This should be called with the appropriate inner function to
/// write the data
pub(crate) fn write_header_fn<T, F>(
    ctx: &PngEncoder, writer: &mut ByteWriter<T>, name: &[u8; 4], func: F
) -> Result<(), ByteIoError>
where
    T: ByteWriterTrait,
    F: Fn(&PngEncoder, &mut ByteWriter<&mut Vec<u8>>)
{
    // chunk lengths can't be known before the data is written, so the
    // chunk goes through a scratch buffer whose length field is patched
    // afterwards
    //
    // format
    // length - chunk type - [data] - crc
    let mut temp_space = Vec::with_capacity(16);
    // space for length
    temp_space.extend_from_slice(&[0; 4]);

    let mut local_writer = ByteWriter::new(&mut temp_space);
    local_writer.write_all(name)?;
    // call underlying function
    (func)(ctx, &mut local_writer);

    let bytes_written = local_writer.bytes_written();
    // patch in the length, less the chunk name
    temp_space[0..4].copy_from_slice(&(bytes_written as u32 - 4).to_be_bytes());

    // crc covers type and data, never the length
    let crc = calc_crc(&temp_space[4..]);
    temp_space.extend_from_slice(&crc.to_be_bytes());

    writer.write_all(&temp_space)
}

/// Write a chunk whose payload already exists as a byte slice.
pub(crate) fn write_chunk<T: ByteWriterTrait>(
    chunk: PngChunk, data: &[u8], writer: &mut ByteWriter<T>
) -> Result<(), ByteIoError> {
    // length
    writer.write_u32_be_err(chunk.length as u32)?;
    // chunk name
    writer.write_all(&chunk.chunk)?;
    // chunk data
    writer.write_all(data)?;
    // crc is a continuous function, so crc the chunk name first and
    // feed the running state to the data pass
    //
    // equal to crc(chunk.chunk + data)
    let crc = calc_crc_with_bytes(&chunk.chunk, u32::MAX);
    let crc = !calc_crc_with_bytes(data, crc);
    writer.write_u32_be_err(crc)?;
    Ok(())
}
