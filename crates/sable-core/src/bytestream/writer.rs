/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::bytestream::{ByteIoError, ByteWriterTrait};

enum Mode {
    // Big endian
    BE,
    // Little Endian
    LE
}

/// Encapsulates a simple byte writer with
/// support for endian aware writes
pub struct ByteWriter<T: ByteWriterTrait> {
    sink:          T,
    bytes_written: usize
}

impl<T: ByteWriterTrait> ByteWriter<T> {
    /// Create a new bytestream writer.
    ///
    /// Bytes are written from the start to the end and no
    /// assumptions are made of the nature of the underlying sink
    pub fn new(sink: T) -> ByteWriter<T> {
        ByteWriter {
            sink,
            bytes_written: 0
        }
    }

    /// Write bytes from the buf into the bytestream
    /// and return how many bytes were written
    ///
    /// If you want to be sure that all bytes were written, see
    /// [`write_all`](Self::write_all)
    #[inline]
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        let bytes_written = self.sink.write_bytes(buf)?;
        self.bytes_written += bytes_written;
        Ok(bytes_written)
    }

    /// Write all bytes from `buf` into the bytestream, erroring
    /// out if not all bytes could be written
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.sink.write_all_bytes(buf)?;
        self.bytes_written += buf.len();
        Ok(())
    }

    #[inline]
    pub fn write_const_bytes<const N: usize>(&mut self, bytes: &[u8; N]) -> Result<(), ByteIoError> {
        self.sink.write_const_bytes(bytes)?;
        self.bytes_written += N;
        Ok(())
    }

    /// Write a single byte into the bytestream or error out
    /// if there is not enough space
    #[inline]
    pub fn write_u8_err(&mut self, byte: u8) -> Result<(), ByteIoError> {
        self.write_const_bytes(&[byte])
    }

    /// Write a single byte into the bytestream, ignoring
    /// a sink that cannot take it
    #[inline]
    pub fn write_u8(&mut self, byte: u8) {
        let _ = self.write_const_bytes(&[byte]);
    }

    /// Number of bytes written so far
    pub const fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Hint to the sink that `additional` bytes are coming
    pub fn reserve(&mut self, additional: usize) -> Result<(), ByteIoError> {
        self.sink.pre_allocate_hint(additional)
    }

    /// Destroy this writer returning the underlying sink
    pub fn inner(self) -> T {
        self.sink
    }
}

macro_rules! write_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$name5:tt,$int_type:tt) => {
        impl<T: ByteWriterTrait> ByteWriter<T> {
            #[inline(always)]
            fn $name(&mut self, value: $int_type, mode: Mode) -> Result<(), ByteIoError> {
                let bytes = match mode {
                    Mode::BE => value.to_be_bytes(),
                    Mode::LE => value.to_le_bytes()
                };
                self.write_const_bytes(&bytes)
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying sink cannot support a ",stringify!($int_type)," write.")]
            #[inline]
            pub fn $name2(&mut self, value: $int_type) -> Result<(), ByteIoError> {
                self.$name(value, Mode::BE)
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying sink cannot support a ",stringify!($int_type)," write.")]
            #[inline]
            pub fn $name3(&mut self, value: $int_type) -> Result<(), ByteIoError> {
                self.$name(value, Mode::LE)
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Ignoring a sink that cannot take the write.")]
            #[inline]
            pub fn $name4(&mut self, value: $int_type) {
                let _ = self.$name(value, Mode::BE);
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Ignoring a sink that cannot take the write.")]
            #[inline]
            pub fn $name5(&mut self, value: $int_type) {
                let _ = self.$name(value, Mode::LE);
            }
        }
    };
}

write_single_type!(
    write_u16_inner,
    write_u16_be_err,
    write_u16_le_err,
    write_u16_be,
    write_u16_le,
    u16
);

write_single_type!(
    write_u32_inner,
    write_u32_be_err,
    write_u32_le_err,
    write_u32_be,
    write_u32_le,
    u32
);

write_single_type!(
    write_u64_inner,
    write_u64_be_err,
    write_u64_le_err,
    write_u64_be,
    write_u64_le,
    u64
);
