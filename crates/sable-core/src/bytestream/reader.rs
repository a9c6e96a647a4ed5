/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Formatter};

use crate::bytestream::ByteReaderTrait;

/// Errors arising from the byte reader and writer
pub enum ByteIoError {
    /// Not enough bytes to satisfy a read
    // requested, available
    NotEnoughBytes(usize, usize),
    /// The output buffer is too small to write the bytes
    NotEnoughBuffer(usize, usize),
    /// An error that may occur randomly
    Generic(&'static str)
}

impl Debug for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteIoError::NotEnoughBytes(expected, found) => {
                writeln!(f, "Not enough bytes, expected {expected} but found {found}")
            }
            ByteIoError::NotEnoughBuffer(expected, found) => {
                writeln!(
                    f,
                    "Not enough buffer to write {expected} bytes, buffer size is {found}"
                )
            }
            ByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
        }
    }
}

impl From<&'static str> for ByteIoError {
    fn from(value: &'static str) -> Self {
        ByteIoError::Generic(value)
    }
}

enum Mode {
    // Big endian
    BE,
    // Little Endian
    LE
}

/// An endian aware cursor over an in memory byte source
///
/// This wraps anything that implements [`ByteReaderTrait`] and
/// extends the core trait methods with utilities like endian
/// aware multi-byte reads, so each format reader does not
/// provide its own.
pub struct ByteReader<T: ByteReaderTrait> {
    source:   T,
    position: usize
}

impl<T: ByteReaderTrait> ByteReader<T> {
    /// Create a new reader from a source
    /// that implements the [`ByteReaderTrait`]
    pub fn new(source: T) -> ByteReader<T> {
        ByteReader {
            source,
            position: 0
        }
    }

    /// Destroy this reader returning the underlying
    /// source of the bytes from which we were reading
    #[inline(always)]
    pub fn consume(self) -> T {
        self.source
    }

    /// Skip ahead ignoring `num` bytes
    #[inline(always)]
    pub fn skip(&mut self, num: usize) {
        self.position = self.position.saturating_add(num);
    }

    /// Move back `num` bytes from the current position
    #[inline(always)]
    pub fn rewind(&mut self, num: usize) {
        self.position = self.position.saturating_sub(num);
    }

    /// Return the current position of the cursor from
    /// the start of the stream
    #[inline(always)]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes that can still be read from the stream
    #[inline]
    pub fn remaining(&self) -> usize {
        self.source.get_len().saturating_sub(self.position)
    }

    /// Return true if at least `num` more bytes can be read
    #[inline]
    pub fn has(&self, num: usize) -> bool {
        self.remaining() >= num
    }

    /// Return true if the cursor consumed every byte in the stream
    #[inline]
    pub fn eof(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a single byte, returning zero if the stream
    /// is exhausted
    ///
    /// Should be combined with [`has`](Self::has)
    #[inline(always)]
    pub fn get_u8(&mut self) -> u8 {
        match self.source.get_byte(self.position) {
            Some(byte) => {
                self.position += 1;
                *byte
            }
            None => 0
        }
    }

    /// Read a single byte, erroring out if the stream
    /// is exhausted
    #[inline]
    pub fn get_u8_err(&mut self) -> Result<u8, ByteIoError> {
        match self.source.get_byte(self.position) {
            Some(byte) => {
                self.position += 1;
                Ok(*byte)
            }
            None => Err(ByteIoError::NotEnoughBytes(1, 0))
        }
    }

    /// Return a reference to `num` bytes from the current position
    /// advancing the cursor past them
    #[inline]
    pub fn get_as_ref(&mut self, num: usize) -> Result<&[u8], ByteIoError> {
        match self.source.get_slice(self.position..self.position + num) {
            Some(slice) => {
                self.position += num;
                Ok(slice)
            }
            None => Err(ByteIoError::NotEnoughBytes(num, self.remaining()))
        }
    }

    /// Read a fixed amount of bytes returning them
    /// in an array, erroring out when the stream cannot
    /// satisfy the read
    #[inline]
    pub fn get_fixed_bytes_or_err<const N: usize>(&mut self) -> Result<[u8; N], ByteIoError> {
        let mut bytes = [0_u8; N];

        match self.source.get_slice(self.position..self.position + N) {
            Some(slice) => {
                bytes.copy_from_slice(slice);
                self.position += N;
                Ok(bytes)
            }
            None => Err(ByteIoError::NotEnoughBytes(N, self.remaining()))
        }
    }

    /// Copy every byte left in the stream into `sink`
    pub fn read_remaining(&mut self, sink: &mut Vec<u8>) -> usize {
        let len = self.source.get_len();
        if let Some(slice) = self.source.get_slice(self.position..len) {
            sink.extend_from_slice(slice);
            self.position = len;
            return slice.len();
        }
        0
    }
}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$name5:tt,$int_type:tt) => {
        impl<T: ByteReaderTrait> ByteReader<T> {
            #[inline(always)]
            fn $name(&mut self, mode: Mode) -> Result<$int_type, ByteIoError> {
                const SIZE: usize = core::mem::size_of::<$int_type>();

                let bytes = self.get_fixed_bytes_or_err::<SIZE>()?;

                Ok(match mode {
                    Mode::BE => $int_type::from_be_bytes(bytes),
                    Mode::LE => $int_type::from_le_bytes(bytes)
                })
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning zero if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name2(&mut self) -> $int_type {
                self.$name(Mode::BE).unwrap_or(0)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning zero if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name3(&mut self) -> $int_type {
                self.$name(Mode::LE).unwrap_or(0)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name4(&mut self) -> Result<$int_type, ByteIoError> {
                self.$name(Mode::BE)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name5(&mut self) -> Result<$int_type, ByteIoError> {
                self.$name(Mode::LE)
            }
        }
    };
}

get_single_type!(
    get_u16_inner,
    get_u16_be,
    get_u16_le,
    get_u16_be_err,
    get_u16_le_err,
    u16
);
get_single_type!(
    get_u32_inner,
    get_u32_be,
    get_u32_le,
    get_u32_be_err,
    get_u32_le_err,
    u32
);
get_single_type!(
    get_u64_inner,
    get_u64_be,
    get_u64_le,
    get_u64_be_err,
    get_u64_le_err,
    u64
);
