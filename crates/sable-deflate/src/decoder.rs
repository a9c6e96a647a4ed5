/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A partial inflate implementation.
//!
//! Stored and fixed-huffman blocks decode fully; dynamic-huffman
//! blocks are deliberately out of scope and surface as an
//! unsupported-feature error. The zlib header is always validated and
//! the Adler-32 trailer checked unless the caller opts out.

use crate::adler::calc_adler_hash;
use crate::bitstream::{reverse_bits, BitStreamReader};
use crate::constants::{
    DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_STATIC, DEFLATE_BLOCKTYPE_UNCOMPRESSED,
    DISTANCE_BASE, DISTANCE_EXTRA_BITS, LENGTH_BASE, LENGTH_EXTRA_BITS
};
use crate::errors::DecodeErrorStatus::InsufficientData;
use crate::errors::{DecodeErrorStatus, InflateDecodeErrors};
use crate::huffman::{
    FIXED_DISTANCE_CODES, FIXED_DISTANCE_LENGTHS, FIXED_LITLEN_CODES, FIXED_LITLEN_LENGTHS
};

/// Widest fixed literal/length code.
const FIXED_LITLEN_TABLE_BITS: u8 = 9;
/// Widest fixed distance code.
const FIXED_DISTANCE_TABLE_BITS: u8 = 5;

#[derive(Debug, Copy, Clone)]
pub struct DeflateOptions {
    confirm_checksum: bool,
    limit:            usize,
    size_hint:        usize
}

impl Default for DeflateOptions {
    fn default() -> Self {
        DeflateOptions {
            confirm_checksum: true,
            limit:            usize::MAX,
            size_hint:        37000
        }
    }
}

impl DeflateOptions {
    /// Whether the Adler-32 trailer of a zlib stream is verified
    /// against the decoded bytes
    pub fn set_confirm_checksum(mut self, confirm: bool) -> Self {
        self.confirm_checksum = confirm;
        self
    }

    /// Maximum number of bytes decompression may produce before
    /// giving up
    pub fn set_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Expected output size, used to pre-allocate the output
    pub fn set_size_hint(mut self, hint: usize) -> Self {
        self.size_hint = hint;
        self
    }
}

/// A flat one-level decode table.
///
/// Indexed by the next `table_bits` bits of the stream (bit
/// reversed, as deflate codes arrive); each entry packs
/// `symbol << 8 | code_length`, a zero entry marks an invalid code.
struct DecodeTable {
    entries:    Vec<u32>,
    table_bits: u8
}

impl DecodeTable {
    fn build(lens: &[u8], codes: &[u16], table_bits: u8) -> DecodeTable {
        let mut entries = vec![0_u32; 1 << table_bits];

        for (sym, (len, code)) in lens.iter().zip(codes.iter()).enumerate() {
            if *len == 0 {
                continue;
            }
            debug_assert!(*len <= table_bits);

            // short codes own every table slot sharing their suffix
            let first = usize::from(reverse_bits(*code, *len));
            let stride = 1_usize << *len;
            let entry = (sym as u32) << 8 | u32::from(*len);

            let mut index = first;
            while index < entries.len() {
                entries[index] = entry;
                index += stride;
            }
        }
        DecodeTable {
            entries,
            table_bits
        }
    }

    #[inline(always)]
    fn lookup(&self, stream: &BitStreamReader) -> u32 {
        self.entries[stream.peek_bits(usize::from(self.table_bits))]
    }
}

pub struct DeflateDecoder<'a> {
    data:    &'a [u8],
    options: DeflateOptions
}

impl<'a> DeflateDecoder<'a> {
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a> {
        DeflateDecoder::new_with_options(data, DeflateOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a> {
        DeflateDecoder { data, options }
    }

    /// Decode a zlib stream, validating the header and, unless
    /// disabled, the Adler-32 trailer.
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        if self.data.len()
            < 2 /* zlib header */
            + 4
        /* Adler32 */
        {
            return Err(InflateDecodeErrors::new_with_error(InsufficientData));
        }

        // Zlib flags
        // See https://www.ietf.org/rfc/rfc1950.txt for
        // the RFC
        let cmf = self.data[0];
        let flg = self.data[1];

        let cm = cmf & 0xF;
        let cinfo = cmf >> 4;
        let fdict = (flg >> 5) & 1;

        // confirm we have the right deflate methods
        if cm != 8 {
            if cm == 15 {
                return Err(InflateDecodeErrors::new_with_error(
                    DecodeErrorStatus::Generic(
                        "CM of 15 is reserved by the standard, currently don't know how to handle it"
                    )
                ));
            }
            return Err(InflateDecodeErrors::new_with_error(
                DecodeErrorStatus::GenericStr(format!("Unknown zlib compression method {cm}"))
            ));
        }
        if cinfo > 7 {
            return Err(InflateDecodeErrors::new_with_error(
                DecodeErrorStatus::GenericStr(format!(
                    "Unknown cinfo `{cinfo}` greater than 7, not allowed"
                ))
            ));
        }
        if fdict != 0 {
            return Err(InflateDecodeErrors::new_with_error(
                DecodeErrorStatus::Unsupported("preset dictionaries (FDICT) are not supported")
            ));
        }
        let flag_checks = (u16::from(cmf) * 256) + u16::from(flg);

        if flag_checks % 31 != 0 {
            return Err(InflateDecodeErrors::new_with_error(
                DecodeErrorStatus::Generic("FCHECK integrity not preserved")
            ));
        }

        let payload = &self.data[2..];
        let mut out = Vec::with_capacity(self.options.size_hint);

        let consumed = match self.inflate(payload, &mut out) {
            Ok(consumed) => consumed,
            Err(error) => return Err(InflateDecodeErrors::new(error, out))
        };

        if self.options.confirm_checksum {
            let Some(trailer) = payload.get(consumed..consumed + 4) else {
                return Err(InflateDecodeErrors::new(InsufficientData, out));
            };
            let expected = u32::from_be_bytes(trailer.try_into().unwrap());
            let found = calc_adler_hash(&out);

            if expected != found {
                return Err(InflateDecodeErrors::new(
                    DecodeErrorStatus::MismatchedAdler(expected, found),
                    out
                ));
            }
        }

        Ok(out)
    }

    /// Decode a bare deflate stream.
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        let mut out = Vec::with_capacity(self.options.size_hint);

        match self.inflate(self.data, &mut out) {
            Ok(_) => Ok(out),
            Err(error) => Err(InflateDecodeErrors::new(error, out))
        }
    }

    /// Walk deflate blocks until the final one, appending decoded
    /// bytes to `out`.
    ///
    /// Returns how many payload bytes the deflate stream occupied,
    /// which is where a trailer would start.
    fn inflate(&self, payload: &[u8], out: &mut Vec<u8>) -> Result<usize, DecodeErrorStatus> {
        let mut rest = payload;
        let mut consumed_base = 0_usize;
        let mut stream = BitStreamReader::new(rest);
        let mut fixed_tables: Option<(DecodeTable, DecodeTable)> = None;

        loop {
            stream.refill();
            if !stream.has(3) {
                return Err(InsufficientData);
            }
            let is_last_block = stream.get_bits(1) == 1;
            let block_type = stream.get_bits(2);

            if block_type == DEFLATE_BLOCKTYPE_UNCOMPRESSED {
                /*
                 * The RFC says:
                 *   skip any remaining bits in current partially
                 *   processed byte
                 *   read LEN and NLEN
                 *   copy LEN bytes of data to output
                 */
                stream.align_to_byte();
                stream.refill();

                if !stream.has(32) {
                    return Err(InsufficientData);
                }
                let len = stream.get_bits(16) as usize;
                let nlen = stream.get_bits(16) as usize;

                if len != (!nlen & 0xFFFF) {
                    return Err(DecodeErrorStatus::Generic("LEN and NLEN do not match"));
                }

                // the reader was byte aligned before LEN/NLEN, so its
                // consumed count is exact here
                let start = stream.bytes_consumed();

                let Some(block) = rest.get(start..start + len) else {
                    return Err(InsufficientData);
                };
                out.extend_from_slice(block);

                // restart the bit reader after the raw bytes
                consumed_base += start + len;
                rest = &payload[consumed_base..];
                stream = BitStreamReader::new(rest);
            } else if block_type == DEFLATE_BLOCKTYPE_STATIC {
                let (litlen_table, dist_table) = fixed_tables.get_or_insert_with(|| {
                    (
                        DecodeTable::build(
                            &FIXED_LITLEN_LENGTHS,
                            &FIXED_LITLEN_CODES,
                            FIXED_LITLEN_TABLE_BITS
                        ),
                        DecodeTable::build(
                            &FIXED_DISTANCE_LENGTHS,
                            &FIXED_DISTANCE_CODES,
                            FIXED_DISTANCE_TABLE_BITS
                        )
                    )
                });

                self.inflate_entropy_block(&mut stream, out, litlen_table, dist_table)?;
            } else if block_type == DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN {
                return Err(DecodeErrorStatus::Unsupported(
                    "dynamic huffman blocks are not supported"
                ));
            } else {
                // block type 3 is reserved
                return Err(DecodeErrorStatus::CorruptData);
            }

            if out.len() > self.options.limit {
                return Err(DecodeErrorStatus::OutputLimitExceeded(
                    self.options.limit,
                    out.len()
                ));
            }

            if is_last_block {
                break;
            }
        }

        stream.align_to_byte();
        Ok(consumed_base + stream.bytes_consumed())
    }

    /// Decode literals and matches until the end-of-block symbol.
    fn inflate_entropy_block(
        &self, stream: &mut BitStreamReader, out: &mut Vec<u8>, litlen_table: &DecodeTable,
        dist_table: &DecodeTable
    ) -> Result<(), DecodeErrorStatus> {
        loop {
            // one refill covers a full literal/length symbol, its
            // extra bits, a distance symbol and its extra bits
            stream.refill();

            if out.len() > self.options.limit {
                return Err(DecodeErrorStatus::OutputLimitExceeded(
                    self.options.limit,
                    out.len()
                ));
            }

            let entry = litlen_table.lookup(stream);
            let code_length = (entry & 0xFF) as u8;

            if code_length == 0 {
                return Err(DecodeErrorStatus::CorruptData);
            }
            if !stream.has(code_length) {
                return Err(InsufficientData);
            }
            stream.drop_bits(code_length);

            let sym = (entry >> 8) as usize;

            if sym < 256 {
                out.push(sym as u8);
                continue;
            }
            if sym == 256 {
                return Ok(());
            }
            if sym > 285 {
                // symbols 286 and 287 have fixed codes but may not
                // appear in a stream
                return Err(DecodeErrorStatus::CorruptData);
            }

            let length_index = sym - 257;
            let length_extra = LENGTH_EXTRA_BITS[length_index];

            if !stream.has(length_extra) {
                return Err(InsufficientData);
            }
            let length =
                usize::from(LENGTH_BASE[length_index]) + stream.get_bits(length_extra) as usize;

            let entry = dist_table.lookup(stream);
            let code_length = (entry & 0xFF) as u8;

            if code_length == 0 {
                return Err(DecodeErrorStatus::CorruptData);
            }
            if !stream.has(code_length) {
                return Err(InsufficientData);
            }
            stream.drop_bits(code_length);

            let distance_index = (entry >> 8) as usize;
            let distance_extra = DISTANCE_EXTRA_BITS[distance_index];

            if !stream.has(distance_extra) {
                return Err(InsufficientData);
            }
            let distance = usize::from(DISTANCE_BASE[distance_index])
                + stream.get_bits(distance_extra) as usize;

            if distance > out.len() {
                return Err(DecodeErrorStatus::CorruptData);
            }

            // byte by byte on purpose, a distance smaller than the
            // length copies bytes this match itself produced
            for _ in 0..length {
                out.push(out[out.len() - distance]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{DeflateEncoder, DeflateEncodingOptions, DeflateEncodingStrategy};

    fn zlib_with(data: &[u8], strategy: DeflateEncodingStrategy) -> Vec<u8> {
        let options = DeflateEncodingOptions::default().set_strategy(strategy);
        DeflateEncoder::new_with_options(data, options).encode_zlib()
    }

    fn check_roundtrip(data: &[u8], strategy: DeflateEncodingStrategy) {
        let compressed = zlib_with(data, strategy);
        let decoded = DeflateDecoder::new(&compressed).decode_zlib().unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_stored_roundtrip() {
        let options = DeflateEncodingOptions::default().set_level(0);

        for data in [&b""[..], &b"A"[..], &b"hello stored world"[..]] {
            let compressed = DeflateEncoder::new_with_options(data, options).encode_zlib();
            let decoded = DeflateDecoder::new(&compressed).decode_zlib().unwrap();
            assert_eq!(decoded, data);
        }
    }

    #[test]
    fn test_stored_roundtrip_multiple_blocks() {
        let data: Vec<u8> = (0..200_000_u32).map(|i| (i % 251) as u8).collect();
        let options = DeflateEncodingOptions::default().set_level(0);

        let compressed = DeflateEncoder::new_with_options(&data, options).encode_zlib();
        let decoded = DeflateDecoder::new(&compressed).decode_zlib().unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_fixed_roundtrip() {
        check_roundtrip(b"", DeflateEncodingStrategy::FixedHuffman);
        check_roundtrip(b"a", DeflateEncodingStrategy::FixedHuffman);
        check_roundtrip(b"abababab", DeflateEncodingStrategy::FixedHuffman);
        check_roundtrip(&vec![b'a'; 300], DeflateEncodingStrategy::FixedHuffman);

        let text = b"It was the best of times, it was the worst of times, it was \
                     the age of wisdom, it was the age of foolishness";
        check_roundtrip(text, DeflateEncodingStrategy::FixedHuffman);
    }

    #[test]
    fn test_fixed_roundtrip_all_byte_values() {
        let data: Vec<u8> = (0..=255_u8).cycle().take(4096).collect();
        check_roundtrip(&data, DeflateEncodingStrategy::FixedHuffman);
    }

    #[test]
    fn test_dynamic_blocks_are_rejected() {
        let compressed = zlib_with(b"dynamic block data", DeflateEncodingStrategy::DynamicHuffman);
        let err = DeflateDecoder::new(&compressed).decode_zlib().unwrap_err();

        assert!(matches!(err.error, DecodeErrorStatus::Unsupported(_)));
    }

    #[test]
    fn test_fdict_is_rejected() {
        // CMF 0x78, FLG with FDICT set, FCHECK fixed up
        let mut hdr = (0x78_u16 << 8) | (1 << 5);
        hdr += (31 - hdr % 31) % 31;

        let mut stream = hdr.to_be_bytes().to_vec();
        stream.extend_from_slice(&[0x01, 0x00, 0x00, 0xFF, 0xFF]);
        stream.extend_from_slice(&1_u32.to_be_bytes());

        let err = DeflateDecoder::new(&stream).decode_zlib().unwrap_err();
        assert!(matches!(err.error, DecodeErrorStatus::Unsupported(_)));
    }

    #[test]
    fn test_bad_fcheck_is_rejected() {
        let mut compressed = zlib_with(b"check", DeflateEncodingStrategy::FixedHuffman);
        compressed[1] ^= 0x02;

        let err = DeflateDecoder::new(&compressed).decode_zlib().unwrap_err();
        assert!(matches!(err.error, DecodeErrorStatus::Generic(_)));
    }

    #[test]
    fn test_adler_mismatch_detected() {
        let data = b"stored data with a checksum";
        let options = DeflateEncodingOptions::default().set_level(0);
        let mut compressed = DeflateEncoder::new_with_options(data, options).encode_zlib();

        // corrupt one payload byte, leaving framing intact
        let len = compressed.len();
        compressed[len - 6] ^= 0xFF;

        let err = DeflateDecoder::new(&compressed).decode_zlib().unwrap_err();
        assert!(matches!(err.error, DecodeErrorStatus::MismatchedAdler(_, _)));
    }

    #[test]
    fn test_checksum_confirmation_can_be_disabled() {
        let data = b"no trailer check";
        let options = DeflateEncodingOptions::default().set_level(0);
        let mut compressed = DeflateEncoder::new_with_options(data, options).encode_zlib();

        let len = compressed.len();
        compressed[len - 1] ^= 0xFF; // corrupt the trailer itself

        let decoded = DeflateDecoder::new_with_options(
            &compressed,
            DeflateOptions::default().set_confirm_checksum(false)
        )
        .decode_zlib()
        .unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_truncated_stored_block() {
        let data = b"this stream will be cut short";
        let options = DeflateEncodingOptions::default().set_level(0);
        let compressed = DeflateEncoder::new_with_options(data, options).encode_zlib();

        let err = DeflateDecoder::new(&compressed[..10]).decode_zlib().unwrap_err();
        assert!(matches!(err.error, DecodeErrorStatus::InsufficientData));
    }

    #[test]
    fn test_output_limit_is_enforced() {
        let data = vec![b'x'; 100_000];
        let compressed = zlib_with(&data, DeflateEncodingStrategy::FixedHuffman);

        let err = DeflateDecoder::new_with_options(
            &compressed,
            DeflateOptions::default().set_limit(1000)
        )
        .decode_zlib()
        .unwrap_err();
        assert!(matches!(
            err.error,
            DecodeErrorStatus::OutputLimitExceeded(_, _)
        ));
    }

    #[test]
    fn test_raw_deflate_roundtrip() {
        let data = b"raw deflate without any container";
        let options =
            DeflateEncodingOptions::default().set_strategy(DeflateEncodingStrategy::FixedHuffman);
        let compressed = DeflateEncoder::new_with_options(data, options).encode_raw();

        let decoded = DeflateDecoder::new(&compressed).decode_deflate().unwrap();
        assert_eq!(decoded, data);
    }
}
