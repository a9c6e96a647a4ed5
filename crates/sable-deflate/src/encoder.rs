/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The deflate block writer and zlib container.
//!
//! Input bytes are tokenized once; the block writer then renders the
//! token stream as a stored, fixed-huffman or dynamic-huffman block
//! (or, for the default strategy, whichever of the three comes out
//! smallest) and wraps the result in the RFC 1950 container.

use log::trace;

use crate::adler::calc_adler_hash;
use crate::bitstream::BitStreamWriter;
use crate::constants::{
    distance_symbol, length_symbol, DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_STATIC,
    DEFLATE_BLOCKTYPE_UNCOMPRESSED, DEFLATE_END_OF_BLOCK, DEFLATE_MAX_CODEWORD_LENGTH,
    DEFLATE_MAX_PRE_CODEWORD_LEN, DEFLATE_NUM_PRECODE_SYMS, DEFLATE_PRECODE_LENS_PERMUTATION,
    DEFLATE_WINDOW_SIZE
};
use crate::huffman::{
    build_codes, build_lengths, FIXED_DISTANCE_CODES, FIXED_DISTANCE_LENGTHS, FIXED_LITLEN_CODES,
    FIXED_LITLEN_LENGTHS
};
use crate::lz77::{tokenize, Token, TokenStream};

/// Per-candidate search effort for each compression level.
static LEVEL_MAX_CHAIN: [usize; 9] = [8, 16, 32, 64, 128, 256, 512, 1024, 4096];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeflateEncodingStrategy {
    /// Stored blocks only.
    NoCompression,
    /// LZ77 plus the built-in huffman alphabets.
    FixedHuffman,
    /// LZ77 plus per-stream transmitted huffman alphabets.
    DynamicHuffman,
    /// Render whichever block type is smallest.
    Auto
}

#[derive(Debug, Copy, Clone)]
pub struct DeflateEncodingOptions {
    strategy:    DeflateEncodingStrategy,
    level:       i32,
    window_bits: u8
}

impl Default for DeflateEncodingOptions {
    fn default() -> Self {
        DeflateEncodingOptions {
            strategy:    DeflateEncodingStrategy::Auto,
            level:       -1,
            window_bits: 15
        }
    }
}

impl DeflateEncodingOptions {
    pub const fn strategy(&self) -> DeflateEncodingStrategy {
        self.strategy
    }

    pub const fn level(&self) -> i32 {
        self.level
    }

    pub const fn window_bits(&self) -> u8 {
        self.window_bits
    }

    pub fn set_strategy(mut self, strategy: DeflateEncodingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the compression level.
    ///
    /// `-1` picks the library default (6), `0` stores without
    /// compression. Values outside `-1..=9` are clamped.
    pub fn set_level(mut self, level: i32) -> Self {
        self.level = level.clamp(-1, 9);
        self
    }

    /// Set the window size as a power of two exponent.
    ///
    /// Values outside `9..=15` are clamped.
    pub fn set_window_bits(mut self, window_bits: u8) -> Self {
        self.window_bits = window_bits.clamp(9, 15);
        self
    }
}

pub struct DeflateEncoder<'a> {
    data:    &'a [u8],
    options: DeflateEncodingOptions
}

impl<'a> DeflateEncoder<'a> {
    /// Create a new deflate encoder with default options.
    pub fn new(data: &'a [u8]) -> DeflateEncoder<'a> {
        DeflateEncoder::new_with_options(data, DeflateEncodingOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DeflateEncodingOptions) -> DeflateEncoder<'a> {
        DeflateEncoder { data, options }
    }

    fn effective_level(&self) -> u8 {
        match self.options.level {
            -1 => 6,
            level => level as u8
        }
    }

    fn effective_strategy(&self) -> DeflateEncodingStrategy {
        if self.effective_level() == 0 {
            return DeflateEncodingStrategy::NoCompression;
        }
        self.options.strategy
    }

    /// Encode the raw deflate stream, without the zlib container.
    pub fn encode_raw(&mut self) -> Vec<u8> {
        match self.effective_strategy() {
            DeflateEncodingStrategy::NoCompression => self.encode_no_compression(),
            DeflateEncodingStrategy::FixedHuffman => {
                let stream = self.tokenize_input();
                render_fixed_block(&stream)
            }
            DeflateEncodingStrategy::DynamicHuffman => {
                let stream = self.tokenize_input();
                render_dynamic_block(&stream)
            }
            DeflateEncodingStrategy::Auto => {
                if self.data.is_empty() {
                    return self.encode_no_compression();
                }
                let stream = self.tokenize_input();

                let fixed = render_fixed_block(&stream);
                let dynamic = render_dynamic_block(&stream);
                let stored_size = stored_stream_size(self.data.len());

                trace!(
                    "block sizes: stored {stored_size}, fixed {}, dynamic {}",
                    fixed.len(),
                    dynamic.len()
                );

                if stored_size < fixed.len() && stored_size < dynamic.len() {
                    self.encode_no_compression()
                } else if fixed.len() <= dynamic.len() {
                    fixed
                } else {
                    dynamic
                }
            }
        }
    }

    /// Encode the input as a zlib stream: header, deflate payload,
    /// big endian Adler-32 of the uncompressed input.
    pub fn encode_zlib(&mut self) -> Vec<u8> {
        let deflate = self.encode_raw();

        let mut output = Vec::with_capacity(deflate.len() + 6);
        self.write_zlib_header(&mut output);
        output.extend_from_slice(&deflate);

        let hash = calc_adler_hash(self.data);
        output.extend_from_slice(&hash.to_be_bytes());

        output
    }

    fn write_zlib_header(&self, output: &mut Vec<u8>) {
        const ZLIB_CM_DEFLATE: u16 = 8;

        let cinfo = u16::from(self.options.window_bits - 8);
        let flevel: u16 = match self.effective_level() {
            0 => 0,
            1..=5 => 1,
            6 => 2,
            _ => 3
        };

        let mut hdr = (ZLIB_CM_DEFLATE << 8) | (cinfo << 12);
        hdr |= flevel << 6;
        // FCHECK is the smallest filler making both bytes divisible by 31
        hdr += (31 - hdr % 31) % 31;

        output.extend_from_slice(&hdr.to_be_bytes());
    }

    fn tokenize_input(&self) -> TokenStream {
        let max_chain = LEVEL_MAX_CHAIN[usize::from(self.effective_level()) - 1];
        let max_distance = DEFLATE_WINDOW_SIZE.min(1 << self.options.window_bits);

        tokenize(self.data, max_chain, max_distance)
    }

    /// Encode deflate data blocks with no compression
    fn encode_no_compression(&self) -> Vec<u8> {
        let mut sink = BitStreamWriter::with_capacity(self.data.len() + 16);

        /*
         * If the input is zero-length, we still must output a block in
         * order for the output to be a valid DEFLATE stream.
         */
        if self.data.is_empty() {
            sink.write_bits(1 | (DEFLATE_BLOCKTYPE_UNCOMPRESSED << 1), 3);
            sink.pad_to_byte();
            // LEN and NLEN for an empty block
            sink.write_bytes(&0xFFFF_0000_u32.to_le_bytes());
            return sink.finish();
        }

        let num_blocks = self.data.len().div_ceil(usize::from(u16::MAX));

        for (index, chunk) in self.data.chunks(usize::from(u16::MAX)).enumerate() {
            let bfinal = u64::from(index + 1 == num_blocks);
            let len = chunk.len() as u16;

            sink.write_bits(bfinal | (DEFLATE_BLOCKTYPE_UNCOMPRESSED << 1), 3);
            // the stored header and body are byte aligned
            sink.pad_to_byte();
            sink.write_bytes(&len.to_le_bytes());
            sink.write_bytes(&(!len).to_le_bytes());
            sink.write_bytes(chunk);
        }
        sink.finish()
    }
}

/// Size in bytes of `len` input bytes as stored blocks.
fn stored_stream_size(len: usize) -> usize {
    let num_blocks = len.div_ceil(usize::from(u16::MAX)).max(1);
    len + 5 * num_blocks
}

/// Emit every token plus the end-of-block symbol through the given
/// alphabet tables.
fn write_tokens(
    sink: &mut BitStreamWriter, tokens: &[Token], litlen_codes: &[u16], litlen_lens: &[u8],
    dist_codes: &[u16], dist_lens: &[u8]
) {
    for token in tokens {
        match *token {
            Token::Literal(byte) => {
                let sym = usize::from(byte);

                debug_assert!(litlen_lens[sym] > 0, "literal {byte} has no code");
                sink.write_huffman(litlen_codes[sym], litlen_lens[sym]);
            }
            Token::BackRef { distance, length } => {
                let (length_sym, length_extra, length_base) = length_symbol(length);
                let sym = usize::from(length_sym);

                debug_assert!(litlen_lens[sym] > 0, "length symbol {sym} has no code");
                sink.write_huffman(litlen_codes[sym], litlen_lens[sym]);
                sink.write_bits(u64::from(length - length_base), length_extra);

                let (distance_sym, distance_extra, distance_base) = distance_symbol(distance);
                let sym = usize::from(distance_sym);

                debug_assert!(dist_lens[sym] > 0, "distance symbol {sym} has no code");
                sink.write_huffman(dist_codes[sym], dist_lens[sym]);
                sink.write_bits(u64::from(distance - distance_base), distance_extra);
            }
        }
    }
    sink.write_huffman(
        litlen_codes[DEFLATE_END_OF_BLOCK],
        litlen_lens[DEFLATE_END_OF_BLOCK]
    );
}

/// Render the whole token stream as one final fixed-huffman block.
fn render_fixed_block(stream: &TokenStream) -> Vec<u8> {
    let mut sink = BitStreamWriter::new();

    sink.write_bits(1 | (DEFLATE_BLOCKTYPE_STATIC << 1), 3);
    write_tokens(
        &mut sink,
        &stream.tokens,
        &FIXED_LITLEN_CODES,
        &FIXED_LITLEN_LENGTHS,
        &FIXED_DISTANCE_CODES,
        &FIXED_DISTANCE_LENGTHS
    );
    sink.finish()
}

/// Build code lengths for one transmitted alphabet.
///
/// Forces at least two coded symbols so every transmitted tree is a
/// complete code, which keeps strict inflaters happy on streams that
/// use one or zero symbols of an alphabet.
fn build_tree_lengths(freqs: &[u32], max_len: usize) -> Vec<u8> {
    let used = freqs.iter().filter(|freq| **freq > 0).count();

    if used >= 2 {
        return build_lengths(freqs, max_len);
    }
    let mut padded = freqs.to_vec();
    let mut used = used;
    let mut sym = 0;

    while used < 2 {
        if padded[sym] == 0 {
            padded[sym] = 1;
            used += 1;
        }
        sym += 1;
    }
    build_lengths(&padded, max_len)
}

/// One operation of the code-length code.
struct PrecodeOp {
    symbol:     u8,
    extra:      u64,
    extra_bits: u8
}

/// Run-length encode the concatenated code length sequence with the
/// 16/17/18 escape symbols.
fn run_length_encode(lens: &[u8]) -> Vec<PrecodeOp> {
    let mut ops: Vec<PrecodeOp> = vec![];
    let mut i = 0;

    let mut push = |symbol: u8, extra: u64, extra_bits: u8| {
        ops.push(PrecodeOp {
            symbol,
            extra,
            extra_bits
        });
    };

    while i < lens.len() {
        let value = lens[i];
        let mut run = 1;

        while i + run < lens.len() && lens[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut remaining = run;

            while remaining >= 11 {
                let take = remaining.min(138);
                push(18, (take - 11) as u64, 7);
                remaining -= take;
            }
            if remaining >= 3 {
                push(17, (remaining - 3) as u64, 3);
                remaining = 0;
            }
            while remaining > 0 {
                push(0, 0, 0);
                remaining -= 1;
            }
        } else {
            // first occurrence explicit, repeats through symbol 16
            push(value, 0, 0);
            let mut remaining = run - 1;

            while remaining >= 3 {
                let take = remaining.min(6);
                push(16, (take - 3) as u64, 2);
                remaining -= take;
            }
            while remaining > 0 {
                push(value, 0, 0);
                remaining -= 1;
            }
        }
        i += run;
    }
    ops
}

/// Render the whole token stream as one final dynamic-huffman block.
fn render_dynamic_block(stream: &TokenStream) -> Vec<u8> {
    let litlen_lens = build_tree_lengths(&stream.litlen_freqs, DEFLATE_MAX_CODEWORD_LENGTH);
    let dist_lens = build_tree_lengths(&stream.dist_freqs, DEFLATE_MAX_CODEWORD_LENGTH);

    let litlen_codes = build_codes(&litlen_lens);
    let dist_codes = build_codes(&dist_lens);

    // trim trailing uncoded symbols, HLIT cannot go below 257 and
    // HDIST below 1
    let num_litlen = litlen_lens
        .iter()
        .rposition(|len| *len != 0)
        .map_or(257, |pos| pos + 1)
        .max(257);
    let num_dist = dist_lens
        .iter()
        .rposition(|len| *len != 0)
        .map_or(1, |pos| pos + 1)
        .max(1);

    let mut combined = Vec::with_capacity(num_litlen + num_dist);
    combined.extend_from_slice(&litlen_lens[..num_litlen]);
    combined.extend_from_slice(&dist_lens[..num_dist]);

    let ops = run_length_encode(&combined);

    let mut precode_freqs = [0_u32; DEFLATE_NUM_PRECODE_SYMS];
    for op in &ops {
        precode_freqs[usize::from(op.symbol)] += 1;
    }

    let precode_lens = build_tree_lengths(&precode_freqs, DEFLATE_MAX_PRE_CODEWORD_LEN);
    let precode_codes = build_codes(&precode_lens);

    // lengths go out in the fixed permutation, trailing zeros dropped
    let mut num_precode = DEFLATE_NUM_PRECODE_SYMS;
    while num_precode > 4
        && precode_lens[usize::from(DEFLATE_PRECODE_LENS_PERMUTATION[num_precode - 1])] == 0
    {
        num_precode -= 1;
    }

    let mut sink = BitStreamWriter::new();

    sink.write_bits(1 | (DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN << 1), 3);
    sink.write_bits((num_litlen - 257) as u64, 5);
    sink.write_bits((num_dist - 1) as u64, 5);
    sink.write_bits((num_precode - 4) as u64, 4);

    for perm in DEFLATE_PRECODE_LENS_PERMUTATION.iter().take(num_precode) {
        sink.write_bits(u64::from(precode_lens[usize::from(*perm)]), 3);
    }

    for op in &ops {
        let sym = usize::from(op.symbol);

        sink.write_huffman(precode_codes[sym], precode_lens[sym]);
        if op.extra_bits > 0 {
            sink.write_bits(op.extra, op.extra_bits);
        }
    }

    write_tokens(
        &mut sink,
        &stream.tokens,
        &litlen_codes,
        &litlen_lens,
        &dist_codes,
        &dist_lens
    );
    sink.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_header_default_window_no_compression() {
        let data = b"A";
        let mut encoder = DeflateEncoder::new_with_options(
            data,
            DeflateEncodingOptions::default().set_level(0)
        );
        let output = encoder.encode_zlib();

        // CMF 0x78 (32 KiB window, deflate), FLG 0x01 (FLEVEL fastest)
        assert_eq!(&output[..2], &[0x78, 0x01]);
        assert_eq!((u16::from(output[0]) * 256 + u16::from(output[1])) % 31, 0);
    }

    #[test]
    fn test_fcheck_holds_for_every_level_and_window() {
        for level in -1..=9 {
            for window_bits in 9..=15 {
                let options = DeflateEncodingOptions::default()
                    .set_level(level)
                    .set_window_bits(window_bits);
                let mut encoder = DeflateEncoder::new_with_options(b"x", options);
                let output = encoder.encode_zlib();

                let hdr = u16::from(output[0]) * 256 + u16::from(output[1]);
                assert_eq!(hdr % 31, 0, "level {level} window {window_bits}");
                // the smallest solution never needs all five bits set
                assert_ne!(output[1] & 0x1F, 31);
            }
        }
    }

    #[test]
    fn test_empty_input_stored_block() {
        let mut encoder =
            DeflateEncoder::new_with_options(b"", DeflateEncodingOptions::default().set_level(0));
        let output = encoder.encode_zlib();

        // header + BFINAL/BTYPE byte + LEN/NLEN + adler of nothing
        assert_eq!(output[2], 0b0000_0001);
        assert_eq!(&output[3..7], &[0x00, 0x00, 0xFF, 0xFF]);
        assert_eq!(&output[7..], &1_u32.to_be_bytes());
    }

    #[test]
    fn test_single_byte_stored_block() {
        let mut encoder =
            DeflateEncoder::new_with_options(b"A", DeflateEncodingOptions::default().set_level(0));
        let output = encoder.encode_zlib();

        assert_eq!(output[2], 0b0000_0001);
        assert_eq!(&output[3..7], &[0x01, 0x00, 0xFE, 0xFF]);
        assert_eq!(output[7], b'A');
        assert_eq!(&output[8..], &0x0042_0042_u32.to_be_bytes());
    }

    #[test]
    fn test_stored_blocks_split_above_chunk_limit() {
        let data = vec![7_u8; 100_000];
        let mut encoder = DeflateEncoder::new_with_options(
            &data,
            DeflateEncodingOptions::default().set_level(0)
        );
        let raw = encoder.encode_raw();

        // two blocks: 65535 + 34465 bytes, 5 bytes of header each
        assert_eq!(raw.len(), stored_stream_size(data.len()));
        assert_eq!(raw[0], 0b0000_0000, "first block is not final");

        let second_block = 5 + 65535;
        assert_eq!(raw[second_block], 0b0000_0001, "second block is final");
    }

    #[test]
    fn test_auto_prefers_stored_for_incompressible_data() {
        // bytes from a xorshift generator do not compress
        let mut state = 0x9E37_79B9_u32;
        let data: Vec<u8> = (0..4096)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();

        let mut encoder = DeflateEncoder::new(&data);
        let raw = encoder.encode_raw();

        assert!(raw.len() <= stored_stream_size(data.len()));
    }

    #[test]
    fn test_auto_compresses_redundant_data() {
        let data = vec![b'q'; 10_000];
        let mut encoder = DeflateEncoder::new(&data);
        let raw = encoder.encode_raw();

        assert!(raw.len() < 100, "10k run should shrink to a few bytes");
    }

    #[test]
    fn test_run_length_encode_zero_runs() {
        let lens = [0_u8; 140];
        let ops = run_length_encode(&lens);

        // 138 zeros via symbol 18, the two stragglers as literals
        assert_eq!(ops[0].symbol, 18);
        assert_eq!(ops[0].extra, 127);
        assert_eq!(ops[1].symbol, 0);
        assert_eq!(ops[2].symbol, 0);
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn test_run_length_encode_repeats() {
        let lens = [5_u8; 8];
        let ops = run_length_encode(&lens);

        // explicit 5, repeat 6, then one literal 5
        assert_eq!(ops[0].symbol, 5);
        assert_eq!(ops[1].symbol, 16);
        assert_eq!(ops[1].extra, 3);
        assert_eq!(ops[2].symbol, 5);
        assert_eq!(ops.len(), 3);
    }
}
