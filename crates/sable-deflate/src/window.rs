/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The 32 KiB look-back window and its hash chain index.
//!
//! The whole input is kept in memory, so the "window" is the range
//! `pos - 32768..pos` of absolute positions. Three-byte prefixes are
//! indexed through a `head`/`prev` chain pair: `head` holds the most
//! recent position that hashed into a bucket and `prev`, a ring the
//! size of the window, holds the previous position for each inserted
//! one. Walking `head -> prev -> prev ..` therefore yields candidates
//! most recent first, which is exactly the order match search wants.

use crate::constants::{DEFLATE_MIN_MATCH, DEFLATE_WINDOW_SIZE};

const HASH_BITS: usize = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const WINDOW_MASK: usize = DEFLATE_WINDOW_SIZE - 1;

pub(crate) struct SlidingWindow<'a> {
    data: &'a [u8],
    // hash bucket -> most recently inserted position, offset by one
    // so that zero marks an empty bucket
    head: Vec<u32>,
    // position & WINDOW_MASK -> previously inserted position in the
    // same bucket, offset by one
    prev: Vec<u32>
}

impl<'a> SlidingWindow<'a> {
    pub fn new(data: &'a [u8]) -> SlidingWindow<'a> {
        SlidingWindow {
            data,
            head: vec![0; HASH_SIZE],
            prev: vec![0; DEFLATE_WINDOW_SIZE]
        }
    }

    #[inline(always)]
    fn hash_at(&self, pos: usize) -> usize {
        let prefix = u32::from(self.data[pos]) << 16
            | u32::from(self.data[pos + 1]) << 8
            | u32::from(self.data[pos + 2]);

        (prefix.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    /// Index the three byte prefix starting at `pos`.
    ///
    /// Positions too close to the end to carry a full prefix are
    /// silently ignored.
    #[inline]
    pub fn insert(&mut self, pos: usize) {
        if pos + DEFLATE_MIN_MATCH > self.data.len() {
            return;
        }
        let hash = self.hash_at(pos);

        self.prev[pos & WINDOW_MASK] = self.head[hash];
        self.head[hash] = pos as u32 + 1;
    }

    /// Iterate candidate match positions for the prefix at `pos`,
    /// most recent first, stopping at the edge of the window.
    pub fn candidates(&self, pos: usize) -> Candidates<'_, 'a> {
        let next = if pos + DEFLATE_MIN_MATCH <= self.data.len() {
            self.head[self.hash_at(pos)]
        } else {
            0
        };

        Candidates {
            window: self,
            pos,
            next
        }
    }
}

pub(crate) struct Candidates<'w, 'a> {
    window: &'w SlidingWindow<'a>,
    pos:    usize,
    next:   u32
}

impl Iterator for Candidates<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next == 0 {
            return None;
        }
        let cand = self.next as usize - 1;

        // chain entries beyond the window are stale, stop instead of
        // chasing them
        if self.pos - cand > DEFLATE_WINDOW_SIZE {
            return None;
        }
        self.next = self.window.prev[cand & WINDOW_MASK];
        Some(cand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_most_recent_first() {
        let data = b"abcxxabcyyabc";
        let mut window = SlidingWindow::new(data);

        // prefix "abc" occurs at 0, 5 and 10
        for pos in 0..10 {
            window.insert(pos);
        }
        // stray hash collisions may surface other positions, the
        // genuine occurrences still must come out newest first
        let found: Vec<usize> = window
            .candidates(10)
            .filter(|cand| &data[*cand..*cand + 3] == b"abc")
            .collect();

        assert_eq!(found, vec![5, 0]);
    }

    #[test]
    fn test_tail_positions_are_ignored() {
        let data = b"abcd";
        let mut window = SlidingWindow::new(data);

        window.insert(2); // only two bytes left, no prefix
        window.insert(3);
        assert!(window.candidates(1).next().is_none());
    }

    #[test]
    fn test_window_edge_pruning() {
        // same prefix twice, spaced wider than the window
        let mut data = vec![0_u8; DEFLATE_WINDOW_SIZE + 16];
        data[0..3].copy_from_slice(b"XYZ");

        let far = DEFLATE_WINDOW_SIZE + 4;
        data[far..far + 3].copy_from_slice(b"XYZ");

        let mut window = SlidingWindow::new(&data);
        window.insert(0);

        let found: Vec<usize> = window.candidates(far).collect();
        assert!(
            found.is_empty(),
            "position 0 is {far} bytes back, outside the window"
        );
    }
}
