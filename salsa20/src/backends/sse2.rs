//! SSE2 backend for Salsa20.
//!
//! Each block is held in four registers using the diagonal layout from
//! [`DIAGONALS`](super::DIAGONALS). After every half round the rows are
//! rotated so that the next half round is again lane-wise:
//!
//! ```text
//! a = [ 0,  5, 10, 15]      a = [ 0,  5, 10, 15]
//! b = [ 4,  9, 14,  3]  ->  b = [ 1,  6, 11, 12]  (d rotated by one)
//! c = [ 8, 13,  2,  7]      c = [ 2,  7,  8, 13]  (c rotated by two)
//! d = [12,  1,  6, 11]      d = [ 3,  4,  9, 14]  (b rotated by three)
//! ```
//!
//! Applying the same step again restores the column layout. The rows stay
//! in registers for the whole call; only the counter lanes change per
//! block.

use super::{counter, diagonal_words, set_counter, write_diagonal};
use crate::{DOUBLE_ROUNDS, STATE_WORDS};
use cipher::{
    consts::{U4, U64},
    Block, BlockSizeUser, ParBlocks, ParBlocksSizeUser, StreamBackend, StreamClosure,
};

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

const PAR_BLOCKS: usize = 4;

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn inner<F>(state: &mut [u32; STATE_WORDS], f: F)
where
    F: StreamClosure<BlockSize = U64>,
{
    let words = diagonal_words(state);
    let ptr = words.as_ptr() as *const __m128i;
    let mut backend = Backend {
        rows: [
            _mm_loadu_si128(ptr.add(0)),
            _mm_loadu_si128(ptr.add(1)),
            _mm_loadu_si128(ptr.add(2)),
            _mm_loadu_si128(ptr.add(3)),
        ],
        ctr: counter(state),
    };

    f.call(&mut backend);

    set_counter(state, backend.ctr);
}

struct Backend {
    /// Diagonal rows with the counter lanes zeroed
    rows: [__m128i; 4],
    ctr: u64,
}

impl Backend {
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn block_rows(&self, offset: u64) -> [__m128i; 4] {
        let n = self.ctr.wrapping_add(offset);
        let [a, b, c, d] = self.rows;
        [
            a,
            _mm_or_si128(b, _mm_set_epi32(0, 0, (n >> 32) as i32, 0)),
            _mm_or_si128(c, _mm_set_epi32(0, 0, 0, n as i32)),
            d,
        ]
    }
}

impl BlockSizeUser for Backend {
    type BlockSize = U64;
}

impl ParBlocksSizeUser for Backend {
    type ParBlocksSize = U4;
}

impl StreamBackend for Backend {
    #[inline(always)]
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        unsafe {
            let res = rounds([self.block_rows(0)]);
            self.ctr = self.ctr.wrapping_add(1);
            store(&res[0], block);
        }
    }

    #[inline(always)]
    fn gen_par_ks_blocks(&mut self, blocks: &mut ParBlocks<Self>) {
        unsafe {
            let mut input = [self.rows; PAR_BLOCKS];
            for (i, rows) in input.iter_mut().enumerate() {
                *rows = self.block_rows(i as u64);
            }
            let res = rounds(input);
            self.ctr = self.ctr.wrapping_add(PAR_BLOCKS as u64);

            for (block, rows) in blocks.iter_mut().zip(res.iter()) {
                store(rows, block);
            }
        }
    }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn store(rows: &[__m128i; 4], block: &mut [u8]) {
    let mut words = [0u32; STATE_WORDS];
    let ptr = words.as_mut_ptr() as *mut __m128i;
    for (i, row) in rows.iter().enumerate() {
        _mm_storeu_si128(ptr.add(i), *row);
    }
    write_diagonal(&words, block);
}

macro_rules! rotl {
    ($w:expr, $amt:literal) => {{
        let w = $w;
        _mm_xor_si128(_mm_slli_epi32(w, $amt), _mm_srli_epi32(w, 32 - $amt))
    }};
}

/// Salsa20/20 over `N` blocks, including the final feed-forward.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rounds<const N: usize>(save: [[__m128i; 4]; N]) -> [[__m128i; 4]; N] {
    let mut v = save;
    for _ in 0..DOUBLE_ROUNDS {
        for [a, b, c, d] in v.iter_mut() {
            // column round, then row round
            for _ in 0..2 {
                *b = _mm_xor_si128(*b, rotl!(_mm_add_epi32(*a, *d), 7));
                *c = _mm_xor_si128(*c, rotl!(_mm_add_epi32(*b, *a), 9));
                *d = _mm_xor_si128(*d, rotl!(_mm_add_epi32(*c, *b), 13));
                *a = _mm_xor_si128(*a, rotl!(_mm_add_epi32(*d, *c), 18));

                *d = _mm_shuffle_epi32(*d, 0b00_11_10_01);
                *c = _mm_shuffle_epi32(*c, 0b01_00_11_10);
                *b = _mm_shuffle_epi32(*b, 0b10_01_00_11);
                core::mem::swap(b, d);
            }
        }
    }

    for (rows, saved) in v.iter_mut().zip(save.iter()) {
        for (row, saved_row) in rows.iter_mut().zip(saved.iter()) {
            *row = _mm_add_epi32(*row, *saved_row);
        }
    }
    v
}
