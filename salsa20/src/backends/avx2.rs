//! AVX2 backend for Salsa20.
//!
//! Uses the same diagonal layout as the SSE2 backend with two blocks per
//! register: the low 128-bit half holds block `n`, the high half block
//! `n + 1`. `_mm256_shuffle_epi32` rotates both halves independently.

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

/// Number of blocks processed in parallel.
const PAR_BLOCKS: usize = 4;
/// Number of register sets holding two blocks each.
const N: usize = PAR_BLOCKS / 2;

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn inner<F>(state: &mut [u32; STATE_WORDS], f: F)
where
    F: StreamClosure<BlockSize = U64>,
{
    let words = diagonal_words(state);
    let ptr = words.as_ptr() as *const __m128i;
    let mut backend = Backend {
        rows: [
            _mm256_broadcastsi128_si256(_mm_loadu_si128(ptr.add(0))),
            _mm256_broadcastsi128_si256(_mm_loadu_si128(ptr.add(1))),
            _mm256_broadcastsi128_si256(_mm_loadu_si128(ptr.add(2))),
            _mm256_broadcastsi128_si256(_mm_loadu_si128(ptr.add(3))),
        ],
        ctr: counter(state),
    };

    f.call(&mut backend);

    set_counter(state, backend.ctr);
}

struct Backend {
    /// Diagonal rows, duplicated into both halves, counter lanes zeroed
    rows: [__m256i; 4],
    ctr: u64,
}

impl Backend {
    /// Rows for the pair of blocks at `offset` and `offset + 1`.
    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn pair_rows(&self, offset: u64) -> [__m256i; 4] {
        let lo = self.ctr.wrapping_add(offset);
        let hi = lo.wrapping_add(1);
        let [a, b, c, d] = self.rows;
        [
            a,
            _mm256_or_si256(
                b,
                _mm256_set_epi32(0, 0, (hi >> 32) as i32, 0, 0, 0, (lo >> 32) as i32, 0),
            ),
            _mm256_or_si256(c, _mm256_set_epi32(0, 0, 0, hi as i32, 0, 0, 0, lo as i32)),
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
            let res = rounds([self.pair_rows(0)]);
            self.ctr = self.ctr.wrapping_add(1);
            let [lo, _] = split(&res[0]);
            write_diagonal(&lo, block);
        }
    }

    #[inline(always)]
    fn gen_par_ks_blocks(&mut self, blocks: &mut ParBlocks<Self>) {
        unsafe {
            let mut input = [self.rows; N];
            for (i, rows) in input.iter_mut().enumerate() {
                *rows = self.pair_rows(2 * i as u64);
            }
            let res = rounds(input);
            self.ctr = self.ctr.wrapping_add(PAR_BLOCKS as u64);

            for (pair, rows) in blocks.chunks_exact_mut(2).zip(res.iter()) {
                let [lo, hi] = split(rows);
                write_diagonal(&lo, &mut pair[0]);
                write_diagonal(&hi, &mut pair[1]);
            }
        }
    }
}

/// Store the low and high 128-bit halves of each row as two blocks in
/// diagonal order.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn split(rows: &[__m256i; 4]) -> [[u32; STATE_WORDS]; 2] {
    let mut out = [[0u32; STATE_WORDS]; 2];
    let lo = out[0].as_mut_ptr() as *mut __m128i;
    for (i, row) in rows.iter().enumerate() {
        _mm_storeu_si128(lo.add(i), _mm256_castsi256_si128(*row));
    }
    let hi = out[1].as_mut_ptr() as *mut __m128i;
    for (i, row) in rows.iter().enumerate() {
        _mm_storeu_si128(hi.add(i), _mm256_extracti128_si256::<1>(*row));
    }
    out
}

macro_rules! rotl {
    ($w:expr, $amt:literal) => {{
        let w = $w;
        _mm256_xor_si256(_mm256_slli_epi32(w, $amt), _mm256_srli_epi32(w, 32 - $amt))
    }};
}

/// Salsa20/20 over `2 * P` blocks given as `P` pairs, including the final
/// feed-forward.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn rounds<const P: usize>(save: [[__m256i; 4]; P]) -> [[__m256i; 4]; P] {
    let mut v = save;
    for _ in 0..DOUBLE_ROUNDS {
        for [a, b, c, d] in v.iter_mut() {
            // column round, then row round
            for _ in 0..2 {
                *b = _mm256_xor_si256(*b, rotl!(_mm256_add_epi32(*a, *d), 7));
                *c = _mm256_xor_si256(*c, rotl!(_mm256_add_epi32(*b, *a), 9));
                *d = _mm256_xor_si256(*d, rotl!(_mm256_add_epi32(*c, *b), 13));
                *a = _mm256_xor_si256(*a, rotl!(_mm256_add_epi32(*d, *c), 18));

                *d = _mm256_shuffle_epi32(*d, 0b00_11_10_01);
                *c = _mm256_shuffle_epi32(*c, 0b01_00_11_10);
                *b = _mm256_shuffle_epi32(*b, 0b10_01_00_11);
                core::mem::swap(b, d);
            }
        }
    }

    for (rows, saved) in v.iter_mut().zip(save.iter()) {
        for (row, saved_row) in rows.iter_mut().zip(saved.iter()) {
            *row = _mm256_add_epi32(*row, *saved_row);
        }
    }
    v
}
