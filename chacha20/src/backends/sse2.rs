//! SSE2 implementation computing four blocks per call.

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
    let state_ptr = state.as_ptr() as *const __m128i;
    let mut backend = Backend {
        v: [
            _mm_loadu_si128(state_ptr.add(0)),
            _mm_loadu_si128(state_ptr.add(1)),
            _mm_loadu_si128(state_ptr.add(2)),
            _mm_loadu_si128(state_ptr.add(3)),
        ],
    };

    f.call(&mut backend);

    // row 3 carries the 64-bit counter in its low lanes; the nonce lanes are untouched
    _mm_storeu_si128(state.as_mut_ptr().add(12) as *mut __m128i, backend.v[3]);
}

struct Backend {
    v: [__m128i; 4],
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
            let res = rounds(&self.v);
            self.v[3] = _mm_add_epi64(self.v[3], _mm_set_epi64x(0, 1));

            let block_ptr = block.as_mut_ptr() as *mut __m128i;
            for i in 0..4 {
                _mm_storeu_si128(block_ptr.add(i), res[0][i]);
            }
        }
    }

    #[inline(always)]
    fn gen_par_ks_blocks(&mut self, blocks: &mut ParBlocks<Self>) {
        unsafe {
            let res = rounds(&self.v);
            self.v[3] = _mm_add_epi64(self.v[3], _mm_set_epi64x(0, PAR_BLOCKS as i64));

            let blocks_ptr = blocks.as_mut_ptr() as *mut __m128i;
            for block in 0..PAR_BLOCKS {
                for i in 0..4 {
                    _mm_storeu_si128(blocks_ptr.add(i + block * 4), res[block][i]);
                }
            }
        }
    }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rounds(v: &[__m128i; 4]) -> [[__m128i; 4]; PAR_BLOCKS] {
    let mut res = [*v; PAR_BLOCKS];
    for block in 1..PAR_BLOCKS {
        res[block][3] = _mm_add_epi64(res[block][3], _mm_set_epi64x(0, block as i64));
    }

    for _ in 0..DOUBLE_ROUNDS {
        double_quarter_round(&mut res);
    }

    for block in 0..PAR_BLOCKS {
        for i in 0..3 {
            res[block][i] = _mm_add_epi32(res[block][i], v[i]);
        }
        let ctr = _mm_add_epi64(v[3], _mm_set_epi64x(0, block as i64));
        res[block][3] = _mm_add_epi32(res[block][3], ctr);
    }

    res
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn double_quarter_round(v: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    add_xor_rot(v);
    rows_to_cols(v);
    add_xor_rot(v);
    cols_to_rows(v);
}

/// Rotate rows `a`, `c` and `d` so that the diagonals of the state line up
/// as columns:
/// ```text
/// [a0, a1, a2, a3]      [a3, a0, a1, a2]
/// [b0, b1, b2, b3]  ->  [b0, b1, b2, b3]
/// [c0, c1, c2, c3]      [c1, c2, c3, c0]
/// [d0, d1, d2, d3]      [d2, d3, d0, d1]
/// ```
///
/// Row `b` stays put because it is the last word written by [`add_xor_rot`];
/// the column order itself does not matter since every column is an
/// independent quarter round.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rows_to_cols(blocks: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    for [a, _, c, d] in blocks.iter_mut() {
        *c = _mm_shuffle_epi32(*c, 0b_00_11_10_01);
        *d = _mm_shuffle_epi32(*d, 0b_01_00_11_10);
        *a = _mm_shuffle_epi32(*a, 0b_10_01_00_11);
    }
}

/// Inverse of [`rows_to_cols`].
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn cols_to_rows(blocks: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    for [a, _, c, d] in blocks.iter_mut() {
        *c = _mm_shuffle_epi32(*c, 0b_10_01_00_11);
        *d = _mm_shuffle_epi32(*d, 0b_01_00_11_10);
        *a = _mm_shuffle_epi32(*a, 0b_00_11_10_01);
    }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn add_xor_rot(blocks: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    for [a, b, c, d] in blocks.iter_mut() {
        // a += b; d ^= a; d <<<= (16, 16, 16, 16);
        *a = _mm_add_epi32(*a, *b);
        *d = _mm_xor_si128(*d, *a);
        *d = _mm_xor_si128(_mm_slli_epi32(*d, 16), _mm_srli_epi32(*d, 16));

        // c += d; b ^= c; b <<<= (12, 12, 12, 12);
        *c = _mm_add_epi32(*c, *d);
        *b = _mm_xor_si128(*b, *c);
        *b = _mm_xor_si128(_mm_slli_epi32(*b, 12), _mm_srli_epi32(*b, 20));

        // a += b; d ^= a; d <<<= (8, 8, 8, 8);
        *a = _mm_add_epi32(*a, *b);
        *d = _mm_xor_si128(*d, *a);
        *d = _mm_xor_si128(_mm_slli_epi32(*d, 8), _mm_srli_epi32(*d, 24));

        // c += d; b ^= c; b <<<= (7, 7, 7, 7);
        *c = _mm_add_epi32(*c, *d);
        *b = _mm_xor_si128(*b, *c);
        *b = _mm_xor_si128(_mm_slli_epi32(*b, 7), _mm_srli_epi32(*b, 25));
    }
}
