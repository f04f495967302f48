//! AVX2 implementation computing four blocks per call.
//!
//! Each 256-bit register holds the same state row for two consecutive
//! blocks (low half block `n`, high half block `n + 1`), in the manner of
//! Goll and Gueron, "Vectorization of ChaCha Stream Cipher",
//! <https://eprint.iacr.org/2013/759.pdf>.

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
/// Number of `__m256i` to store parallel blocks.
const N: usize = PAR_BLOCKS / 2;

const ROT16: [u8; 32] = [
    2, 3, 0, 1, 6, 7, 4, 5, 10, 11, 8, 9, 14, 15, 12, 13, //
    2, 3, 0, 1, 6, 7, 4, 5, 10, 11, 8, 9, 14, 15, 12, 13,
];

const ROT8: [u8; 32] = [
    3, 0, 1, 2, 7, 4, 5, 6, 11, 8, 9, 10, 15, 12, 13, 14, //
    3, 0, 1, 2, 7, 4, 5, 6, 11, 8, 9, 10, 15, 12, 13, 14,
];

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn inner<F>(state: &mut [u32; STATE_WORDS], f: F)
where
    F: StreamClosure<BlockSize = U64>,
{
    let state_ptr = state.as_ptr() as *const __m128i;
    let v = [
        _mm256_broadcastsi128_si256(_mm_loadu_si128(state_ptr.add(0))),
        _mm256_broadcastsi128_si256(_mm_loadu_si128(state_ptr.add(1))),
        _mm256_broadcastsi128_si256(_mm_loadu_si128(state_ptr.add(2))),
    ];
    let mut c = _mm256_broadcastsi128_si256(_mm_loadu_si128(state_ptr.add(3)));
    c = _mm256_add_epi64(c, _mm256_set_epi64x(0, 1, 0, 0));
    let mut ctr = [c; N];
    for i in 0..N {
        ctr[i] = c;
        c = _mm256_add_epi64(c, _mm256_set_epi64x(0, 2, 0, 2));
    }
    let mut backend = Backend {
        v,
        ctr,
        rot16: _mm256_loadu_si256(ROT16.as_ptr() as *const __m256i),
        rot8: _mm256_loadu_si256(ROT8.as_ptr() as *const __m256i),
    };

    f.call(&mut backend);

    // the low half of the first counter row belongs to the next unused block
    _mm_storeu_si128(
        state.as_mut_ptr().add(12) as *mut __m128i,
        _mm256_castsi256_si128(backend.ctr[0]),
    );
}

struct Backend {
    v: [__m256i; 3],
    ctr: [__m256i; N],
    rot16: __m256i,
    rot8: __m256i,
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
            let res = rounds(&self.v, &self.ctr, self.rot16, self.rot8);
            for c in self.ctr.iter_mut() {
                *c = _mm256_add_epi64(*c, _mm256_set_epi64x(0, 1, 0, 1));
            }

            let block_ptr = block.as_mut_ptr() as *mut __m128i;
            for i in 0..4 {
                _mm_storeu_si128(block_ptr.add(i), _mm256_castsi256_si128(res[0][i]));
            }
        }
    }

    #[inline(always)]
    fn gen_par_ks_blocks(&mut self, blocks: &mut ParBlocks<Self>) {
        unsafe {
            let vs = rounds(&self.v, &self.ctr, self.rot16, self.rot8);

            let pb = PAR_BLOCKS as i64;
            for c in self.ctr.iter_mut() {
                *c = _mm256_add_epi64(*c, _mm256_set_epi64x(0, pb, 0, pb));
            }

            let mut block_ptr = blocks.as_mut_ptr() as *mut __m256i;
            for v in vs {
                // rows of the low-half block, then rows of the high-half block
                let t = [
                    _mm256_permute2x128_si256(v[0], v[1], 0x20),
                    _mm256_permute2x128_si256(v[2], v[3], 0x20),
                    _mm256_permute2x128_si256(v[0], v[1], 0x31),
                    _mm256_permute2x128_si256(v[2], v[3], 0x31),
                ];
                for val in t {
                    _mm256_storeu_si256(block_ptr, val);
                    block_ptr = block_ptr.add(1);
                }
            }
        }
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn rounds(
    v: &[__m256i; 3],
    c: &[__m256i; N],
    rot16: __m256i,
    rot8: __m256i,
) -> [[__m256i; 4]; N] {
    let mut vs: [[__m256i; 4]; N] = [[_mm256_setzero_si256(); 4]; N];
    for i in 0..N {
        vs[i] = [v[0], v[1], v[2], c[i]];
    }
    for _ in 0..DOUBLE_ROUNDS {
        double_quarter_round(&mut vs, rot16, rot8);
    }

    for i in 0..N {
        for j in 0..3 {
            vs[i][j] = _mm256_add_epi32(vs[i][j], v[j]);
        }
        vs[i][3] = _mm256_add_epi32(vs[i][3], c[i]);
    }

    vs
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn double_quarter_round(v: &mut [[__m256i; 4]; N], rot16: __m256i, rot8: __m256i) {
    add_xor_rot(v, rot16, rot8);
    rows_to_cols(v);
    add_xor_rot(v, rot16, rot8);
    cols_to_rows(v);
}

/// Same diagonalization as the SSE2 backend; `_mm256_shuffle_epi32` permutes
/// each 128-bit half independently, so both blocks are rotated at once.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn rows_to_cols(vs: &mut [[__m256i; 4]; N]) {
    for [a, _, c, d] in vs.iter_mut() {
        *c = _mm256_shuffle_epi32(*c, 0b_00_11_10_01);
        *d = _mm256_shuffle_epi32(*d, 0b_01_00_11_10);
        *a = _mm256_shuffle_epi32(*a, 0b_10_01_00_11);
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn cols_to_rows(vs: &mut [[__m256i; 4]; N]) {
    for [a, _, c, d] in vs.iter_mut() {
        *c = _mm256_shuffle_epi32(*c, 0b_10_01_00_11);
        *d = _mm256_shuffle_epi32(*d, 0b_01_00_11_10);
        *a = _mm256_shuffle_epi32(*a, 0b_00_11_10_01);
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn add_xor_rot(vs: &mut [[__m256i; 4]; N], rot16: __m256i, rot8: __m256i) {
    for [a, b, c, d] in vs.iter_mut() {
        // a += b; d ^= a; d <<<= (16, 16, 16, 16);
        *a = _mm256_add_epi32(*a, *b);
        *d = _mm256_xor_si256(*d, *a);
        *d = _mm256_shuffle_epi8(*d, rot16);

        // c += d; b ^= c; b <<<= (12, 12, 12, 12);
        *c = _mm256_add_epi32(*c, *d);
        *b = _mm256_xor_si256(*b, *c);
        *b = _mm256_xor_si256(_mm256_slli_epi32(*b, 12), _mm256_srli_epi32(*b, 20));

        // a += b; d ^= a; d <<<= (8, 8, 8, 8);
        *a = _mm256_add_epi32(*a, *b);
        *d = _mm256_xor_si256(*d, *a);
        *d = _mm256_shuffle_epi8(*d, rot8);

        // c += d; b ^= c; b <<<= (7, 7, 7, 7);
        *c = _mm256_add_epi32(*c, *d);
        *b = _mm256_xor_si256(*b, *c);
        *b = _mm256_xor_si256(_mm256_slli_epi32(*b, 7), _mm256_srli_epi32(*b, 25));
    }
}
