//! SSE2 implementation.
//!
//! Uses the same even/odd word split as the AVX2 backend, with each half
//! held in two 128-bit registers: `[x0, x2]`, `[x4, x6]` and `[x1, x3]`,
//! `[x5, x7]`. SSE2 has no per-lane variable shift, so each rotation is
//! computed once per lane count and the lanes are blended back together.

use crate::{KeySchedule, ROTATIONS, ROUNDS, WORDS};
use cipher::{consts::U64, BlockClosure};

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

super::block_backends!(encrypt_block, decrypt_block);

/// Swaps the two 64-bit lanes.
const SWAP_LANES: i32 = 0b01_00_11_10;

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn encrypt<F>(keys: &KeySchedule, f: F)
where
    F: BlockClosure<BlockSize = U64>,
{
    f.call(&mut Encryptor(keys));
}

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn decrypt<F>(keys: &KeySchedule, f: F)
where
    F: BlockClosure<BlockSize = U64>,
{
    f.call(&mut Decryptor(keys));
}

struct Halves {
    e: [__m128i; 2],
    o: [__m128i; 2],
}

impl Halves {
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn load(x: &[u64; WORDS]) -> Self {
        Self {
            e: [
                _mm_set_epi64x(x[2] as i64, x[0] as i64),
                _mm_set_epi64x(x[6] as i64, x[4] as i64),
            ],
            o: [
                _mm_set_epi64x(x[3] as i64, x[1] as i64),
                _mm_set_epi64x(x[7] as i64, x[5] as i64),
            ],
        }
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn store(&self, x: &mut [u64; WORDS]) {
        let mut e = [0u64; 4];
        let mut o = [0u64; 4];
        _mm_storeu_si128(e.as_mut_ptr() as *mut __m128i, self.e[0]);
        _mm_storeu_si128(e.as_mut_ptr().add(2) as *mut __m128i, self.e[1]);
        _mm_storeu_si128(o.as_mut_ptr() as *mut __m128i, self.o[0]);
        _mm_storeu_si128(o.as_mut_ptr().add(2) as *mut __m128i, self.o[1]);
        for j in 0..4 {
            x[2 * j] = e[j];
            x[2 * j + 1] = o[j];
        }
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn add_key(&mut self, k: &[u64; WORDS]) {
        let k = Self::load(k);
        for i in 0..2 {
            self.e[i] = _mm_add_epi64(self.e[i], k.e[i]);
            self.o[i] = _mm_add_epi64(self.o[i], k.o[i]);
        }
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn sub_key(&mut self, k: &[u64; WORDS]) {
        let k = Self::load(k);
        for i in 0..2 {
            self.e[i] = _mm_sub_epi64(self.e[i], k.e[i]);
            self.o[i] = _mm_sub_epi64(self.o[i], k.o[i]);
        }
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn permute(&mut self) {
        self.o[0] = _mm_shuffle_epi32(self.o[0], SWAP_LANES);
        self.o[1] = _mm_shuffle_epi32(self.o[1], SWAP_LANES);
    }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rotl_by(v: __m128i, n: u32) -> __m128i {
    _mm_or_si128(
        _mm_sll_epi64(v, _mm_cvtsi32_si128(n as i32)),
        _mm_srl_epi64(v, _mm_cvtsi32_si128((64 - n) as i32)),
    )
}

/// Takes lane 0 from `lo` and lane 1 from `hi`.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn blend(lo: __m128i, hi: __m128i) -> __m128i {
    _mm_castpd_si128(_mm_move_sd(_mm_castsi128_pd(hi), _mm_castsi128_pd(lo)))
}

/// Rotates lane 0 left by `r0` and lane 1 left by `r1`.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rotl(v: __m128i, r0: u32, r1: u32) -> __m128i {
    blend(rotl_by(v, r0), rotl_by(v, r1))
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rotr(v: __m128i, r0: u32, r1: u32) -> __m128i {
    blend(rotl_by(v, 64 - r0), rotl_by(v, 64 - r1))
}

#[target_feature(enable = "sse2")]
pub(crate) unsafe fn encrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    let mut s = Halves::load(x);

    for round in 0..ROUNDS {
        s.add_key(keys.for_round(round));

        let rot = &ROTATIONS[round % 8];
        for i in 0..2 {
            let (r0, r1) = (rot[2 * i], rot[2 * i + 1]);
            let (mut e, mut o) = (s.e[i], s.o[i]);
            if round % 8 == 0 {
                e = _mm_add_epi64(e, o);
                o = _mm_xor_si128(rotl(o, r0, r1), e);
            } else {
                o = rotl(o, r0, r1);
                e = _mm_add_epi64(e, o);
                o = _mm_xor_si128(o, e);
            }
            s.e[i] = e;
            s.o[i] = o;
        }

        s.permute();
    }

    s.store(x);
}

#[target_feature(enable = "sse2")]
pub(crate) unsafe fn decrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    let mut s = Halves::load(x);

    for round in (0..ROUNDS).rev() {
        s.permute();

        let rot = &ROTATIONS[round % 8];
        for i in 0..2 {
            let (r0, r1) = (rot[2 * i], rot[2 * i + 1]);
            let (mut e, mut o) = (s.e[i], s.o[i]);
            if round % 8 == 0 {
                o = rotr(_mm_xor_si128(o, e), r0, r1);
                e = _mm_sub_epi64(e, o);
            } else {
                o = _mm_xor_si128(o, e);
                e = _mm_sub_epi64(e, o);
                o = rotr(o, r0, r1);
            }
            s.e[i] = e;
            s.o[i] = o;
        }

        s.sub_key(keys.for_round(round));
    }

    s.store(x);
}
