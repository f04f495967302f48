//! AVX2 implementation.
//!
//! The eight state words are split into even words `E = [x0, x2, x4, x6]`
//! and odd words `O = [x1, x3, x5, x7]`, so the four Mix operations of a
//! round are one lane-wise pass over `(E, O)` with per-lane rotation counts
//! (`vpsllvq`/`vpsrlvq`). The permutation `[0, 3, 2, 1]` only moves odd
//! words and becomes a swap of adjacent `O` lanes.

use crate::{KeySchedule, ROTATIONS, ROUNDS, WORDS};
use cipher::{consts::U64, BlockClosure};

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

super::block_backends!(encrypt_block, decrypt_block);

/// `[O1, O0, O3, O2]`
const SWAP_PAIRS: i32 = 0b10_11_00_01;

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn encrypt<F>(keys: &KeySchedule, f: F)
where
    F: BlockClosure<BlockSize = U64>,
{
    f.call(&mut Encryptor(keys));
}

#[inline]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn decrypt<F>(keys: &KeySchedule, f: F)
where
    F: BlockClosure<BlockSize = U64>,
{
    f.call(&mut Decryptor(keys));
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn even(x: &[u64; WORDS]) -> __m256i {
    _mm256_set_epi64x(x[6] as i64, x[4] as i64, x[2] as i64, x[0] as i64)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn odd(x: &[u64; WORDS]) -> __m256i {
    _mm256_set_epi64x(x[7] as i64, x[5] as i64, x[3] as i64, x[1] as i64)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn store(e: __m256i, o: __m256i, x: &mut [u64; WORDS]) {
    let mut ev = [0u64; 4];
    let mut ov = [0u64; 4];
    _mm256_storeu_si256(ev.as_mut_ptr() as *mut __m256i, e);
    _mm256_storeu_si256(ov.as_mut_ptr() as *mut __m256i, o);
    for j in 0..4 {
        x[2 * j] = ev[j];
        x[2 * j + 1] = ov[j];
    }
}

/// Left and right shift counts for rotating lane `j` left by `R[d][j]`.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn counts(d: usize) -> (__m256i, __m256i) {
    let r = &ROTATIONS[d];
    let left = _mm256_set_epi64x(
        i64::from(r[3]),
        i64::from(r[2]),
        i64::from(r[1]),
        i64::from(r[0]),
    );
    let right = _mm256_sub_epi64(_mm256_set1_epi64x(64), left);
    (left, right)
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn rotl(v: __m256i, left: __m256i, right: __m256i) -> __m256i {
    _mm256_or_si256(_mm256_sllv_epi64(v, left), _mm256_srlv_epi64(v, right))
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn rotr(v: __m256i, left: __m256i, right: __m256i) -> __m256i {
    _mm256_or_si256(_mm256_srlv_epi64(v, left), _mm256_sllv_epi64(v, right))
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn encrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    let mut e = even(x);
    let mut o = odd(x);

    for round in 0..ROUNDS {
        let k = keys.for_round(round);
        e = _mm256_add_epi64(e, even(k));
        o = _mm256_add_epi64(o, odd(k));

        let (left, right) = counts(round % 8);
        if round % 8 == 0 {
            e = _mm256_add_epi64(e, o);
            o = _mm256_xor_si256(rotl(o, left, right), e);
        } else {
            o = rotl(o, left, right);
            e = _mm256_add_epi64(e, o);
            o = _mm256_xor_si256(o, e);
        }

        o = _mm256_permute4x64_epi64(o, SWAP_PAIRS);
    }

    store(e, o, x);
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn decrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    let mut e = even(x);
    let mut o = odd(x);

    for round in (0..ROUNDS).rev() {
        o = _mm256_permute4x64_epi64(o, SWAP_PAIRS);

        // rotating right by R is shifting right by `left` and left by `right`
        let (left, right) = counts(round % 8);
        if round % 8 == 0 {
            o = rotr(_mm256_xor_si256(o, e), left, right);
            e = _mm256_sub_epi64(e, o);
        } else {
            o = _mm256_xor_si256(o, e);
            e = _mm256_sub_epi64(e, o);
            o = rotr(o, left, right);
        }

        let k = keys.for_round(round);
        e = _mm256_sub_epi64(e, even(k));
        o = _mm256_sub_epi64(o, odd(k));
    }

    store(e, o, x);
}
