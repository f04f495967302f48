//! NEON implementation.
//!
//! Same register layout as the SSE2 backend. `vshlq_u64` takes signed
//! per-lane counts, where a negative count shifts right, so rotations need
//! no lane blending.

use crate::{KeySchedule, ROTATIONS, ROUNDS, WORDS};
use cipher::{consts::U64, BlockClosure};

use core::arch::aarch64::*;

super::block_backends!(encrypt_block, decrypt_block);

#[inline]
#[target_feature(enable = "neon")]
pub(crate) unsafe fn encrypt<F>(keys: &KeySchedule, f: F)
where
    F: BlockClosure<BlockSize = U64>,
{
    f.call(&mut Encryptor(keys));
}

#[inline]
#[target_feature(enable = "neon")]
pub(crate) unsafe fn decrypt<F>(keys: &KeySchedule, f: F)
where
    F: BlockClosure<BlockSize = U64>,
{
    f.call(&mut Decryptor(keys));
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn pair(a: u64, b: u64) -> uint64x2_t {
    vld1q_u64([a, b].as_ptr())
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn load(x: &[u64; WORDS]) -> ([uint64x2_t; 2], [uint64x2_t; 2]) {
    (
        [pair(x[0], x[2]), pair(x[4], x[6])],
        [pair(x[1], x[3]), pair(x[5], x[7])],
    )
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn store(e: &[uint64x2_t; 2], o: &[uint64x2_t; 2], x: &mut [u64; WORDS]) {
    let mut ev = [0u64; 4];
    let mut ov = [0u64; 4];
    vst1q_u64(ev.as_mut_ptr(), e[0]);
    vst1q_u64(ev.as_mut_ptr().add(2), e[1]);
    vst1q_u64(ov.as_mut_ptr(), o[0]);
    vst1q_u64(ov.as_mut_ptr().add(2), o[1]);
    for j in 0..4 {
        x[2 * j] = ev[j];
        x[2 * j + 1] = ov[j];
    }
}

/// Rotates each lane left by the matching entry of `r`.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn rotl(v: uint64x2_t, r: [u32; 2]) -> uint64x2_t {
    let left = vld1q_s64([i64::from(r[0]), i64::from(r[1])].as_ptr());
    let right = vld1q_s64([i64::from(r[0]) - 64, i64::from(r[1]) - 64].as_ptr());
    vorrq_u64(vshlq_u64(v, left), vshlq_u64(v, right))
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn rotr(v: uint64x2_t, r: [u32; 2]) -> uint64x2_t {
    rotl(v, [64 - r[0], 64 - r[1]])
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn encrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    let (mut e, mut o) = load(x);

    for round in 0..ROUNDS {
        let (ke, ko) = load(keys.for_round(round));
        let rot = &ROTATIONS[round % 8];

        for i in 0..2 {
            let r = [rot[2 * i], rot[2 * i + 1]];
            e[i] = vaddq_u64(e[i], ke[i]);
            o[i] = vaddq_u64(o[i], ko[i]);
            if round % 8 == 0 {
                e[i] = vaddq_u64(e[i], o[i]);
                o[i] = veorq_u64(rotl(o[i], r), e[i]);
            } else {
                o[i] = rotl(o[i], r);
                e[i] = vaddq_u64(e[i], o[i]);
                o[i] = veorq_u64(o[i], e[i]);
            }
            o[i] = vextq_u64(o[i], o[i], 1);
        }
    }

    store(&e, &o, x);
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn decrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    let (mut e, mut o) = load(x);

    for round in (0..ROUNDS).rev() {
        let (ke, ko) = load(keys.for_round(round));
        let rot = &ROTATIONS[round % 8];

        for i in 0..2 {
            let r = [rot[2 * i], rot[2 * i + 1]];
            o[i] = vextq_u64(o[i], o[i], 1);
            if round % 8 == 0 {
                o[i] = rotr(veorq_u64(o[i], e[i]), r);
                e[i] = vsubq_u64(e[i], o[i]);
            } else {
                o[i] = veorq_u64(o[i], e[i]);
                e[i] = vsubq_u64(e[i], o[i]);
                o[i] = rotr(o[i], r);
            }
            e[i] = vsubq_u64(e[i], ke[i]);
            o[i] = vsubq_u64(o[i], ko[i]);
        }
    }

    store(&e, &o, x);
}
