//! Portable implementation which does not rely on architecture-specific
//! intrinsics.

use crate::{KeySchedule, ROTATIONS, ROUNDS, WORDS};

super::block_backends!(encrypt_block, decrypt_block);

/// Encrypt one block held as eight little-endian words.
#[inline]
pub(crate) fn encrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    for round in 0..ROUNDS {
        for (w, k) in x.iter_mut().zip(keys.for_round(round)) {
            *w = w.wrapping_add(*k);
        }

        let rot = &ROTATIONS[round % 8];
        for j in 0..4 {
            let (x0, x1) = (x[2 * j], x[2 * j + 1]);
            let (y0, y1) = if round % 8 == 0 {
                let y0 = x0.wrapping_add(x1);
                (y0, x1.rotate_left(rot[j]) ^ y0)
            } else {
                let r = x1.rotate_left(rot[j]);
                let y0 = x0.wrapping_add(r);
                (y0, r ^ y0)
            };
            x[2 * j] = y0;
            x[2 * j + 1] = y1;
        }

        permute(x);
    }
}

/// Decrypt one block held as eight little-endian words.
#[inline]
pub(crate) fn decrypt_block(keys: &KeySchedule, x: &mut [u64; WORDS]) {
    for round in (0..ROUNDS).rev() {
        permute(x);

        let rot = &ROTATIONS[round % 8];
        for j in 0..4 {
            let (y0, y1) = (x[2 * j], x[2 * j + 1]);
            let (x0, x1) = if round % 8 == 0 {
                let x1 = (y1 ^ y0).rotate_right(rot[j]);
                (y0.wrapping_sub(x1), x1)
            } else {
                let r = y1 ^ y0;
                (y0.wrapping_sub(r), r.rotate_right(rot[j]))
            };
            x[2 * j] = x0;
            x[2 * j + 1] = x1;
        }

        for (w, k) in x.iter_mut().zip(keys.for_round(round)) {
            *w = w.wrapping_sub(*k);
        }
    }
}

/// Word permutation `[0, 3, 2, 1]` on each half; it is its own inverse.
#[inline(always)]
fn permute(x: &mut [u64; WORDS]) {
    x.swap(1, 3);
    x.swap(5, 7);
}
