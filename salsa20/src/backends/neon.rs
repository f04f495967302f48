//! NEON backend for Salsa20 on aarch64.
//!
//! Same diagonal layout as the x86 backends; the row rotations are done
//! with `vextq_u32`. The rows stay in registers for the whole call.

use super::{counter, diagonal_words, set_counter, write_diagonal};
use crate::{DOUBLE_ROUNDS, STATE_WORDS};
use cipher::{
    consts::{U4, U64},
    Block, BlockSizeUser, ParBlocks, ParBlocksSizeUser, StreamBackend, StreamClosure,
};
use core::arch::aarch64::*;

const PAR_BLOCKS: usize = 4;

#[inline]
#[target_feature(enable = "neon")]
pub(crate) unsafe fn inner<F>(state: &mut [u32; STATE_WORDS], f: F)
where
    F: StreamClosure<BlockSize = U64>,
{
    let words = diagonal_words(state);
    let ptr = words.as_ptr();
    let mut backend = Backend {
        rows: [
            vld1q_u32(ptr),
            vld1q_u32(ptr.add(4)),
            vld1q_u32(ptr.add(8)),
            vld1q_u32(ptr.add(12)),
        ],
        ctr: counter(state),
    };

    f.call(&mut backend);

    set_counter(state, backend.ctr);
}

struct Backend {
    /// Diagonal rows with the counter lanes zeroed
    rows: [uint32x4_t; 4],
    ctr: u64,
}

impl Backend {
    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn block_rows(&self, offset: u64) -> [uint32x4_t; 4] {
        let n = self.ctr.wrapping_add(offset);
        let [a, b, c, d] = self.rows;
        [
            a,
            vsetq_lane_u32::<1>((n >> 32) as u32, b),
            vsetq_lane_u32::<0>(n as u32, c),
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
#[target_feature(enable = "neon")]
unsafe fn store(rows: &[uint32x4_t; 4], block: &mut [u8]) {
    let mut words = [0u32; STATE_WORDS];
    for (i, row) in rows.iter().enumerate() {
        vst1q_u32(words.as_mut_ptr().add(4 * i), *row);
    }
    write_diagonal(&words, block);
}

macro_rules! rotl {
    ($w:expr, $amt:literal) => {{
        let w = $w;
        vorrq_u32(vshlq_n_u32(w, $amt), vshrq_n_u32(w, 32 - $amt))
    }};
}

/// Salsa20/20 over `N` blocks, including the final feed-forward.
#[inline]
#[target_feature(enable = "neon")]
unsafe fn rounds<const N: usize>(save: [[uint32x4_t; 4]; N]) -> [[uint32x4_t; 4]; N] {
    let mut v = save;
    for _ in 0..DOUBLE_ROUNDS {
        for [a, b, c, d] in v.iter_mut() {
            // column round, then row round
            for _ in 0..2 {
                *b = veorq_u32(*b, rotl!(vaddq_u32(*a, *d), 7));
                *c = veorq_u32(*c, rotl!(vaddq_u32(*b, *a), 9));
                *d = veorq_u32(*d, rotl!(vaddq_u32(*c, *b), 13));
                *a = veorq_u32(*a, rotl!(vaddq_u32(*d, *c), 18));

                *d = vextq_u32(*d, *d, 1);
                *c = vextq_u32(*c, *c, 2);
                *b = vextq_u32(*b, *b, 3);
                core::mem::swap(b, d);
            }
        }
    }

    for (rows, saved) in v.iter_mut().zip(save.iter()) {
        for (row, saved_row) in rows.iter_mut().zip(saved.iter()) {
            *row = vaddq_u32(*row, *saved_row);
        }
    }
    v
}
