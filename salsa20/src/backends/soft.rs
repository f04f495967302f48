//! Portable implementation which does not rely on architecture-specific
//! intrinsics.

use crate::{double_round, SalsaCore, DOUBLE_ROUNDS, STATE_WORDS};
use cipher::{
    consts::{U1, U64},
    Block, BlockSizeUser, ParBlocksSizeUser, StreamBackend, StreamCipherSeekCore,
};
use velocipher_core::endian;

pub(crate) struct Backend<'a>(pub(crate) &'a mut SalsaCore);

impl BlockSizeUser for Backend<'_> {
    type BlockSize = U64;
}

impl ParBlocksSizeUser for Backend<'_> {
    type ParBlocksSize = U1;
}

impl StreamBackend for Backend<'_> {
    #[inline(always)]
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        let res = run_rounds(&self.0.state);

        self.0
            .set_block_pos(self.0.get_block_pos().wrapping_add(1));

        endian::write_u32_le(&res, block);
    }
}

#[inline(always)]
fn run_rounds(state: &[u32; STATE_WORDS]) -> [u32; STATE_WORDS] {
    let mut res = *state;

    for _ in 0..DOUBLE_ROUNDS {
        double_round(&mut res);
    }

    for (s1, s0) in res.iter_mut().zip(state.iter()) {
        *s1 = s1.wrapping_add(*s0);
    }
    res
}
